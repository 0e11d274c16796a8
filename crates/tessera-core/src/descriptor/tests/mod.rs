mod capability_tests;
mod service_tests;
