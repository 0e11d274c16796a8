mod error_tests;
mod registry_tests;
