mod rollback_tests;
mod runtime_tests;
