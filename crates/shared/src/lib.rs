pub mod domain;
pub mod error;
pub mod protocol;
pub mod schedule;

#[cfg(test)]
#[path = "tests/schedule_tests.rs"]
mod schedule_tests;
