//! Pipeline integration tests.

pub mod support;

mod compose_tests;
mod sample_tests;
mod stage_tests;
