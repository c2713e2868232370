//! # lpm-cli
//!
//! Scenario files and console output for the `lpm` binary.

pub mod console;
pub mod scenario;

pub use console::ConsoleObserver;
pub use scenario::{Problem, Scenario};
