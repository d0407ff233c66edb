//! External process execution: the command runner and the tool detector.

pub mod detect;
pub mod runner;
