//! Command Line Interface (CLI) layer for veogen.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-video and batch
//! flows. It wires user-provided options to the library API in
//! `veogen::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
