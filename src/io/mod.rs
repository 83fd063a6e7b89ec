//! Input/Output handling for the CLI.
//!
//! This module provides:
//! - Output formatting (text, JSON)
//! - Exit codes mapped from library errors

pub mod exit_code;
pub mod format;

pub use exit_code::ExitCode;
pub use format::{JsonResponse, OutputFormat};
