//! Common utilities shared by the user service and its tools.
//!
//! This crate provides:
//! - Unified error handling, including storage error mapping
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
