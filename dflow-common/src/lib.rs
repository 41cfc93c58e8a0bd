//! # dflow Common Library
//!
//! Shared code for the dflow services including:
//! - Error types
//! - Configuration loading and data root resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
