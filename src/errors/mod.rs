//! Centralized error handling for the aggregator
//!
//! This module provides a unified error system across all application layers.
//!
//! # Error Categories
//!
//! - **Source Errors**: remote playlist/guide connectivity and parsing
//! - **Validation Errors**: input validation and business rule violations
//! - **Configuration Errors**: malformed or inconsistent configuration
//! - **Output Errors**: rendering and file writing failures

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
