//! Result type alias for Adload
//!
//! This module provides a convenient Result type alias that uses LoadError
//! as the error type.

use super::errors::LoadError;

/// Result type alias for Adload operations
///
/// This is a convenience type alias that uses `LoadError` as the error type.
/// Use this throughout the codebase for fallible operations.
pub type Result<T> = std::result::Result<T, LoadError>;
