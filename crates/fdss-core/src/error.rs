//! # Error Types
//!
//! Validation failures for host-supplied values. Network and rendering
//! errors live in the crates that own those concerns.

use thiserror::Error;

/// A host-supplied value failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Order identifier is the empty string.
    #[error("order id must not be empty")]
    EmptyOrderId,
}
