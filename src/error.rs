//! Error types for abchain
//!
//! Provides a unified error type for all index operations.

use thiserror::Error;

/// Result type alias using AbcError
pub type Result<T> = std::result::Result<T, AbcError>;

/// Unified error type for abchain operations
#[derive(Debug, Error)]
pub enum AbcError {
    // -------------------------------------------------------------------------
    // Address Space Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Window out of range: offset {offset}, length {length}")]
    WindowOutOfRange { offset: u64, length: u64 },

    #[error("Address space exhausted: requested {requested:#x}, limit {limit:#x}")]
    AddressSpaceExhausted { requested: u64, limit: u64 },

    // -------------------------------------------------------------------------
    // Navigation Errors
    // -------------------------------------------------------------------------
    /// Expected at sequence boundaries; never a sign of corruption.
    #[error("End of chain")]
    EndOfChain,

    #[error("Invalid position {position} in map {address:#x} holding {count} items")]
    InvalidPosition {
        address: u64,
        position: usize,
        count: usize,
    },

    // -------------------------------------------------------------------------
    // Corruption Errors
    // -------------------------------------------------------------------------
    #[error("Malformed block: {0}")]
    MalformedBlock(String),

    #[error("Structural inconsistency: {0}")]
    StructuralInconsistency(String),

    // -------------------------------------------------------------------------
    // Mutation Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Value {value} does not follow chain tail {tail}")]
    OutOfOrder { value: u64, tail: u64 },

    #[error("Duplicate value: {0}")]
    DuplicateValue(u64),

    #[error("Value {value} does not fit in {width} bytes")]
    ValueTooWide { value: u64, width: u8 },

    #[error("Layer count limit reached")]
    LayerLimit,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AbcError {
    /// True for the recoverable chain boundary condition
    pub fn is_end_of_chain(&self) -> bool {
        matches!(self, AbcError::EndOfChain)
    }
}
