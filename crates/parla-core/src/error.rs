//! Error types for matrix and vector operations

use parla_exec::PoolError;
use thiserror::Error;

/// Errors raised by linear-algebra operations
#[derive(Error, Debug)]
pub enum LinalgError {
    /// Operand shapes or sizes are incompatible
    #[error("Dimension mismatch in {operation}: {left} vs {right}")]
    DimensionMismatch {
        operation: &'static str,
        left: String,
        right: String,
    },

    /// The storage representation lacks the requested capability
    #[error("Operation '{operation}' is not supported by the {format} representation")]
    Unsupported {
        format: &'static str,
        operation: &'static str,
    },

    /// Raw storage handed to a constructor is inconsistent
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Parallel dispatch failed
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl LinalgError {
    /// Mismatch between two matrix shapes
    pub fn shape_mismatch(
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            operation,
            left: format!("{}x{}", left.0, left.1),
            right: format!("{}x{}", right.0, right.1),
        }
    }

    /// Mismatch between two lengths (vector sizes, inner dimensions)
    pub fn length_mismatch(operation: &'static str, left: usize, right: usize) -> Self {
        Self::DimensionMismatch {
            operation,
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// Capability missing from a representation
    pub fn unsupported(format: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { format, operation }
    }

    /// Create an invalid structure error
    pub fn invalid_structure(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }
}

/// Result type for linear-algebra operations
pub type LinalgResult<T> = Result<T, LinalgError>;
