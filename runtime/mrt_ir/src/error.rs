//! Runtime error taxonomy.
//!
//! Every error here is a construction-time contract violation: a malformed
//! request from the front-end, detected eagerly when a carrier, pattern
//! handle, dispatch table or call site is built. Match failure is never an
//! error; it is the `Null` carrier / out-of-range index outcome.

use std::fmt;

use thiserror::Error;

use crate::handle::Signature;

/// Result type for runtime construction operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised while building runtime artifacts.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// Carrier request whose slot count exceeds the arity ceiling.
    #[error("carrier shape {shape} needs {slots} slots, more than the maximum of {max}")]
    ArityExceeded {
        shape: String,
        slots: usize,
        max: usize,
    },

    /// Component index past the end of a carrier or pattern handle.
    #[error("component index {index} is out of bounds for {count} components")]
    ComponentOutOfBounds { index: usize, count: usize },

    /// Materializing a carrier class failed for environment reasons.
    #[error("could not specialize carrier {shape}: {reason}")]
    SpecializationFailed { shape: String, reason: String },

    /// Pattern handle components do not line up with its descriptor.
    #[error("illegal descriptor {descriptor}: {reason}")]
    IllegalDescriptor { descriptor: String, reason: String },

    /// `adapt_target` to a type unrelated to the original target.
    #[error("cannot adapt pattern target from {old_target} to {new_target}")]
    IncompatibleTargetType {
        old_target: String,
        new_target: String,
    },

    /// Null, duplicate or wrong-kind case labels.
    #[error("invalid label set: {reason}")]
    InvalidLabelSet { reason: String },

    /// Entry point invoked with a signature that disagrees with the request.
    #[error("call site type {found} does not match expected {expected}")]
    ContractMismatch { found: String, expected: String },
}

impl RuntimeError {
    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RuntimeError::ArityExceeded { .. } => ErrorCode::R1001,
            RuntimeError::ComponentOutOfBounds { .. } => ErrorCode::R1002,
            RuntimeError::SpecializationFailed { .. } => ErrorCode::R1901,
            RuntimeError::IllegalDescriptor { .. } => ErrorCode::R2001,
            RuntimeError::IncompatibleTargetType { .. } => ErrorCode::R2002,
            RuntimeError::InvalidLabelSet { .. } => ErrorCode::R3001,
            RuntimeError::ContractMismatch { .. } => ErrorCode::R4001,
        }
    }

    pub fn invalid_labels(reason: impl Into<String>) -> Self {
        RuntimeError::InvalidLabelSet {
            reason: reason.into(),
        }
    }

    pub fn contract_mismatch(found: &Signature, expected: impl Into<String>) -> Self {
        RuntimeError::ContractMismatch {
            found: found.to_string(),
            expected: expected.into(),
        }
    }
}

/// Error codes for runtime construction errors.
///
/// Format: R#### where first digit indicates subsystem:
/// - R1xxx: Carrier errors
/// - R2xxx: Pattern errors
/// - R3xxx: Dispatch table errors
/// - R4xxx: Call site errors
/// - Rx9xx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Carrier arity exceeded
    R1001,
    /// Component index out of bounds
    R1002,
    /// Carrier specialization failed
    R1901,
    /// Illegal pattern descriptor
    R2001,
    /// Incompatible pattern target type
    R2002,
    /// Invalid dispatch label set
    R3001,
    /// Call site contract mismatch
    R4001,
}

impl ErrorCode {
    /// Get the code as a string (e.g., "R1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::R1001 => "R1001",
            ErrorCode::R1002 => "R1002",
            ErrorCode::R1901 => "R1901",
            ErrorCode::R2001 => "R2001",
            ErrorCode::R2002 => "R2002",
            ErrorCode::R3001 => "R3001",
            ErrorCode::R4001 => "R4001",
        }
    }

    /// Check if this is an internal error (fatal, not a caller mistake).
    pub fn is_internal(&self) -> bool {
        self.as_str().as_bytes().get(2) == Some(&b'9')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
