//! Error taxonomy for the privacy SDK.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrivacyError>;

/// Coarse classification callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bytes, strings or records that failed validation at the boundary.
    MalformedInput,
    /// An accumulator has no room left.
    CapacityExceeded,
    /// A position outside the addressable range of a tree.
    IndexOutOfBounds,
    /// A Poseidon invocation with an unsupported number of inputs.
    ArityUnsupported,
    /// Internally computed values disagree with each other or with the ledger.
    InvariantViolation,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrivacyError {
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("master seed must be {expected} bytes, got {actual}")]
    InvalidSeedLength { expected: usize, actual: usize },

    #[error("domain tag {tag:?} does not fit in a field element")]
    DomainTagTooLong { tag: String },

    #[error("not a canonical field element: {0}")]
    NonCanonicalField(String),

    #[error("timestamp {0} cannot be encoded as field elements")]
    InvalidTimestamp(String),

    #[error("malformed ledger record: {0}")]
    MalformedRecord(String),

    #[error("tree depth {0} is outside 1..=32")]
    InvalidDepth(usize),

    #[error("record decryption failed")]
    DecryptionFailed,

    #[error("record serialization failed: {0}")]
    Serialization(String),

    #[error("merkle tree is full ({capacity} leaves)")]
    TreeFull { capacity: u64 },

    #[error("index {index} out of bounds (capacity {bound})")]
    IndexOutOfBounds { index: u64, bound: u64 },

    #[error("poseidon supports 1..=16 inputs, got {0}")]
    ArityUnsupported(usize),

    #[error("merkle path has {actual} siblings, tree depth is {expected}")]
    PathLengthMismatch { expected: usize, actual: usize },

    #[error("root mismatch: local {local}, ledger {ledger}")]
    RootMismatch { local: String, ledger: String },

    #[error("commitment at index {index} does not match the deposit record")]
    CommitmentMismatch { index: u64 },

    #[error("conflicting commitments replayed at index {index}")]
    ConflictingLeaf { index: u64 },
}

impl PrivacyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLength { .. }
            | Self::InvalidSeedLength { .. }
            | Self::DomainTagTooLong { .. }
            | Self::NonCanonicalField(_)
            | Self::InvalidTimestamp(_)
            | Self::MalformedRecord(_)
            | Self::InvalidDepth(_)
            | Self::DecryptionFailed
            | Self::Serialization(_) => ErrorKind::MalformedInput,
            Self::TreeFull { .. } => ErrorKind::CapacityExceeded,
            Self::IndexOutOfBounds { .. } => ErrorKind::IndexOutOfBounds,
            Self::ArityUnsupported(_) => ErrorKind::ArityUnsupported,
            Self::PathLengthMismatch { .. }
            | Self::RootMismatch { .. }
            | Self::CommitmentMismatch { .. }
            | Self::ConflictingLeaf { .. } => ErrorKind::InvariantViolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            PrivacyError::TreeFull { capacity: 8 }.kind(),
            ErrorKind::CapacityExceeded
        );
        assert_eq!(
            PrivacyError::ArityUnsupported(17).kind(),
            ErrorKind::ArityUnsupported
        );
        assert_eq!(
            PrivacyError::InvalidLength {
                expected: 32,
                actual: 31
            }
            .kind(),
            ErrorKind::MalformedInput
        );
        assert_eq!(
            PrivacyError::CommitmentMismatch { index: 3 }.kind(),
            ErrorKind::InvariantViolation
        );
    }

    #[test]
    fn test_error_messages() {
        let err = PrivacyError::IndexOutOfBounds { index: 9, bound: 8 };
        assert_eq!(err.to_string(), "index 9 out of bounds (capacity 8)");
    }
}
