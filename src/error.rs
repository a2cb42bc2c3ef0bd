//! Error types for POCKET+ compression/decompression.

use thiserror::Error;

/// Errors that can occur during POCKET+ compression or decompression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PocketError {
    /// Invalid packet size (must be > 0 and divisible by 8)
    #[error("invalid packet size: {0} (must be > 0 and divisible by 8)")]
    InvalidPacketSize(usize),

    /// Invalid robustness parameter (must be 0-7)
    #[error("invalid robustness: {0} (must be 0-7)")]
    InvalidRobustness(usize),

    /// Input data length doesn't match expected packet count
    #[error("invalid input length: expected {expected}, got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },

    /// Unexpected end of input during decompression
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    /// Invalid compressed data format
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Buffer overflow during compression
    #[error("buffer overflow")]
    BufferOverflow,

    /// Not enough bits remaining in input (underflow)
    #[error("not enough bits remaining in input")]
    Underflow,

    /// Invalid length parameter
    #[error("invalid length parameter")]
    InvalidLength,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PocketError::InvalidPacketSize(0);
        assert!(err.to_string().contains("invalid packet size"));

        let err = PocketError::InvalidRobustness(10);
        assert!(err.to_string().contains("invalid robustness"));

        let err = PocketError::InvalidInputLength {
            expected: 100,
            actual: 50,
        };
        assert!(err.to_string().contains("expected 100"));

        let err = PocketError::UnexpectedEndOfInput;
        assert!(err.to_string().contains("unexpected end"));

        let err = PocketError::InvalidFormat("test".to_string());
        assert!(err.to_string().contains("invalid format"));

        let err = PocketError::BufferOverflow;
        assert!(err.to_string().contains("buffer overflow"));

        let err = PocketError::Underflow;
        assert!(err.to_string().contains("not enough bits"));

        let err = PocketError::InvalidLength;
        assert!(err.to_string().contains("invalid length"));
    }
}
