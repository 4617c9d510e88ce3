//! Error types for fixture setup and codec round-trips

use thiserror::Error;

/// Crate result alias
pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Adjacent-equality sweeps need at least two entries
    #[error("corpus size {size} is too small (need at least 2)")]
    CorpusTooSmall { size: usize },

    #[error("type `{type_name}` is not registered with the compact codec")]
    UnregisteredType { type_name: &'static str },

    #[error("compact codec registry is full ({capacity} types)")]
    RegistryFull { capacity: usize },

    #[error("encode failed for `{type_name}`: {reason}")]
    Encode {
        type_name: &'static str,
        reason: String,
    },

    #[error("decode failed for `{type_name}`: {reason}")]
    Decode {
        type_name: &'static str,
        reason: String,
    },

    /// Payload carries a type descriptor other than the one requested
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("worker thread panicked while running `{0}`")]
    WorkerPanicked(String),
}

impl BenchError {
    pub(crate) fn encode<T: ?Sized>(reason: impl ToString) -> Self {
        BenchError::Encode {
            type_name: std::any::type_name::<T>(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode<T: ?Sized>(reason: impl ToString) -> Self {
        BenchError::Decode {
            type_name: std::any::type_name::<T>(),
            reason: reason.to_string(),
        }
    }

    /// Errors raised while building a fixture abort the whole session
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            BenchError::CorpusTooSmall { .. } | BenchError::RegistryFull { .. }
        )
    }
}
