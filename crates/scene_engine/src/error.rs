//! Error types for scene persistence

use thiserror::Error;

/// Result alias for fallible scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors produced while reading or writing scene data
///
/// Only the top-level persistence entry points return these. Mutation hooks
/// log and degrade instead of failing.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Underlying stream failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A chunk was written with a version this reader does not understand
    #[error("Unsupported version {version} for chunk '{chunk}'")]
    UnsupportedChunkVersion {
        /// Human readable chunk name
        chunk: &'static str,
        /// Version found in the stream
        version: u32,
    },

    /// A known chunk appeared where a different one was required
    #[error("Expected chunk '{expected}' but found chunk id {found:#x}")]
    UnexpectedChunk {
        /// Name of the chunk the reader was waiting for
        expected: &'static str,
        /// Raw id of the chunk that was found
        found: u32,
    },

    /// The stream ended before every required chunk was read
    #[error("Missing required chunk '{0}'")]
    MissingChunk(&'static str),

    /// Structurally invalid data
    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    /// A component payload could not be encoded or decoded
    #[error("Component payload error: {0}")]
    ComponentPayload(String),
}
