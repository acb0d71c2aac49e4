//! Error types
//!
//! Graph operations themselves never fail: unknown cells read as empty and
//! mutations create entries on demand. Errors only arise at the serialization
//! boundary, when decoding engine payloads or encoding snapshots.

use thiserror::Error;

/// Result type for fallible cellgraph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while moving graph data in or out of the process.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// A JSON payload, config or snapshot could not be (de)serialized.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot could not be encoded as MessagePack.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// A MessagePack snapshot could not be decoded.
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
