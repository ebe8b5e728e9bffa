//! Error types for the storage layer.

/// Errors a [`KeyValueStore`](crate::KeyValueStore) backend can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Storage is disabled or missing on this platform.
    #[error("storage unavailable")]
    Unavailable,

    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but isn't valid JSON.
    #[error("storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
