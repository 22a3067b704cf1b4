use thiserror::Error;

/// Failures surfaced by a [`crate::storage::KeyValueStore`].
///
/// None of these ever leave `TabStateStore`; they are logged and swallowed there.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Backend(String),
}
