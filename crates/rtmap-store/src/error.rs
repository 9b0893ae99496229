/// Errors from snapshot and table persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("corrupted snapshot: {0}")]
    Corrupt(String),
}
