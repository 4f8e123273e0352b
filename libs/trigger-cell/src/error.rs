use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Parent document not found: {0}")]
    MissingParent(String),

    #[error("Parent lookup failed: {0}")]
    LookupFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
