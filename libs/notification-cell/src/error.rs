use thiserror::Error;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Recipient id is required")]
    MissingRecipient,

    #[error("Notification not found: {0}")]
    NotFound(String),

    #[error("Store operation failed: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::MissingRecipient => AppError::BadRequest(err.to_string()),
            NotificationError::NotFound(_) => AppError::NotFound(err.to_string()),
            NotificationError::StoreError(_) => AppError::Database(err.to_string()),
            NotificationError::SerializationError(_) => AppError::Internal(err.to_string()),
        }
    }
}
