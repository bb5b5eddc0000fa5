use rmcp::ErrorData;
use thiserror::Error;

use crate::storage::StorageError;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A mutation was attempted without an authenticated identity.
    #[error("unauthorized")]
    Unauthorized,
    /// Missing record, or a record owned by another user. Callers cannot
    /// tell the two apart.
    #[error("not found")]
    NotFound,
    #[error("unknown career template: {0}")]
    UnknownTemplate(String),
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("{0}")]
    IoError(#[from] tokio::io::Error),
}

impl From<ServiceError> for ErrorData {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized => ErrorData::invalid_request(err.to_string(), None),
            ServiceError::NotFound | ServiceError::UnknownTemplate(_) => {
                ErrorData::invalid_params(err.to_string(), None)
            }
            _ => ErrorData::internal_error(err.to_string(), None),
        }
    }
}
