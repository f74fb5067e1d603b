//! Media bridge client errors

use crate::domain::shared::error::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmbError {
    #[error("Media bridge request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media bridge responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected media bridge response: {0}")]
    Decode(String),
}

impl From<SmbError> for DomainError {
    fn from(err: SmbError) -> Self {
        match err {
            SmbError::Status { status, body } => DomainError::Upstream { status, body },
            other => DomainError::Internal(other.to_string()),
        }
    }
}
