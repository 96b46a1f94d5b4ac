use shared::error::{is_insufficient_stock, ErrorBody};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("resource not found")]
    NotFound { body: Option<ErrorBody> },
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        body: Option<ErrorBody>,
    },
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("server returned a cart without an id")]
    MissingCartId,
    #[error("cart id store: {0:#}")]
    CartIdStore(anyhow::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message the backend put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::NotFound { body } | Self::Status { body, .. } => {
                body.as_ref().and_then(ErrorBody::message)
            }
            _ => None,
        }
    }

    pub fn is_insufficient_stock(&self) -> bool {
        self.server_message().is_some_and(is_insufficient_stock)
    }
}
