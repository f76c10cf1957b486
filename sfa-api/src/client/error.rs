use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::client::transport::{BoxDynError, TransportError};
use crate::client::vault::VaultError;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

/// a response the caller asked to be treated as an error; the body is
/// carried verbatim and never interpreted by the client
#[derive(Debug)]
pub struct StatusError {
    pub status: StatusCode,
    pub body: Bytes,
}

impl StatusError {
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned
    {
        serde_json::from_slice(&self.body)
    }
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "server responded with status {}", self.status)
    }
}

impl std::error::Error for StatusError {}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// the session has been torn down; route the user to the login entry
    /// point
    #[error("authentication expired")]
    AuthExpired,

    #[error("network failure")]
    Network(#[source] BoxDynError),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Status(StatusError),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => RequestError::Timeout,
            TransportError::Network(source) => RequestError::Network(source),
        }
    }
}
