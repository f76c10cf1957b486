use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use reqwest::header::HeaderMap;
use url::Url;

pub type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// the ceiling was exceeded before a response arrived; never retried
    #[error("request timed out")]
    Timeout,

    /// no response received
    #[error("network failure")]
    Network(#[source] BoxDynError),
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let res = builder.send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes()
            .await
            .map_err(map_reqwest_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(Box::new(err))
    }
}
