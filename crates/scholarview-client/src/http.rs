//! reqwest-backed [`Transport`] for the profile backend.
//!
//! Redirects are not followed: a `307` from `/publications` is the signal
//! to open `/publications/stream` ourselves.

use std::io;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::sse::event_stream;
use crate::transport::{Acquisition, StreamHandle, Transport};
use crate::wire::{
    CacheStatus, CacheStatusBody, PublicationsBody, ServerStatus, UpdateBody, UpdateOutcome,
};

/// Default backend API root
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Default connect timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one backend API root.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(ClientError::from_reqwest)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        log::debug!("GET /{path}");
        self.client
            .get(self.url(path))
            .send()
            .await
            .map_err(ClientError::from_reqwest)
    }

    async fn open_stream(&self) -> Result<StreamHandle, ClientError> {
        log::debug!("GET /publications/stream");
        let response = self
            .client
            .get(self.url("publications/stream"))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ClientError::from_reqwest)?;

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(io::Error::other));
        let reader = tokio_util::io::StreamReader::new(Box::pin(body));
        log::debug!("Streaming channel opened");
        Ok(StreamHandle::new(Box::pin(event_stream(reader))))
    }
}

/// Read a JSON body, keeping the HTTP status when decoding fails on an error response.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        if status.is_success() {
            ClientError::decode(&e)
        } else {
            ClientError::Transport {
                status: Some(status.as_u16()),
                message: format!("invalid response body: {e}"),
            }
        }
    })
}

impl Transport for HttpTransport {
    async fn server_status(&self) -> Result<ServerStatus, ClientError> {
        let response = self
            .get("status")
            .await?
            .error_for_status()
            .map_err(ClientError::from_reqwest)?;
        read_json(response).await
    }

    async fn acquire(&self) -> Result<Acquisition, ClientError> {
        let response = self.get("publications").await?;
        if response.status() == StatusCode::TEMPORARY_REDIRECT {
            log::debug!("Publications not cached, switching to stream");
            return self.open_stream().await.map(Acquisition::Streaming);
        }
        let body: PublicationsBody = read_json(response).await?;
        body.into_result().map(Acquisition::Immediate)
    }

    async fn update(&self) -> Result<UpdateOutcome, ClientError> {
        log::debug!("POST /publications/update");
        let response = self
            .client
            .post(self.url("publications/update"))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        // Failures arrive as 500 with a {success: false} body
        let body: UpdateBody = read_json(response).await?;
        body.into_outcome()
    }

    async fn cache_status(&self) -> Result<CacheStatus, ClientError> {
        let response = self.get("publications/status").await?;
        let body: CacheStatusBody = read_json(response).await?;
        body.into_status()
    }
}
