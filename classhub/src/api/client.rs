//! Thin JSON client over `reqwest`.
//!
//! Every call is an independent round trip: no caching, no retries. The only
//! guard against a hung backend is the per-request timeout.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::envelope::ErrorBody;
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Percent-encode an id for use as a single path segment.
pub fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Shared HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client for `base_url` with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            timeout,
        }
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and decode the body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.execute(Method::GET, path, None::<&()>).await?;
        decode(resp).await
    }

    /// POST a JSON body to `path` and decode the reply.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp = self.execute(Method::POST, path, Some(body)).await?;
        decode(resp).await
    }

    /// PUT a JSON body to `path` and decode the reply.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp = self.execute(Method::PUT, path, Some(body)).await?;
        decode(resp).await
    }

    /// PATCH a JSON body to `path` and decode the reply.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp = self.execute(Method::PATCH, path, Some(body)).await?;
        decode(resp).await
    }

    /// DELETE `path`. The acknowledgement body is not interpreted.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    async fn execute<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut req: RequestBuilder = self
            .http
            .request(method.clone(), self.url(path))
            .timeout(self.timeout);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let err = ApiError::from(e);
                tracing::warn!(%method, path, error = %err, "request failed");
                return Err(err);
            }
        };

        let status = resp.status();
        tracing::debug!(%method, path, status = status.as_u16(), "response");

        if status.is_success() {
            return Ok(resp);
        }

        // Error bodies are best effort; a missing or malformed one gets the fallback message.
        let message = resp
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str::<ErrorBody>(&text).ok())
            .and_then(|body| body.message);
        let err = ApiError::from_status(status, message);
        tracing::warn!(%method, path, status = status.as_u16(), kind = err.kind(), "backend error: {err}");
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    resp.json::<T>().await.map_err(ApiError::from)
}
