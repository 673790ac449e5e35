//! HTTP implementation of [`SessionSync`] against the `/api/cafe` routes.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cafe_types::{Message, NewMessage, Session, SessionDetail};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::{SessionSync, SyncResult};
use crate::error::SyncError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteBody<'a> {
    cafe_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpSessionSync {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSessionSync {
    /// Builds a client for `base_url`.
    ///
    /// `token` is sent as a bearer credential. `timeout` of `None` waits
    /// for the server indefinitely.
    pub fn new(base_url: &str, token: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Base URL cannot carry paths: {base_url}");
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("cafe"));
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("Auth token contains invalid header characters")?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> SyncResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SyncError::network(format!("Invalid base URL: {}", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> SyncResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "Session sync request");
        Ok(self.client.request(method, url))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> SyncResult<T> {
        let response = request
            .send()
            .await
            .map_err(|err| SyncError::network(err.to_string()))?;
        let response = check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| SyncError::network(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| SyncError::invalid_response(err.to_string()))
    }
}

/// Maps non-success statuses onto the error taxonomy.
async fn check_status(response: Response) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("").to_string()
    } else {
        body.trim().to_string()
    };
    tracing::warn!(status = status.as_u16(), %url, "Session sync request failed");

    Err(match status {
        StatusCode::UNAUTHORIZED => SyncError::Unauthorized,
        StatusCode::NOT_FOUND => SyncError::not_found(url),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            SyncError::validation(detail)
        }
        other => SyncError::Server {
            status: other.as_u16(),
        },
    })
}

#[async_trait]
impl SessionSync for HttpSessionSync {
    async fn list(&self) -> SyncResult<Vec<Session>> {
        Self::send(self.request(Method::GET, &["api", "cafe"])?).await
    }

    async fn create(&self) -> SyncResult<Session> {
        Self::send(self.request(Method::POST, &["api", "cafe"])?).await
    }

    async fn delete(&self, id: &str) -> SyncResult<Session> {
        let request = self
            .request(Method::DELETE, &["api", "cafe"])?
            .json(&DeleteBody { cafe_id: id });
        Self::send(request).await
    }

    async fn get_one(&self, id: &str) -> SyncResult<SessionDetail> {
        Self::send(self.request(Method::GET, &["api", "cafe", id])?).await
    }

    async fn post_message(&self, message: &NewMessage) -> SyncResult<Message> {
        let request = self.request(Method::POST, &["api", "message"])?.json(message);
        Self::send(request).await
    }
}
