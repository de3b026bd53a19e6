//! HTTP client for the remote CMS API.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::ResolvedDocument;

use super::{DraftSummary, PublicationStatus, PublicationSummary, RemoteApi, UploadedMedia};

/// Seconds before actual expiry at which a cached token is refreshed
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Configuration for [`HttpRemoteClient`].
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API base URL, e.g. `https://api.example.com`
    pub base_url: String,
    /// Long-lived API key exchanged for short-lived access tokens
    pub api_key: String,
}

#[derive(Clone, PartialEq, Eq)]
struct AccessToken {
    token: String,
    expires_at: i64,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        unix_timestamp_now() + TOKEN_EXPIRY_MARGIN_SECS < self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Production [`RemoteApi`] implementation over HTTP.
///
/// Owns the cached access token for the whole run: lazily populated on the
/// first call, refreshed once the expiry safety margin is reached.
pub struct HttpRemoteClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    token: Mutex<Option<AccessToken>>,
}

impl HttpRemoteClient {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        if config.api_key.trim().is_empty() {
            return Err(Error::InvalidInput("API key must not be empty".into()));
        }
        Ok(Self {
            base_url,
            api_key: config.api_key.trim().to_string(),
            client: reqwest::Client::builder().build()?,
            token: Mutex::new(None),
        })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if token.is_fresh() {
                return Ok(token.token.clone());
            }
        }

        let response = self
            .client
            .post(format!("{}/v1/auth/token", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::PermanentRemote(parse_api_error(status, &body)));
        }

        let payload = response.json::<TokenResponse>().await?;
        let token = AccessToken::try_from(payload)?;
        let value = token.token.clone();
        *guard = Some(token);
        Ok(value)
    }

    /// Build and send a request, retrying rate limits and transient server
    /// failures with exponential delay.
    async fn send_with_retry(&self, builder: RequestBuilder) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = builder.try_clone().ok_or_else(|| {
                Error::InvalidInput("request body is not retryable".into())
            })?;

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() || !is_retryable(status) {
                        return Ok(response);
                    }
                    if attempt >= MAX_ATTEMPTS {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::TransientRemote(parse_api_error(status, &body)));
                    }
                    tracing::debug!(status = status.as_u16(), attempt, "retrying remote call");
                }
                Err(error) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(Error::TransientRemote(error.to_string()));
                    }
                    tracing::debug!(%error, attempt, "retrying remote call after transport error");
                }
            }

            tokio::time::sleep(Duration::from_millis(
                RETRY_BASE_DELAY_MS << (attempt - 1),
            ))
            .await;
        }
    }

    async fn authed(&self, method: Method, route: &str) -> Result<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(self
            .client
            .request(method, format!("{}{route}", self.base_url))
            .bearer_auth(token)
            .header("Accept", "application/json"))
    }

    /// Map a non-success, non-retryable response to a permanent error.
    async fn expect_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::PermanentRemote(parse_api_error(status, &body)))
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteClient {
    async fn create_draft(&self, resolved: &ResolvedDocument) -> Result<String> {
        let request = self.authed(Method::POST, "/v1/drafts").await?.json(resolved);
        let response = Self::expect_success(self.send_with_retry(request).await?).await?;
        let payload = response.json::<TokenBody>().await?;
        Ok(payload.token)
    }

    async fn update_draft(&self, token: &str, resolved: &ResolvedDocument) -> Result<()> {
        let request = self
            .authed(Method::PUT, &format!("/v1/drafts/{token}"))
            .await?
            .json(resolved);
        Self::expect_success(self.send_with_retry(request).await?).await?;
        Ok(())
    }

    async fn get_draft(&self, token: &str) -> Result<Option<ResolvedDocument>> {
        let request = self
            .authed(Method::GET, &format!("/v1/drafts/{token}"))
            .await?;
        let response = self.send_with_retry(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::expect_success(response).await?;
        Ok(Some(response.json::<ResolvedDocument>().await?))
    }

    async fn publish(&self, token: &str) -> Result<String> {
        let request = self
            .authed(Method::POST, &format!("/v1/drafts/{token}/publish"))
            .await?;
        let response = Self::expect_success(self.send_with_retry(request).await?).await?;
        let payload = response.json::<TokenBody>().await?;
        Ok(payload.token)
    }

    async fn get_publication_status(&self, token: &str) -> Result<PublicationStatus> {
        let request = self
            .authed(Method::GET, &format!("/v1/publications/{token}"))
            .await?;
        let response = Self::expect_success(self.send_with_retry(request).await?).await?;
        let payload = response.json::<StatusBody>().await?;
        Ok(payload.status)
    }

    async fn upload_asset(
        &self,
        bytes: &[u8],
        filename: &str,
        mime_type: &str,
    ) -> Result<UploadedMedia> {
        let encoded_filename = urlencoding::encode(filename);
        let request = self
            .authed(Method::POST, &format!("/v1/media?filename={encoded_filename}"))
            .await?
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes.to_vec());
        let response = Self::expect_success(self.send_with_retry(request).await?).await?;
        Ok(response.json::<UploadedMedia>().await?)
    }

    async fn check_asset_exists(&self, media_ref: &str) -> Result<bool> {
        let request = self
            .authed(Method::GET, &format!("/v1/media/{media_ref}"))
            .await?;
        let response = self
            .send_with_retry(request)
            .await
            .map_err(|error| Error::ExistenceCheck(error.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else if status.is_success() {
            Ok(true)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::ExistenceCheck(parse_api_error(status, &body)))
        }
    }

    async fn delete_publication(&self, token: &str) -> Result<()> {
        let request = self
            .authed(Method::DELETE, &format!("/v1/publications/{token}"))
            .await?;
        Self::expect_success(self.send_with_retry(request).await?).await?;
        Ok(())
    }

    async fn delete_draft(&self, token: &str) -> Result<()> {
        let request = self
            .authed(Method::DELETE, &format!("/v1/drafts/{token}"))
            .await?;
        Self::expect_success(self.send_with_retry(request).await?).await?;
        Ok(())
    }

    async fn list_drafts(&self, offset: u32, count: u32) -> Result<Vec<DraftSummary>> {
        let request = self
            .authed(
                Method::GET,
                &format!("/v1/drafts?offset={offset}&count={count}"),
            )
            .await?;
        let response = Self::expect_success(self.send_with_retry(request).await?).await?;
        let payload = response.json::<ListBody<DraftSummary>>().await?;
        Ok(payload.items)
    }

    async fn list_publications(&self, offset: u32, count: u32) -> Result<Vec<PublicationSummary>> {
        let request = self
            .authed(
                Method::GET,
                &format!("/v1/publications?offset={offset}&count={count}"),
            )
            .await?;
        let response = Self::expect_success(self.send_with_retry(request).await?).await?;
        let payload = response.json::<ListBody<PublicationSummary>>().await?;
        Ok(payload.items)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send_with_retry(self.client.get(url)).await?;
        let response = Self::expect_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
}

impl TryFrom<TokenResponse> for AccessToken {
    type Error = Error;

    fn try_from(value: TokenResponse) -> Result<Self> {
        let token = value
            .access_token
            .or(value.token)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                Error::PermanentRemote("token response did not include access_token".into())
            })?;

        let expires_at = value
            .expires_at
            .or_else(|| {
                value
                    .expires_in
                    .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
            })
            .ok_or_else(|| {
                Error::PermanentRemote("token response did not include expires_at/expires_in".into())
            })?;

        Ok(Self { token, expires_at })
    }
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: PublicationStatus,
}

#[derive(Debug, Deserialize)]
struct ListBody<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::InvalidInput("API base URL must not be empty".into()));
    }
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        return Err(Error::InvalidInput(
            "API base URL must include http:// or https://".into(),
        ));
    }
    Ok(base)
}

fn unix_timestamp_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| {
            i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
        })
}
