//! Authorized request gateway: the one HTTP client every REST call uses.
//!
//! SYSTEM CONTEXT
//! ==============
//! Feature code never builds its own `reqwest::Client`. It asks the gateway
//! for a request builder, fills in body and query, and hands it back to
//! [`Gateway::send`], so authorization and 401 handling are one policy.
//!
//! DESIGN
//! ======
//! Two interception points run around each request:
//! - outbound, immediately before dispatch: read the session snapshot and set
//!   `Authorization: Bearer <token>` when a non-empty token exists;
//! - inbound, after the response: 2xx passes through unchanged; any other
//!   status becomes [`GatewayError::Status`], and a `401` first clears the
//!   session with [`LogoutReason::Unauthorized`].
//!
//! There is no retry, no queueing behind a refresh, and no de-duplication.
//! Every 401 clears the session, whichever endpoint produced it.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::session::{LogoutReason, SessionStore};
use crate::storage::StorageError;

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

// =============================================================================
// ERROR
// =============================================================================

/// Errors surfaced to callers of the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request could not be built, usually because the URL is malformed.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response (DNS, connect, timeout, body).
    #[error("transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API response error: status {status}")]
    Status {
        status: u16,
        /// `message` (or `error`) field of a JSON error body, when present.
        message: Option<String>,
        body: String,
    },

    /// A 2xx body could not be decoded into the expected type.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response was fine but recording the session change failed.
    #[error("session update failed: {0}")]
    Session(#[from] StorageError),
}

impl GatewayError {
    /// HTTP status for [`GatewayError::Status`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Stable machine-readable code for logs and CLI output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::InvalidUrl(_) => "E_INVALID_URL",
            Self::Transport(e) if e.is_timeout() => "E_TIMEOUT",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Status { status: 401, .. } => "E_UNAUTHORIZED",
            Self::Status { status: 403, .. } => "E_FORBIDDEN",
            Self::Status { status: 404, .. } => "E_NOT_FOUND",
            Self::Status { status: 500..=599, .. } => "E_SERVER",
            Self::Status { .. } => "E_API_RESPONSE",
            Self::Decode(_) => "E_DECODE",
            Self::Session(_) => "E_SESSION",
        }
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Shared HTTP client bound to the session store.
#[derive(Clone, Debug)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl Gateway {
    /// Build the gateway's HTTP client from `config` and bind it to `session`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HttpClientBuild`] if the TLS backend or client
    /// configuration cannot be initialized.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let builder = reqwest::Client::builder().default_headers(headers);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        let http = builder
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_owned(), session })
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/posts/12`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request against `path`. Authorization is added by [`Gateway::send`].
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Outbound interception: attach the current bearer token, if any.
    ///
    /// The header is `Bearer <token>` exactly. A token that is not a legal
    /// header value (control or non-visible-ASCII bytes) cannot be sent; the
    /// request then goes out without `Authorization` and a warning is logged.
    /// The backend answers such requests as anonymous, so a protected route
    /// returns 401 and the session is cleared through the usual path.
    pub fn authorize(&self, request: &mut reqwest::Request) {
        let Some(token) = self.session.bearer_token() else {
            tracing::debug!(url = %request.url(), "sending unauthenticated request");
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
                tracing::debug!(url = %request.url(), "sending authorized request");
            }
            Err(_) => {
                tracing::warn!(url = %request.url(), "access token is not a valid header value; sending unauthenticated");
            }
        }
    }

    /// Dispatch a request built by [`Gateway::request`].
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidUrl`] when the request cannot be built.
    /// - [`GatewayError::Transport`] when no response arrives.
    /// - [`GatewayError::Status`] for any non-2xx status. For `401` the
    ///   session has already been cleared when this returns.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, GatewayError> {
        let mut request = builder.build().map_err(|e| {
            if e.is_builder() { GatewayError::InvalidUrl(e.to_string()) } else { GatewayError::Transport(e) }
        })?;
        self.authorize(&mut request);
        let url = request.url().to_string();

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %url, status = e.status().map(|s| s.as_u16()), message = %e, "API error");
                return Err(GatewayError::Transport(e));
            }
        };
        self.inspect(&url, response).await
    }

    /// Inbound interception.
    async fn inspect(&self, url: &str, response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.session.logout(LogoutReason::Unauthorized) {
                tracing::error!(url, error = %e, "session cleared but logout was not persisted");
            }
        }

        let message = error_message(&body);
        tracing::error!(
            url,
            status = status.as_u16(),
            message = message.as_deref().unwrap_or_else(|| status.canonical_reason().unwrap_or("")),
            "API error"
        );
        Err(GatewayError::Status { status: status.as_u16(), message, body })
    }

    // =========================================================================
    // JSON HELPERS
    // =========================================================================

    /// # Errors
    ///
    /// See [`Gateway::send`]; also [`GatewayError::Decode`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    /// # Errors
    ///
    /// See [`Gateway::send`]; also [`GatewayError::Decode`].
    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        decode(response).await
    }

    /// # Errors
    ///
    /// See [`Gateway::send`]; also [`GatewayError::Decode`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        decode(response).await
    }

    /// # Errors
    ///
    /// See [`Gateway::send`]; also [`GatewayError::Decode`].
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::PUT, path).json(body))
            .await?;
        decode(response).await
    }

    /// POST with no body; the response body is ignored.
    ///
    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn post_empty(&self, path: &str) -> Result<(), GatewayError> {
        self.send(self.request(Method::POST, path)).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Gateway::send`].
    pub async fn delete(&self, path: &str) -> Result<(), GatewayError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`Gateway::send`]; also [`GatewayError::Decode`].
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, GatewayError> {
        let response = self
            .send(self.request(Method::POST, path).multipart(form))
            .await?;
        decode(response).await
    }
}

/// Decode a JSON body. An empty body decodes as `null`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Human-readable message from a backend error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str).filter(|m| !m.is_empty()))
        .map(str::to_owned)
}
