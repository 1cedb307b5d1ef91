//! HTTP client wrapper
//!
//! This module owns every request to the lead API:
//! - Building the reqwest client with timeout and user agent
//! - Joining endpoint paths onto the configured base URL
//! - Attaching the stored bearer token
//! - Tearing the session down on 401
//! - Classifying failures into `ApiError`

use crate::api::error::ApiError;
use crate::config::ApiConfig;
use crate::session::Session;
use crate::ConfigError;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Query parameters, appended in order; callers only include present values
pub type Query<'a> = [(&'a str, String)];

/// Builds an HTTP client with the configured per-request ceiling
///
/// # Arguments
///
/// * `config` - The API connection settings
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("lead-desk/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Configured client for the lead API
///
/// Cloning is cheap: the connection pool and session are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    /// Creates a client for `config.base_url` bound to `session`
    ///
    /// # Returns
    ///
    /// * `Ok(ApiClient)` - Client ready to issue requests
    /// * `Err(LeadDeskError)` - Invalid base URL or client construction failure
    pub fn new(config: &ApiConfig, session: Arc<Session>) -> crate::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
        let http = build_http_client(config)?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// GET a JSON resource
    pub async fn get_json<T>(&self, path: &str, query: &Query<'_>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, path)?.query(query);
        let response = self.dispatch(request, "GET", path).await?;
        decode(response).await
    }

    /// POST a JSON body
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.dispatch(request, "POST", path).await?;
        decode(response).await
    }

    /// POST without a body
    pub async fn post_empty<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?;
        let response = self.dispatch(request, "POST", path).await?;
        decode(response).await
    }

    /// PUT a JSON body
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path)?.json(body);
        let response = self.dispatch(request, "PUT", path).await?;
        decode(response).await
    }

    /// DELETE a resource
    pub async fn delete_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::DELETE, path)?;
        let response = self.dispatch(request, "DELETE", path).await?;
        decode(response).await
    }

    /// GET a binary payload (file exports)
    pub async fn get_bytes(&self, path: &str, query: &Query<'_>) -> Result<Vec<u8>, ApiError> {
        let request = self.request(Method::GET, path)?.query(query);
        let response = self.dispatch(request, "GET", path).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;
        Ok(bytes.to_vec())
    }

    /// Resolves `path` against the base URL, keeping any base path prefix
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url);

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        Ok(request)
    }

    /// Sends a request and classifies the outcome
    ///
    /// # Status Handling
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | response passed through unchanged |
    /// | 401 | session invalidated, `Unauthorized` |
    /// | other status | `ApiError::from_status` with the body preserved |
    /// | timeout | `Timeout` |
    /// | no response | `Network` |
    async fn dispatch(
        &self,
        request: RequestBuilder,
        method: &str,
        path: &str,
    ) -> Result<Response, ApiError> {
        tracing::debug!("{} {}", method, path);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = ApiError::from_transport(&e);
                tracing::warn!("{} {} failed: {}", method, path, error);
                return Err(error);
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("{} {} returned 401", method, path);
            self.session.invalidate();
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status.as_u16(), &body);
        tracing::warn!("{} {} failed: {}", method, path, error);
        Err(error)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

async fn decode<T>(response: Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::from_transport(&e))?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}
