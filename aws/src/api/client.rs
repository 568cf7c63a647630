use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

use super::common::{ErrorResponse, QueryParams, ReturnResponse};
use super::error::ApiError;
use super::pool::ClientConfig;

/// EC2 query API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: url::Url,
    auth_header: Option<String>,
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, token: Option<&str>, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(
            endpoint,
            token,
            ClientConfig {
                insecure,
                ..Default::default()
            },
        )
    }

    pub fn with_config(
        endpoint: &str,
        token: Option<&str>,
        config: ClientConfig,
    ) -> Result<Self, ApiError> {
        let base_url = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                endpoint
            )));
        }

        let http_client = config.build_client()?;
        let auth_header = token.map(|t| format!("Bearer {}", t));

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header,
            }),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.inner.base_url.as_str()
    }

    /// Network interface API operations
    pub fn network_interfaces(&self) -> crate::api::network_interfaces::NetworkInterfacesApi<'_> {
        crate::api::network_interfaces::NetworkInterfacesApi::new(self)
    }

    /// Tagging API operations
    pub fn tags(&self) -> crate::api::tags::TagsApi<'_> {
        crate::api::tags::TagsApi::new(self)
    }

    /// Execute `action` and decode its JSON body
    pub async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        params: QueryParams,
    ) -> Result<T, ApiError> {
        let response = self.send(action, params).await?;
        self.parse_success_response(action, response).await
    }

    /// Execute an action whose response only acknowledges the request
    pub async fn call_unit(&self, action: &str, params: QueryParams) -> Result<(), ApiError> {
        let response = self.send(action, params).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(());
        }

        let ack: ReturnResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to deserialize {} response: {}, body: {}", action, e, text);
            ApiError::ParseError(format!("Failed to parse {} response: {}", action, e))
        })?;
        if !ack.r#return {
            return Err(ApiError::ParseError(format!(
                "{} was not acknowledged",
                action
            )));
        }
        Ok(())
    }

    async fn send(&self, action: &str, params: QueryParams) -> Result<reqwest::Response, ApiError> {
        tracing::debug!("{} request to: {}", action, self.inner.base_url);

        let mut request = self
            .inner
            .http_client
            .post(self.inner.base_url.clone())
            .form(&params.into_form(action));
        if let Some(auth) = &self.inner.auth_header {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} response status: {}", action, status);

        if status.is_success() {
            return Ok(response);
        }
        Err(self.handle_error_response(status, response).await)
    }

    async fn parse_success_response<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize {} response: {}, body: {}", action, e, text);
            ApiError::ParseError(format!("Failed to parse {} response: {}", action, e))
        })
    }

    async fn handle_error_response(&self, status: StatusCode, response: reqwest::Response) -> ApiError {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("API error response: {}", text);

        let first = serde_json::from_str::<ErrorResponse>(&text)
            .ok()
            .and_then(|parsed| parsed.errors.into_iter().next());

        match (status, first) {
            (StatusCode::UNAUTHORIZED, _) => ApiError::AuthError,
            (StatusCode::TOO_MANY_REQUESTS, _) => ApiError::RateLimited,
            (_, Some(entry)) => ApiError::Service {
                status: status.as_u16(),
                code: entry.code,
                message: entry.message,
            },
            (s, None) if s.is_server_error() => ApiError::ServiceUnavailable,
            (_, None) => ApiError::Service {
                status: status.as_u16(),
                code: status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .replace(' ', ""),
                message: text,
            },
        }
    }
}
