//! Asynchronous client for the ticketdesk API.
//!
//! # Design
//! `ApiClient` holds an immutable `ClientConfig` and a `Transport`, and
//! carries no mutable state between calls. Every call is split into a pure
//! `build_request` step producing an `HttpRequest`, a transport exchange
//! raced against a timer, and a pure `parse_response` step consuming the
//! `HttpResponse`. Only the middle step touches the network, so the build
//! and parse halves are deterministic and tested without I/O.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{find_header, set_header, HttpMethod, HttpRequest, HttpResponse};
use crate::request::{QueryValue, RequestDescriptor};
use crate::transport::{ReqwestTransport, Transport};

/// Result of `ApiClient::test_connection`. Never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Client for the remote JSON API.
///
/// Cheap to clone; clones share the config and the transport. Construct one
/// at startup and pass it by reference to every call-site.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    pub fn with_shared_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let base_url = config.base_url.clone();
        let config = config.with_base_url(&base_url);
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Client over a default `reqwest` transport.
    pub fn with_reqwest(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(config, ReqwestTransport::new()?))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Turn a descriptor into the exact request that will be transmitted.
    pub fn build_request(&self, desc: &RequestDescriptor) -> Result<HttpRequest, ApiError> {
        let url = self.build_url(desc)?;

        let mut headers = self.config.default_headers.clone();
        for (name, value) in &desc.headers {
            set_header(&mut headers, name, value);
        }

        let body = match &desc.body {
            Some(body) if desc.method.allows_body() => {
                let serialized = serde_json::to_string(body)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                let declares_json = find_header(&headers, "content-type")
                    .is_some_and(|v| v.to_ascii_lowercase().contains("json"));
                if !declares_json {
                    set_header(&mut headers, "Content-Type", "application/json");
                }
                Some(serialized)
            }
            Some(_) => {
                warn!(method = %desc.method, endpoint = %desc.endpoint, "dropping body for method without one");
                None
            }
            None => None,
        };

        Ok(HttpRequest {
            method: desc.method,
            url,
            headers,
            body,
        })
    }

    fn build_url(&self, desc: &RequestDescriptor) -> Result<String, ApiError> {
        let raw = format!(
            "{}/{}",
            self.config.base_url,
            desc.endpoint.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;

        let mut defined = desc.defined_query().peekable();
        if defined.peek().is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in defined {
                pairs.append_pair(key, &value.to_string());
            }
        }
        Ok(url.into())
    }

    /// Interpret a response: status, then JSON, then the `error` marker.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if !response.is_success() {
            return Err(ApiError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        match application_error(&payload) {
            Some(err) => Err(err),
            None => Ok(payload),
        }
    }

    /// Perform one call and return its parsed JSON payload.
    pub async fn request(&self, desc: RequestDescriptor) -> Result<Value, ApiError> {
        let timeout = desc.timeout.unwrap_or(self.config.timeout);
        let request = self.build_request(&desc)?;
        let response = self.exchange(request, timeout).await?;
        self.parse_response(response)
    }

    /// Perform one call and decode its payload into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, desc: RequestDescriptor) -> Result<T, ApiError> {
        let payload = self.request(desc).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Race the transport against a timer. The loser is dropped: a dropped
    /// transport future closes its connection, a dropped sleep cancels the timer.
    async fn exchange(&self, request: HttpRequest, timeout: Duration) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        tokio::select! {
            result = self.transport.execute(request) => {
                if let Ok(response) = &result {
                    debug!(%method, %url, status = response.status, "request settled");
                }
                result
            }
            () = tokio::time::sleep(timeout) => {
                warn!(%method, %url, timeout_ms = timeout.as_millis() as u64, "request timed out");
                Err(ApiError::Timeout { after: timeout })
            }
        }
    }

    pub async fn get(
        &self,
        endpoint: &str,
        query: Vec<(String, Option<QueryValue>)>,
    ) -> Result<Value, ApiError> {
        let mut desc = RequestDescriptor::get(endpoint);
        desc.query = query;
        self.request(desc).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value, ApiError> {
        self.request(RequestDescriptor::post(endpoint).json(body)?).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value, ApiError> {
        self.request(RequestDescriptor::put(endpoint).json(body)?).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Value, ApiError> {
        self.request(RequestDescriptor::patch(endpoint).json(body)?).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.request(RequestDescriptor::new(HttpMethod::Delete, endpoint)).await
    }

    /// Probe the API with the configured lightweight call.
    pub async fn test_connection(&self) -> ConnectionReport {
        let mut desc = RequestDescriptor::get(&self.config.probe_endpoint);
        desc.query = self
            .config
            .probe_query
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect();

        match self.request(desc).await {
            Ok(data) => ConnectionReport {
                success: true,
                message: "Connection successful".to_string(),
                error: None,
                data: Some(data),
            },
            Err(err) => {
                warn!(error = %err, "connection test failed");
                ConnectionReport {
                    success: false,
                    message: "Connection failed".to_string(),
                    error: Some(err.to_string()),
                    data: None,
                }
            }
        }
    }
}

/// Extract the application-level `error` marker from a payload.
///
/// Any truthy `error` value is a marker: `null`, `false`, `0` and `""` are
/// not. Strings are the message; objects supply `message`|`msg` and
/// `code`|`status`; `true` takes the top-level `message` and `code`; numbers
/// and arrays use their JSON text as the message.
fn application_error(payload: &Value) -> Option<ApiError> {
    let marker = payload.as_object()?.get("error")?;
    let (message, code) = match marker {
        Value::Null | Value::Bool(false) => return None,
        Value::String(message) if message.is_empty() => return None,
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::String(message) => (Some(message.trim().to_string()), None),
        Value::Object(fields) => (
            ["message", "msg"]
                .iter()
                .find_map(|k| fields.get(*k).and_then(Value::as_str))
                .map(str::to_string),
            ["code", "status"]
                .iter()
                .find_map(|k| fields.get(*k).and_then(scalar_text)),
        ),
        Value::Bool(true) => (
            payload.get("message").and_then(Value::as_str).map(str::to_string),
            payload.get("code").and_then(scalar_text),
        ),
        Value::Number(_) | Value::Array(_) => (Some(marker.to_string()), None),
    };
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "application error".to_string());
    Some(ApiError::Application { message, code })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
