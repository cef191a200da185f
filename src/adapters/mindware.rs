//! Mindware relay adapter.
//!
//! Endpoint: POST /api/v1/relay
//! Auth: Bearer token (explicit key, or MINDWARE_API_KEY)
//!
//! One invocation is exactly one HTTP exchange. There is no retry and no
//! caching; a missing `response` field yields a fixed message, not an error.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;

use super::{Tool, ToolDescriptor};

/// Default relay host
pub const DEFAULT_BASE_URL: &str = "https://api.mindware.co";

/// Relay path appended to the base URL
pub const RELAY_PATH: &str = "/api/v1/relay";

/// Environment variable holding the fallback credential
pub const API_KEY_ENV: &str = "MINDWARE_API_KEY";

/// Returned when the relay answers without a usable `response` field
pub const NO_RESPONSE_MESSAGE: &str = "No response received from Mindware";

const TOOL_NAME: &str = "mindware";
const DISPLAY_NAME: &str = "Mindware";
const DESCRIPTION: &str = "A tool that intelligently accesses external data sources and functionalities without the need for complex integrations.";

/// Errors raised while constructing a [`MindwareTool`]
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Mindware API key not set. You can set it as MINDWARE_API_KEY in your environment, or pass it to Mindware as api_key.")]
    MissingApiKey,

    #[error("Failed to build HTTP client for Mindware: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors raised by a relay invocation
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Relay answered with a non-success status
    #[error("Got {status} error from Mindware: {status_text}")]
    Status { status: u16, status_text: String },

    /// Success status, but the body was not JSON
    #[error("Malformed response from Mindware: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("Failed to reach Mindware: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Mindware did not respond within {0:?}")]
    Timeout(Duration),
}

/// Construction options for [`MindwareTool`]
#[derive(Clone, Default)]
pub struct MindwareParams {
    /// Explicit credential; overrides MINDWARE_API_KEY
    pub api_key: Option<String>,
    /// Passed through to the relay as `maxActions`
    pub max_actions: Option<u32>,
    /// Passed through to the relay as `maxServices`
    pub max_services: Option<u32>,
    /// Relay host (default: https://api.mindware.co)
    pub base_url: Option<String>,
    /// Deadline applied to every `invoke`
    pub timeout: Option<Duration>,
}

impl fmt::Debug for MindwareParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindwareParams")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_actions", &self.max_actions)
            .field("max_services", &self.max_services)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Wire body of a relay request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_actions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_services: Option<u32>,
}

/// Mindware relay client exposed as a tool
pub struct MindwareTool {
    api_key: String,
    max_actions: Option<u32>,
    max_services: Option<u32>,
    endpoint: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl fmt::Debug for MindwareTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindwareTool")
            .field("api_key", &"<redacted>")
            .field("max_actions", &self.max_actions)
            .field("max_services", &self.max_services)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MindwareTool {
    /// Create a tool, falling back to MINDWARE_API_KEY when no key is given
    pub fn new(params: MindwareParams) -> Result<Self, ConfigurationError> {
        Self::with_key_lookup(params, |name| std::env::var(name).ok())
    }

    /// Create a tool with an injected credential lookup
    ///
    /// `lookup` is called with [`API_KEY_ENV`] only when `params.api_key` is
    /// `None`. An explicit empty key is rejected without consulting it.
    pub fn with_key_lookup<F>(params: MindwareParams, lookup: F) -> Result<Self, ConfigurationError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let api_key = match params.api_key {
            Some(key) => key,
            None => lookup(API_KEY_ENV).unwrap_or_default(),
        };

        if api_key.is_empty() {
            return Err(ConfigurationError::MissingApiKey);
        }

        let base_url = params.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), RELAY_PATH);

        let client = reqwest::Client::builder()
            .build()
            .map_err(ConfigurationError::HttpClient)?;

        Ok(Self {
            api_key,
            max_actions: params.max_actions,
            max_services: params.max_services,
            endpoint,
            timeout: params.timeout,
            client,
        })
    }

    /// Name and description, available without a credential
    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: TOOL_NAME.to_string(),
            description: DESCRIPTION.to_string(),
        }
    }

    /// Full relay URL this tool posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `prompt` to the relay and return its answer
    ///
    /// Bounded by the configured timeout if one was set.
    pub async fn invoke(&self, prompt: &str) -> Result<String, RemoteError> {
        match self.timeout {
            Some(deadline) => self.invoke_with_timeout(prompt, deadline).await,
            None => self.relay(prompt).await,
        }
    }

    /// Send `prompt` to the relay, giving up after `deadline`
    pub async fn invoke_with_timeout(
        &self,
        prompt: &str,
        deadline: Duration,
    ) -> Result<String, RemoteError> {
        timeout(deadline, self.relay(prompt))
            .await
            .map_err(|_| RemoteError::Timeout(deadline))?
    }

    async fn relay(&self, prompt: &str) -> Result<String, RemoteError> {
        let body = RelayRequest {
            prompt,
            max_actions: self.max_actions,
            max_services: self.max_services,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            prompt_len = prompt.len(),
            max_actions = ?self.max_actions,
            max_services = ?self.max_services,
            "Sending Mindware relay request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Mindware relay returned an error status");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                status_text: status_text(&response),
            });
        }

        let bytes = response.bytes().await.map_err(RemoteError::Transport)?;
        let payload: Value =
            serde_json::from_slice(&bytes).map_err(RemoteError::MalformedPayload)?;

        Ok(extract_response(&payload))
    }
}

/// Reason phrase the relay sent, else the canonical one, else the code
fn status_text(response: &reqwest::Response) -> String {
    if let Some(reason) = response.extensions().get::<hyper::ext::ReasonPhrase>() {
        return String::from_utf8_lossy(reason.as_bytes()).into_owned();
    }

    let status = response.status();
    status
        .canonical_reason()
        .unwrap_or_else(|| status.as_str())
        .to_string()
}

/// Pull the answer out of a relay payload
fn extract_response(payload: &Value) -> String {
    match payload.get("response").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_RESPONSE_MESSAGE.to_string(),
    }
}

#[async_trait]
impl Tool for MindwareTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn call(&self, input: &str) -> anyhow::Result<String> {
        Ok(self.invoke(input).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params_with_key(key: &str) -> MindwareParams {
        MindwareParams {
            api_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_body_with_tuning() {
        let body = RelayRequest {
            prompt: "hello",
            max_actions: Some(3),
            max_services: Some(2),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"prompt":"hello","maxActions":3,"maxServices":2}"#
        );
    }

    #[test]
    fn test_request_body_omits_unset_tuning() {
        let body = RelayRequest {
            prompt: "",
            max_actions: None,
            max_services: Some(1),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"prompt":"","maxServices":1}"#
        );
    }

    #[test]
    fn test_explicit_key_skips_lookup() {
        let tool = MindwareTool::with_key_lookup(params_with_key("explicit"), |_| {
            panic!("lookup must not run when a key is given")
        })
        .unwrap();
        assert_eq!(tool.api_key, "explicit");
    }

    #[test]
    fn test_lookup_used_without_explicit_key() {
        let tool = MindwareTool::with_key_lookup(MindwareParams::default(), |name| {
            assert_eq!(name, API_KEY_ENV);
            Some("from-env".to_string())
        })
        .unwrap();
        assert_eq!(tool.api_key, "from-env");
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = MindwareTool::with_key_lookup(MindwareParams::default(), |_| None).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingApiKey));

        let message = err.to_string();
        assert!(message.contains("MINDWARE_API_KEY"));
        assert!(message.contains("api_key"));
    }

    #[test]
    fn test_empty_keys_rejected() {
        let err = MindwareTool::with_key_lookup(params_with_key(""), |_| Some("env".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingApiKey));

        let err = MindwareTool::with_key_lookup(MindwareParams::default(), |_| Some(String::new()))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingApiKey));
    }

    #[test]
    fn test_endpoint_defaults_and_overrides() {
        let tool = MindwareTool::new(params_with_key("k")).unwrap();
        assert_eq!(tool.endpoint(), "https://api.mindware.co/api/v1/relay");

        let tool = MindwareTool::new(MindwareParams {
            base_url: Some("http://localhost:8080/".to_string()),
            ..params_with_key("k")
        })
        .unwrap();
        assert_eq!(tool.endpoint(), "http://localhost:8080/api/v1/relay");
    }

    #[test]
    fn test_extract_response() {
        assert_eq!(extract_response(&json!({"response": "42"})), "42");
        assert_eq!(extract_response(&json!({})), NO_RESPONSE_MESSAGE);
        assert_eq!(extract_response(&json!({"response": ""})), NO_RESPONSE_MESSAGE);
        assert_eq!(extract_response(&json!({"response": null})), NO_RESPONSE_MESSAGE);
        assert_eq!(extract_response(&json!({"response": 7})), NO_RESPONSE_MESSAGE);
        assert_eq!(extract_response(&json!(["response"])), NO_RESPONSE_MESSAGE);
    }

    #[test]
    fn test_debug_redacts_key() {
        let params = params_with_key("super-secret");
        assert!(!format!("{:?}", params).contains("super-secret"));

        let tool = MindwareTool::new(params).unwrap();
        assert!(!format!("{:?}", tool).contains("super-secret"));
    }

    #[test]
    fn test_tool_identity() {
        let tool = MindwareTool::new(params_with_key("k")).unwrap();
        assert_eq!(tool.name(), "mindware");
        assert_eq!(tool.display_name(), "Mindware");
        assert_eq!(
            tool.description(),
            "A tool that intelligently accesses external data sources and functionalities without the need for complex integrations."
        );
    }

    #[test]
    fn test_descriptor_matches_instance() {
        let tool = MindwareTool::new(params_with_key("k")).unwrap();
        let descriptor = MindwareTool::descriptor();
        assert_eq!(descriptor.name, tool.name());
        assert_eq!(descriptor.description, tool.description());
    }

    #[test]
    fn test_status_text_falls_back_to_code() {
        let response: reqwest::Response = hyper::Response::builder()
            .status(599)
            .body("")
            .unwrap()
            .into();
        assert_eq!(status_text(&response), "599");

        let response: reqwest::Response = hyper::Response::builder()
            .status(404)
            .body("")
            .unwrap()
            .into();
        assert_eq!(status_text(&response), "Not Found");
    }

    #[test]
    fn test_status_error_message() {
        let err = RemoteError::Status {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Got 503 error from Mindware: Service Unavailable"
        );
    }
}
