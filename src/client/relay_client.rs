use crate::models::relay::{ RelayRequest, RelayResponse };
use log::debug;
use reqwest::{ Client as HttpClient, StatusCode };
use serde_json::Value as JsonValue;
use thiserror::Error;
use url::Url;

pub const FALLBACK_ERROR: &str = "Unable to retrieve a response.";

/// Everything a send can fail with. The `Display` text is what the UI shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Missing relay endpoint. Please configure RELAY_URL.")]
    MissingEndpoint,
    #[error("Invalid relay endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        endpoint: String,
        reason: String,
    },
    #[error("{0}")]
    Relay(String),
    #[error("The assistant returned an empty response.")]
    EmptyReply,
    #[error("{0}")]
    Transport(String),
}

impl ClientError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, ClientError::MissingEndpoint | ClientError::InvalidEndpoint { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    http: HttpClient,
    endpoint: Option<String>,
}

impl RelayClient {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            http: HttpClient::new(),
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
        }
    }

    /// Validates the configured endpoint without touching the network.
    pub fn endpoint(&self) -> Result<Url, ClientError> {
        let raw = self.endpoint.as_deref().ok_or(ClientError::MissingEndpoint)?;
        Url::parse(raw.trim()).map_err(|e| ClientError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn send(&self, endpoint: &Url, request: &RelayRequest) -> Result<String, ClientError> {
        debug!("POST {} ({} history turns)", endpoint, request.history.len());
        let resp = self.http
            .post(endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ClientError::Transport(e.to_string()))?;
        interpret_response(status, &body)
    }
}

/// Maps a relay HTTP response onto a reply or a displayable error.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<String, ClientError> {
    let decoded = serde_json::from_str::<JsonValue>(body)
        .ok()
        .map(|value| serde_json::from_value::<RelayResponse>(value).ok());

    if !status.is_success() {
        let message = match decoded {
            Some(Some(RelayResponse::Error { error })) if !error.trim().is_empty() => error,
            _ => FALLBACK_ERROR.to_string(),
        };
        return Err(ClientError::Relay(message));
    }

    match decoded {
        None => Err(ClientError::Relay(FALLBACK_ERROR.to_string())),
        Some(Some(RelayResponse::Message { message })) if !message.trim().is_empty() => {
            Ok(message.trim().to_string())
        }
        Some(_) => Err(ClientError::EmptyReply),
    }
}
