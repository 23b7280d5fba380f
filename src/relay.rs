use crate::cli::Args;
use crate::config::prompt::resolve_system_prompt;
use crate::llm::LlmConfig;
use crate::llm::chat::{ ChatClient, PromptMessage, new_client as new_chat_client };
use crate::models::relay::{ RelayRequest, RelayResponse };

use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use axum::Json;
use log::{ debug, error, info, warn };
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("A non-empty 'message' field is required.")]
    MissingMessage,
    #[error("The assistant returned an empty response.")]
    EmptyCompletion,
    #[error("Failed to get a response from the language model.")]
    Upstream(#[source] Box<dyn StdError + Send + Sync>),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidBody(_) | RelayError::MissingMessage => StatusCode::BAD_REQUEST,
            RelayError::EmptyCompletion => StatusCode::BAD_GATEWAY,
            RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = RelayResponse::Error { error: self.to_string() };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Stateless bridge between relay requests and a chat provider. Shared
/// read-only across request handlers.
#[derive(Clone)]
pub struct Relay {
    chat_client: Arc<dyn ChatClient>,
    system_prompt: String,
    max_history_turns: usize,
}

impl Relay {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        system_prompt: impl Into<String>,
        max_history_turns: usize
    ) -> Self {
        Self {
            chat_client,
            system_prompt: system_prompt.into(),
            max_history_turns,
        }
    }

    pub fn from_args(args: &Args) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_config = LlmConfig {
            llm_type: args.chat_llm_type.parse()?,
            api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone(),
            temperature: args.temperature,
            max_tokens: args.max_tokens,
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={}",
            chat_config.llm_type,
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("adapter default")
        );

        let system_prompt = resolve_system_prompt(
            args.system_prompt.as_deref(),
            args.system_prompt_path.as_deref()
        )?;

        Ok(Self::new(chat_client, system_prompt, args.max_history_turns))
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// System instruction, then the most recent history turns, then the new
    /// user message.
    pub fn build_messages(&self, request: &RelayRequest) -> Vec<PromptMessage> {
        let skip = match self.max_history_turns {
            0 => 0,
            limit => request.history.len().saturating_sub(limit),
        };
        if skip > 0 {
            debug!("Truncating history: dropping {} oldest turns", skip);
        }

        let mut messages = Vec::with_capacity(request.history.len() - skip + 2);
        messages.push(PromptMessage::system(self.system_prompt.clone()));
        messages.extend(request.history.iter().skip(skip).map(PromptMessage::from));
        messages.push(PromptMessage::user(request.message.trim()));
        messages
    }

    pub async fn reply(&self, request: &RelayRequest) -> Result<String, RelayError> {
        if request.message.trim().is_empty() {
            return Err(RelayError::MissingMessage);
        }

        let messages = self.build_messages(request);
        debug!("Forwarding {} prompt messages to {}", messages.len(), self.chat_client.get_model());

        let completion = self.chat_client.complete(&messages).await.map_err(|e| {
            error!("Chat completion failed: {}", e);
            RelayError::Upstream(e)
        })?;

        let text = completion.text();
        if text.is_empty() {
            warn!("Chat completion returned no usable text");
            return Err(RelayError::EmptyCompletion);
        }
        Ok(text)
    }
}
