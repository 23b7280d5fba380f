use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use super::{ ChatClient, CompletionResponse, MessageContent, PromptMessage };
use crate::llm::LlmConfig;

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    options: Option<ChatOptions>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a ChatOptions>,
}

#[derive(Serialize, Debug, Clone)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: MessageContent,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| "llama3".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
            options: None,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != crate::llm::LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        let mut client = Self::new(config.base_url.clone(), config.completion_model.clone());
        if config.temperature.is_some() || config.max_tokens.is_some() {
            client.options = Some(ChatOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            });
        }
        Ok(client)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(
        &self,
        messages: &[PromptMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let req = ChatRequest {
            model: &self.completion_model,
            messages,
            stream: false,
            options: self.options.as_ref(),
        };
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<ChatResponse>().await?;
        let content = data.message.map(|m| m.content).unwrap_or_default();
        Ok(CompletionResponse { content })
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmType;

    #[test]
    fn rejects_foreign_config() {
        let config = LlmConfig { llm_type: LlmType::OpenAI, ..LlmConfig::default() };
        assert!(OllamaClient::from_config(&config).is_err());
    }

    #[test]
    fn sampling_options_only_sent_when_configured() {
        let plain = LlmConfig { llm_type: LlmType::Ollama, ..LlmConfig::default() };
        assert!(OllamaClient::from_config(&plain).unwrap().options.is_none());

        let tuned = LlmConfig { temperature: Some(0.2), ..plain };
        let client = OllamaClient::from_config(&tuned).unwrap();
        let messages = [PromptMessage::user("hi")];
        let req = ChatRequest {
            model: &client.completion_model,
            messages: &messages,
            stream: false,
            options: client.options.as_ref(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!((value["options"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(value["options"].get("num_predict").is_none());
    }

    #[test]
    fn flat_message_content_decodes() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"model":"llama3","message":{"role":"assistant","content":" hello "},"done":true}"#
        ).unwrap();
        assert_eq!(resp.message.unwrap().content.normalize(), "hello");
    }
}
