#![allow(dead_code)]

use async_trait::async_trait;
use chat_relay::llm::chat::{ ChatClient, CompletionResponse, MessageContent, PromptMessage };
use chat_relay::relay::Relay;
use chat_relay::server::api::router;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };

pub enum MockReply {
    Content(MessageContent),
    Fail(String),
}

/// Provider stand-in that records every prompt it receives.
pub struct MockChatClient {
    reply: MockReply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

impl MockChatClient {
    pub fn new(reply: MockReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::new(MockReply::Content(MessageContent::Text(text.to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Vec<PromptMessage> {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(
        &self,
        messages: &[PromptMessage]
    ) -> Result<CompletionResponse, Box<dyn Error + Send + Sync>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            MockReply::Content(content) => Ok(CompletionResponse { content: content.clone() }),
            MockReply::Fail(reason) => Err(reason.clone().into()),
        }
    }

    fn get_model(&self) -> String {
        "mock".to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub const SYSTEM_PROMPT: &str = "test system prompt";

pub fn relay_with(client: Arc<MockChatClient>) -> Arc<Relay> {
    Arc::new(Relay::new(client, SYSTEM_PROMPT, 20))
}

/// Serves `app` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_app(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr: SocketAddr = listener.local_addr().expect("local addr should resolve");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server should run");
    });
    format!("http://{}/", addr)
}

pub async fn spawn_relay(client: Arc<MockChatClient>) -> String {
    spawn_app(router(relay_with(client))).await
}
