use super::relay_client::{ ClientError, RelayClient };
use crate::models::chat::{ ChatMessage, Role };
use crate::models::relay::RelayRequest;
use log::{ debug, warn };
use std::fmt;

/// A send that has been dispatched but not settled yet.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub request: RelayRequest,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationStats {
    pub total: usize,
    pub user_prompts: usize,
    pub assistant_replies: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStatus {
    Composing,
    Empty,
    Ready,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::Composing => write!(f, "Assistant is composing a response."),
            ConversationStatus::Empty => write!(f, "Start a new conversation to begin collaborating."),
            ConversationStatus::Ready => write!(f, "Ready for your next prompt."),
        }
    }
}

/// In-memory conversation plus loading/error flags. Every method is a plain
/// state transition; network I/O lives in [`ChatSession`].
///
/// At most one send is in flight. `reset` abandons a pending send rather
/// than aborting it: its outcome is dropped when it settles.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    is_loading: bool,
    error: Option<String>,
    generation: u64,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Appends the user turn and marks the conversation as loading. Returns
    /// `None` for blank input or while another send is in flight.
    pub fn begin_send(&mut self, content: &str) -> Option<PendingSend> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        if self.is_loading {
            debug!("Send rejected: a reply is still pending");
            return None;
        }

        let history = self.messages.iter().map(ChatMessage::to_turn).collect();
        self.messages.push(ChatMessage::user(content));
        self.is_loading = true;
        self.error = None;

        Some(PendingSend {
            request: RelayRequest {
                message: content.to_string(),
                history,
            },
            generation: self.generation,
        })
    }

    /// Applies the outcome of a pending send. Returns `false` when the send
    /// was abandoned by a reset and the outcome was discarded.
    pub fn settle(&mut self, pending: PendingSend, outcome: Result<String, ClientError>) -> bool {
        if pending.generation != self.generation {
            debug!("Discarding reply for a conversation that was reset");
            return false;
        }

        self.is_loading = false;
        match outcome.and_then(|reply| {
            let reply = reply.trim();
            if reply.is_empty() { Err(ClientError::EmptyReply) } else { Ok(reply.to_string()) }
        }) {
            Ok(reply) => self.messages.push(ChatMessage::assistant(reply)),
            Err(e) => {
                warn!("Send failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Records an error that happened before anything was dispatched.
    pub fn fail(&mut self, error: &ClientError) {
        self.error = Some(error.to_string());
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.error = None;
        if self.is_loading {
            self.is_loading = false;
            self.generation += 1;
        }
    }

    pub fn stats(&self) -> ConversationStats {
        let user_prompts = self.messages.iter().filter(|m| m.role == Role::User).count();
        ConversationStats {
            total: self.messages.len(),
            user_prompts,
            assistant_replies: self.messages.len() - user_prompts,
        }
    }

    pub fn latest_reply(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Distinct user prompts, most recent first.
    pub fn recent_prompts(&self, limit: usize) -> Vec<&str> {
        let mut prompts: Vec<&str> = Vec::new();
        for message in self.messages.iter().rev().filter(|m| m.role == Role::User) {
            if prompts.len() == limit {
                break;
            }
            if !prompts.contains(&message.content.as_str()) {
                prompts.push(&message.content);
            }
        }
        prompts
    }

    pub fn status(&self) -> ConversationStatus {
        if self.is_loading {
            ConversationStatus::Composing
        } else if self.messages.is_empty() {
            ConversationStatus::Empty
        } else {
            ConversationStatus::Ready
        }
    }
}

/// Conversation state bound to a relay endpoint.
#[derive(Debug, Clone)]
pub struct ChatSession {
    state: ConversationState,
    relay: RelayClient,
}

impl ChatSession {
    pub fn new(relay: RelayClient) -> Self {
        Self { state: ConversationState::new(), relay }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.state.messages()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub async fn send_message(&mut self, content: &str) {
        if content.trim().is_empty() || self.state.is_loading() {
            return;
        }

        let endpoint = match self.relay.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!("Relay endpoint not usable: {}", e);
                self.state.fail(&e);
                return;
            }
        };

        let Some(pending) = self.state.begin_send(content) else {
            return;
        };
        let outcome = self.relay.send(&endpoint, &pending.request).await;
        self.state.settle(pending, outcome);
    }

    pub fn reset_conversation(&mut self) {
        self.state.reset();
    }
}
