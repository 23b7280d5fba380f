pub mod relay_client;
pub mod repl;
pub mod session;

pub use relay_client::{ ClientError, RelayClient };
pub use session::{ ChatSession, ConversationState, ConversationStats, ConversationStatus, PendingSend };
