use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Relay chat messages to an LLM provider", long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Interface the relay listens on.
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the relay listens on.
    #[arg(long, env = "RELAY_PORT", default_value = "3000")]
    pub port: u16,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., https://api.openai.com, http://localhost:11434)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. Required for OpenAI.
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gpt-3.5-turbo, gpt-4o, llama3)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Sampling temperature forwarded to the provider.
    #[arg(long, env = "CHAT_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Upper bound on generated tokens per reply.
    #[arg(long, env = "CHAT_MAX_TOKENS")]
    pub max_tokens: Option<u32>,

    // --- Prompt Args ---
    /// System instruction prepended to every conversation.
    #[arg(long, env = "SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// File holding the system instruction. Takes precedence over --system-prompt.
    #[arg(long, env = "SYSTEM_PROMPT_PATH")]
    pub system_prompt_path: Option<String>,

    /// Most recent history turns forwarded to the provider. 0 forwards all of them.
    #[arg(long, env = "MAX_HISTORY_TURNS", default_value = "20")]
    pub max_history_turns: usize,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal chat client for the relay", long_about = None)]
pub struct ClientArgs {
    /// Relay endpoint the client posts to (e.g., http://localhost:3000/)
    #[arg(long, env = "RELAY_URL")]
    pub relay_url: Option<String>,
}
