pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod relay;
pub mod client;

use cli::Args;
use log::info;
use relay::Relay;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Relay Configuration ---");
    info!("Server Address: {}", args.server_addr());
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Chat API Key: {}", if args.chat_api_key.is_empty() { "not set" } else { "set" });
    info!("Max History Turns: {}", args.max_history_turns);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("---------------------------");

    let relay = Arc::new(Relay::from_args(&args)?);
    info!("System Prompt: {} chars", relay.system_prompt().len());
    let addr = args.server_addr();
    info!("Starting relay on: {}", addr);
    let server = Server::new(addr, relay, args.clone());
    server.run().await?;

    Ok(())
}
