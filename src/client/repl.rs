use super::relay_client::RelayClient;
use super::session::ChatSession;
use crate::cli::ClientArgs;
use crate::models::chat::Role;
use std::error::Error;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };

pub const SUGGESTIONS: &[&str] = &[
    "Draft a product launch announcement",
    "Explain transformers to a beginner",
    "Generate integration test cases",
    "Summarize meeting notes",
    "Create a migration checklist",
];

const HELP: &str = "Commands: /reset, /stats, /history, /help, /quit. Enter a number to send a suggestion.";

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Send(&'a str),
    Suggestion(usize),
    Reset,
    Stats,
    History,
    Help,
    Quit,
    Unknown(&'a str),
    Empty,
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if let Ok(n) = line.parse::<usize>() {
            if (1..=SUGGESTIONS.len()).contains(&n) {
                return Command::Suggestion(n - 1);
            }
        }
        match line {
            "/reset" => Command::Reset,
            "/stats" => Command::Stats,
            "/history" => Command::History,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            other if other.starts_with('/') => Command::Unknown(other),
            text => Command::Send(text),
        }
    }
}

pub async fn run(args: ClientArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut session = ChatSession::new(RelayClient::new(args.relay_url));
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(format!("{}\n{}\n", session.state().status(), HELP).as_bytes()).await?;
    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        stdout.write_all(format!("  {:02}  {}\n", i + 1, suggestion).as_bytes()).await?;
    }

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let output = match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => HELP.to_string(),
            Command::Unknown(cmd) => format!("Unknown command '{}'. {}", cmd, HELP),
            Command::Reset => {
                session.reset_conversation();
                session.state().status().to_string()
            }
            Command::Stats => {
                let stats = session.state().stats();
                format!(
                    "Messages: {} | User prompts: {} | Assistant replies: {}",
                    stats.total,
                    stats.user_prompts,
                    stats.assistant_replies
                )
            }
            Command::History => {
                let prompts = session.state().recent_prompts(10);
                if prompts.is_empty() {
                    "No history yet".to_string()
                } else {
                    prompts.iter().map(|p| format!("  - {}", p)).collect::<Vec<_>>().join("\n")
                }
            }
            Command::Suggestion(i) => exchange(&mut session, SUGGESTIONS[i]).await,
            Command::Send(text) => exchange(&mut session, text).await,
        };

        stdout.write_all(format!("{}\n", output).as_bytes()).await?;
    }

    Ok(())
}

async fn exchange(session: &mut ChatSession, text: &str) -> String {
    let before = session.messages().len();
    session.send_message(text).await;

    if let Some(error) = session.error() {
        return format!("error: {}", error);
    }
    match session.messages().get(before + 1) {
        Some(reply) if reply.role == Role::Assistant => reply.content.clone(),
        _ => String::new(),
    }
}
