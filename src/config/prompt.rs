use std::fs;
use std::path::Path;
use log::info;
use thiserror::Error;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful, concise assistant. Answer clearly and use Markdown when it improves readability.";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read system prompt file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("System prompt file '{0}' is empty")]
    Empty(String),
}

/// Resolves the system instruction. A file wins over an inline value, and an
/// inline value wins over the built-in default.
pub fn resolve_system_prompt(
    inline: Option<&str>,
    path: Option<&str>
) -> Result<String, PromptError> {
    if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
        let prompt = load_system_prompt(path)?;
        info!("System prompt loaded from '{}' ({} chars)", path, prompt.len());
        return Ok(prompt);
    }

    match inline.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prompt) => Ok(prompt.to_string()),
        None => Ok(DEFAULT_SYSTEM_PROMPT.to_string()),
    }
}

pub fn load_system_prompt<P: AsRef<Path>>(path: P) -> Result<String, PromptError> {
    let display = path.as_ref().display().to_string();
    let content = fs::read_to_string(&path).map_err(|source| PromptError::Io {
        path: display.clone(),
        source,
    })?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(PromptError::Empty(display));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_prompt(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("chat-relay-{}-{}.txt", name, std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(resolve_system_prompt(None, None).unwrap(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(resolve_system_prompt(Some("   "), Some("")).unwrap(), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn inline_prompt_is_trimmed() {
        assert_eq!(resolve_system_prompt(Some("  be terse "), None).unwrap(), "be terse");
    }

    #[test]
    fn file_overrides_inline() {
        let path = temp_prompt("override", "\nfrom file\n");
        let prompt = resolve_system_prompt(Some("inline"), path.to_str()).unwrap();
        assert_eq!(prompt, "from file");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn empty_or_missing_file_is_an_error() {
        let path = temp_prompt("empty", "  \n");
        assert!(matches!(load_system_prompt(&path), Err(PromptError::Empty(_))));
        let _ = fs::remove_file(&path);

        assert!(matches!(
            load_system_prompt("/definitely/not/here.txt"),
            Err(PromptError::Io { .. })
        ));
    }
}
