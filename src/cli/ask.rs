use anyhow::{anyhow, Result};
use clap::Args;
use std::io::{self, Read};
use tracing::{debug, info};

use crate::app::ChatApp;
use crate::config::Config;

/// Send one message and print the reply
#[derive(Args)]
pub struct AskCommand {
    /// The message. If not provided, will read from stdin
    pub prompt: Vec<String>,

    /// Start a new conversation instead of continuing the latest one
    #[arg(short = 'n', long = "new")]
    pub new: bool,

    /// Don't print the thinking notice
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &Config, ephemeral: bool) -> Result<()> {
        debug!("Executing ask command");

        let prompt = self.get_prompt()?;
        if prompt.trim().is_empty() {
            return Err(anyhow!("No message provided. Use arguments or pipe input via stdin."));
        }

        info!("Asking: {}", prompt.chars().take(50).collect::<String>());

        let (mut app, _events) = ChatApp::from_config(config, ephemeral)?;
        if self.new {
            app.new_conversation();
        }

        if !self.quiet {
            eprintln!("Zed AI is thinking...");
        }

        match app.send_message(&prompt).await? {
            Some(reply) => {
                println!("{}", reply);
                Ok(())
            }
            None => Err(anyhow!("The message was not sent")),
        }
    }

    fn get_prompt(&self) -> Result<String> {
        if !self.prompt.is_empty() {
            Ok(self.prompt.join(" "))
        } else {
            debug!("Reading prompt from stdin");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
            Ok(buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FileStorage, Storage};
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            data_dir: dir.to_path_buf(),
            export_dir: dir.to_path_buf(),
            think_base_ms: 0,
            think_jitter_ms: 0,
            seed: Some(1),
            ..Config::default()
        }
    }

    #[test]
    fn test_prompt_joins_arguments() {
        let cmd = AskCommand {
            prompt: vec!["hello".to_string(), "there".to_string()],
            new: false,
            quiet: true,
        };
        assert_eq!(cmd.get_prompt().unwrap(), "hello there");
    }

    #[tokio::test]
    async fn test_ask_persists_exchange() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let cmd = AskCommand {
            prompt: vec!["hello".to_string()],
            new: false,
            quiet: true,
        };

        cmd.execute(&config, false).await.unwrap();

        let stored = FileStorage::new(dir.path())
            .get(&config.storage_key)
            .unwrap()
            .unwrap();
        assert!(stored.contains("\"title\":\"hello\""));
    }

    #[tokio::test]
    async fn test_ask_new_starts_another_conversation() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let ask = |new| AskCommand {
            prompt: vec!["hello".to_string()],
            new,
            quiet: true,
        };

        ask(false).execute(&config, false).await.unwrap();
        ask(false).execute(&config, false).await.unwrap();
        ask(true).execute(&config, false).await.unwrap();

        let (app, _events) = ChatApp::from_config(&config, false).unwrap();
        let conversations = app.store().conversations();
        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].messages.len(), 2);
        assert_eq!(conversations[1].messages.len(), 4);
    }
}
