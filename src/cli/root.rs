use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Duration};
use tracing::{debug, info};

use super::{AskCommand, ClearCommand, ExportCommand, ListCommand, ShowCommand};
use crate::{app::ChatApp, config::Config, tui};

/// Zed AI - a small chat assistant for your terminal
#[derive(Parser)]
#[command(
    name = "zed-ai",
    version,
    about = "A small chat assistant for your terminal",
    long_about = r#"Zed AI keeps a history of conversations with a canned assistant.

Examples:
  zed-ai                         # Start interactive mode
  zed-ai ask "tell me about AI"  # Ask one question
  zed-ai list                    # List saved conversations
  zed-ai export --out ~/notes    # Export the latest conversation"#
)]
pub struct Cli {
    /// Directory conversations are stored in
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Keep conversations in memory only
    #[arg(long = "ephemeral", global = true)]
    pub ephemeral: bool,

    /// Seed reply selection for reproducible answers
    #[arg(long = "seed", global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message and print the reply
    Ask(AskCommand),
    /// List saved conversations
    List(ListCommand),
    /// Print a conversation
    Show(ShowCommand),
    /// Export a conversation transcript
    Export(ExportCommand),
    /// Clear the active conversation
    Clear(ClearCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut config = Config::init().await?;
        self.apply_overrides(&mut config);

        let log_file = match self.command {
            None => Some(config.data_dir.join("zed-ai.log")),
            Some(_) => None,
        };
        crate::init_logging(self.debug, log_file)?;
        debug!("Configuration initialized: {:?}", config);

        match self.command {
            Some(Commands::Ask(cmd)) => cmd.execute(&config, self.ephemeral).await,
            Some(Commands::List(cmd)) => cmd.execute(&config, self.ephemeral),
            Some(Commands::Show(cmd)) => cmd.execute(&config, self.ephemeral),
            Some(Commands::Export(cmd)) => cmd.execute(config, self.ephemeral),
            Some(Commands::Clear(cmd)) => cmd.execute(&config, self.ephemeral),
            None => start_interactive_mode(&config, self.ephemeral).await,
        }
    }

    /// Command-line flags are the last configuration layer
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

async fn start_interactive_mode(config: &Config, ephemeral: bool) -> Result<()> {
    info!("Starting interactive mode");

    let (app, events) = ChatApp::from_config(config, ephemeral)?;
    tui::run(app, events, Duration::from_millis(config.tick_rate_ms)).await?;

    info!("Application finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["zed-ai", "list", "--seed", "7", "--ephemeral"]).unwrap();
        assert_eq!(cli.seed, Some(7));
        assert!(cli.ephemeral);
        assert!(matches!(cli.command, Some(Commands::List(_))));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from(["zed-ai", "--data-dir", "/tmp/zed", "--seed", "3"]).unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/zed"));
        assert_eq!(config.seed, Some(3));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_missing_seed_keeps_config_value() {
        let cli = Cli::try_parse_from(["zed-ai", "list"]).unwrap();
        let mut config = Config {
            seed: Some(11),
            ..Config::default()
        };
        cli.apply_overrides(&mut config);
        assert_eq!(config.seed, Some(11));
    }
}
