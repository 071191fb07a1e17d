use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use super::history::find;
use crate::{app::ChatApp, config::Config};

/// Export a conversation transcript to a text file
#[derive(Args)]
pub struct ExportCommand {
    /// Conversation id; defaults to the most recent one
    #[arg(long = "id")]
    pub id: Option<String>,

    /// Directory to write the transcript into
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,
}

impl ExportCommand {
    pub fn execute(&self, mut config: Config, ephemeral: bool) -> Result<()> {
        if let Some(out) = &self.out {
            config.export_dir = out.clone();
        }
        debug!("Exporting into {}", config.export_dir.display());

        let (mut app, _events) = ChatApp::from_config(&config, ephemeral)?;
        let id = find(&app, self.id.as_deref())?.id.clone();
        app.select(&id);

        let path = app.export()?;
        println!("Exported to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StoreError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_export_by_id_into_out_dir() {
        let data = tempdir().unwrap();
        let out = tempdir().unwrap();
        let config = Config {
            data_dir: data.path().to_path_buf(),
            export_dir: data.path().to_path_buf(),
            think_base_ms: 0,
            think_jitter_ms: 0,
            ..Config::default()
        };

        let older = {
            let (mut app, _events) = ChatApp::from_config(&config, false).unwrap();
            app.send_message("hello").await.unwrap();
            let older = app.store().active_id().unwrap().to_string();
            app.new_conversation();
            older
        };

        let cmd = ExportCommand {
            id: Some(older.clone()),
            out: Some(out.path().to_path_buf()),
        };
        cmd.execute(config, false).unwrap();

        let exported = out.path().join(format!("zed-ai-chat-{}.txt", older));
        let text = std::fs::read_to_string(exported).unwrap();
        assert!(text.contains("Title: hello"));
    }

    #[test]
    fn test_export_empty_conversation_fails() {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            export_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let err = ExportCommand { id: None, out: None }
            .execute(config, true)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::EmptyConversation)
        ));
    }
}
