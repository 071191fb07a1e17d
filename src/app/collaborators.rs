//! Outside collaborators the app drives: confirmation prompts and export sinks

use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Synchronous yes/no prompt
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Asks on stdin, accepting `y` or `yes`
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

/// An answer a view already collected, such as the TUI's y/n dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogAnswer(pub bool);

impl Confirm for DialogAnswer {
    fn confirm(&self, prompt: &str) -> bool {
        debug!("{} answered {}", prompt, if self.0 { "yes" } else { "no" });
        self.0
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Receives exported transcripts
pub trait ExportSink: Send + Sync {
    /// Save `payload` under `filename`, returning where it ended up
    fn save(&self, filename: &str, payload: &[u8]) -> Result<PathBuf>;
}

/// Writes exports into a directory
#[derive(Debug, Clone)]
pub struct DirectoryExport {
    dir: PathBuf,
}

impl DirectoryExport {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ExportSink for DirectoryExport {
    fn save(&self, filename: &str, payload: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create export directory {}", self.dir.display()))?;

        let path = self.dir.join(filename);
        fs::write(&path, payload)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Exported conversation to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_closure_confirm() {
        let yes = |_: &str| true;
        let no = |_: &str| false;
        assert!(yes.confirm("Clear?"));
        assert!(!no.confirm("Clear?"));
    }

    #[test]
    fn test_dialog_answer_is_replayed() {
        assert!(DialogAnswer(true).confirm("Clear?"));
        assert!(!DialogAnswer(false).confirm("Clear?"));
    }

    #[test]
    fn test_yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }

    #[test]
    fn test_directory_export_writes_file() {
        let dir = tempdir().unwrap();
        let sink = DirectoryExport::new(dir.path().join("exports"));

        let path = sink.save("chat.txt", b"payload").unwrap();
        assert_eq!(path, dir.path().join("exports").join("chat.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "payload");
    }
}
