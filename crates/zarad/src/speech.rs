//! Speech-to-text seam.
//!
//! The microphone executor captures audio; turning it into text is an
//! external concern behind this trait so tests can inject a fake and the
//! transcriber binary stays configurable.

use std::path::Path;

use tokio::process::Command;
use tracing::info;

use zara_common::ZaraError;

#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a WAV file into text.
    async fn transcribe(&self, wav: &Path) -> Result<String, ZaraError>;
}

/// Shells out to an external speech-to-text tool (whisper-cli style) that
/// prints the transcript on stdout.
pub struct CommandTranscriber {
    command: String,
}

impl CommandTranscriber {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for CommandTranscriber {
    async fn transcribe(&self, wav: &Path) -> Result<String, ZaraError> {
        info!("Transcribing {} via {}", wav.display(), self.command);

        let output = Command::new(&self.command)
            .arg(wav)
            .output()
            .await
            .map_err(|e| {
                ZaraError::ExecutionFailed(format!("transcriber '{}': {}", self.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ZaraError::ExecutionFailed(format!(
                "transcriber exited with {}: {}",
                output.status, stderr
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(ZaraError::ExecutionFailed(
                "transcriber produced no text".to_string(),
            ));
        }
        Ok(text)
    }
}
