//! Outgoing mail. Delivery itself is somebody else's job: messages are either
//! written to an outbox directory for a relay to pick up, or only logged.

use async_trait::async_trait;
use lettre::{FileTransport, Message, Transport};
use std::path::PathBuf;
use tracing::info;

use crate::error::{AppError, AppResult};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> AppResult<()>;
}

/// Writes each message as an `.eml` file into `dir`.
pub struct FileMailer {
    dir: PathBuf,
}

impl FileMailer {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl Mailer for FileMailer {
    async fn send(&self, message: Message) -> AppResult<()> {
        let transport = FileTransport::new(&self.dir);
        let id = tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AppError::Internal(format!("mail task failed: {e}")))?
            .map_err(|e| AppError::Mail(e.to_string()))?;
        info!(message_id = %id, "message written to outbox");
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: Message) -> AppResult<()> {
        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();
        info!(?recipients, "mail delivery disabled, message dropped");
        Ok(())
    }
}
