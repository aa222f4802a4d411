use crate::domain::model::OutgoingEmail;
use crate::domain::ports::MailTransport;
use crate::utils::error::{GiftEmailError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Logs the email instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            html = email.html_body.is_some(),
            plain = email.text_body.is_some(),
            "Email not delivered (log transport)"
        );
        Ok(())
    }
}

/// Writes every email as a JSON file into a directory.
#[derive(Debug)]
pub struct OutboxMailTransport {
    base_path: PathBuf,
    sequence: AtomicU64,
}

impl OutboxMailTransport {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_name(&self, email: &OutgoingEmail) -> String {
        let recipient: String = email
            .to
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!(
            "{}-{}-{}.json",
            recipient,
            chrono::Utc::now().timestamp_millis(),
            self.sequence.fetch_add(1, Ordering::Relaxed)
        )
    }
}

#[async_trait]
impl MailTransport for OutboxMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| outbox_error(&self.base_path, e))?;

        let path = self.base_path.join(self.file_name(email));
        let data = serde_json::to_vec_pretty(email)?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| outbox_error(&path, e))?;

        tracing::debug!("Email to {} written to {}", email.to, path.display());
        Ok(())
    }
}

fn outbox_error(path: &Path, error: std::io::Error) -> GiftEmailError {
    GiftEmailError::TransportError {
        message: format!("cannot write outbox {}: {}", path.display(), error),
    }
}
