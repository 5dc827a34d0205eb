use crate::channels::Channel;
use std::sync::Arc;
use tracing::debug;

/// Status message edited in place as generation moves through its phases.
///
/// Best-effort on purpose: a failed edit (deleted message, flood limit) must
/// never fail the generation it narrates, so every fallible call downgrades
/// to a debug log.
pub struct Progress {
    channel: Arc<dyn Channel>,
    chat_id: String,
    message_id: Option<String>,
}

impl Progress {
    pub async fn begin(channel: Arc<dyn Channel>, chat_id: &str, text: &str) -> Self {
        let message_id = match channel.send_returning_id(text, chat_id).await {
            Ok(id) => id,
            Err(e) => {
                debug!(chat_id, error = %e, "failed to post progress message");
                None
            }
        };
        Self {
            channel,
            chat_id: chat_id.to_string(),
            message_id,
        }
    }

    /// Rewrite the status line. Falls back to a fresh message on platforms
    /// without edit support.
    pub async fn update(&self, text: &str) {
        let result = match &self.message_id {
            Some(id) => self.channel.edit_message(&self.chat_id, id, text).await,
            None => self.channel.send(text, &self.chat_id).await,
        };
        if let Err(e) = result {
            debug!(chat_id = %self.chat_id, error = %e, "failed to update progress message");
        }
    }

    /// Remove the status line once the real result has been delivered.
    pub async fn clear(self) {
        if let Some(id) = &self.message_id {
            if let Err(e) = self.channel.delete_message(&self.chat_id, id).await {
                debug!(chat_id = %self.chat_id, error = %e, "failed to clear progress message");
            }
        }
    }
}
