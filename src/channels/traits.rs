use async_trait::async_trait;

/// A message received from a chat platform.
///
/// `sender` identifies the user (e.g. Telegram username or numeric user ID);
/// `chat_id` identifies the conversation the reply should go to.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: String,
    pub chat_id: String,
    pub sender: String,
    pub content: String,
    pub channel: String,
    pub timestamp: u64,
}

/// A file artifact to deliver through a channel.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

/// Core channel trait — implement for any messaging platform
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Send a message through this channel
    async fn send(&self, message: &str, chat_id: &str) -> anyhow::Result<()>;

    /// Send a message and return the platform message ID, when the platform
    /// reports one. Needed for later edits of status messages.
    async fn send_returning_id(
        &self,
        message: &str,
        chat_id: &str,
    ) -> anyhow::Result<Option<String>> {
        self.send(message, chat_id).await?;
        Ok(None)
    }

    async fn edit_message(
        &self,
        _chat_id: &str,
        _message_id: &str,
        _content: &str,
    ) -> anyhow::Result<()> {
        anyhow::bail!("message editing not supported by this channel")
    }

    async fn delete_message(&self, _chat_id: &str, _message_id: &str) -> anyhow::Result<()> {
        anyhow::bail!("message deletion not supported by this channel")
    }

    /// Deliver a file to the conversation.
    async fn send_document(&self, _doc: &DocumentPayload, _chat_id: &str) -> anyhow::Result<()> {
        anyhow::bail!("document sending not supported by this channel")
    }

    /// Start listening for incoming messages (long-running)
    async fn listen(&self, tx: tokio::sync::mpsc::Sender<ChannelMessage>) -> anyhow::Result<()>;

    /// Check if channel is healthy
    async fn health_check(&self) -> bool {
        true
    }

    fn max_message_length(&self) -> usize {
        usize::MAX
    }
}
