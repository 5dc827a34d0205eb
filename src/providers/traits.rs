use crate::error::LlmError;
use async_trait::async_trait;

/// Text-generation provider seam. One completion per call, no retries, no
/// streaming — callers decide what an upstream failure means.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Request a single completion.
    async fn complete(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String, LlmError>;

    /// Warm up the HTTP connection pool (TLS handshake, DNS, HTTP/2 setup).
    /// Default implementation is a no-op; providers with HTTP clients should
    /// override.
    async fn warmup(&self) -> Result<(), LlmError> {
        Ok(())
    }
}
