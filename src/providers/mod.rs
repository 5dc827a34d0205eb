pub mod openai;
pub mod traits;


pub use openai::OpenAiCompatProvider;
pub use traits::Provider;

use crate::error::LlmError;

const ERROR_BODY_LIMIT: usize = 500;

/// Turn a non-success HTTP response into a typed provider error, keeping a
/// truncated body for the logs.
pub(crate) async fn api_error(provider: &str, response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let mut body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
    if body.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    LlmError::Api {
        provider: provider.to_string(),
        status,
        body,
    }
}
