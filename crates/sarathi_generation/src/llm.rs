use anyhow::Result;
use async_trait::async_trait;

/// Parameters for a single completion request.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    /// Maximum tokens to generate (clamped to provider limits).
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// The black-box generative text backend: prompt in, completion out.
///
/// Errors propagate to the caller — providers do not self-heal. Fallback
/// generation is a deliberate, separate operation on the caller's side.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String>;
}
