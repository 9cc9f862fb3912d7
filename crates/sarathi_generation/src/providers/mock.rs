//! Mock LLM provider — deterministic responses for testing without API keys.

use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn complete(&self, _prompt: &str, _params: CompletionParams) -> Result<String> {
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        Ok(format!(
            "(Mock {} Response) I received your prompt.",
            self.model
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_complete() {
        let provider = MockProvider::new("test-model");
        let text = provider
            .complete("prompt", CompletionParams::default())
            .await
            .unwrap();
        assert!(text.contains("Mock"));
        assert!(text.contains("test-model"));
    }
}
