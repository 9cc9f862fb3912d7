pub mod llm;
pub mod prompts;
pub mod providers;
pub mod reflection;
pub mod retry;

pub use llm::{CompletionParams, LlmClient};
pub use providers::gemini::GeminiClient;
pub use providers::mock::MockProvider;
pub use reflection::ReflectionGenerator;
