pub mod orchestrator;
pub mod stage;

pub use orchestrator::{ChatOutcome, ChatPipeline, ChatRequest};
pub use stage::{PipelineReport, Stage, StageStatus};
