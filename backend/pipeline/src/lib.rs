//! The suggestion pipeline.
//!
//! `Received -> [Extracting] -> Prompting -> Generating -> Normalizing -> Done`,
//! terminal on the first failure. Extraction only runs for screenshots.

pub mod normalize;
pub mod orchestrator;
pub mod prompt;

pub use normalize::{normalize, SuggestionOutcome};
pub use orchestrator::{PipelineStage, SuggestionInput, SuggestionPipeline};
pub use prompt::{PromptBuilder, SYSTEM_PERSONA};
