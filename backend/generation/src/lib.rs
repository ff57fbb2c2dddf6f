pub mod client;
pub mod providers;

pub use client::GenerationClient;
pub use providers::mock::MockProvider;
pub use providers::openai::OpenAiProvider;
