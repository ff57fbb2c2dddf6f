pub mod error;
pub mod traits;
pub mod types;

pub use error::{ExtractionError, GenerationError, SuggestError, ValidationError};
pub use traits::{LlmProvider, OcrBackend};
pub use types::{
    ChatMessage, ConversationPrompt, GenerationParams, InputSource, LanguageHints, LlmRequest,
    LlmResponse, Role, SuggestionResponse, UploadedImage,
};
