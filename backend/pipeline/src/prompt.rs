//! Prompt builder for reply suggestions.
//!
//! One persona for every request; the user instruction frame depends only
//! on where the conversation text came from.

use charmline_core::{ConversationPrompt, InputSource};

/// Fixed system persona constraining tone, length, and register.
pub const SYSTEM_PERSONA: &str = "\
너는 상황에 맞춰 상대방에게 보낼 메시지를 재미있고 매력적으로 만들어주는 어시스턴트야.
너는 플러팅 앱을 위한 대화 보조 인공지능이야.
사용자(화자)는 썸을 타는 상대 또는 좋아하는 상대와 대화를 하고 있으며,
너는 다음의 규칙을 따라야 해:

1. 항상 상대가 호감을 느낄 만한, 긍정적이고 부드러운 어투로 답변할 것.
2. 가능하다면 간단한 이모티콘(예: '😊', '😆')이나 약간의 자연스러운 감탄사(예: '아하', '아 그래??') 등을 사용해서 답변에 생동감을 줄 것.
3. 답변은 너무 길지 않게, 1~3문장 정도로 간결하게 작성할 것.
4. 상대방이 어떤 성격인지나, 대화 상황이 어떤지에 따라 톤을 조금씩 맞춤화할 것.
5. 반말 혹은 존댓말 여부는 사용자의 프롬프트에 맞춰, 자연스럽게 유지할 것.";

pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt for `source_text`. Pure: equal inputs give equal prompts.
    ///
    /// Empty text is accepted; the model then produces a generic opener.
    pub fn build(source: InputSource, source_text: &str) -> ConversationPrompt {
        ConversationPrompt::new(SYSTEM_PERSONA, Self::frame(source, source_text))
    }

    fn frame(source: InputSource, text: &str) -> String {
        match source {
            InputSource::Screenshot => format!(
                "다음 대화 내용을 바탕으로, 상대방에게 보낼 짧고 매력적인 메시지를 1~2줄 정도로 만들어줘:\n\n{text}\n\n"
            ),
            InputSource::DirectText => {
                format!("대화 상황:\n{text}\n\n상대방에게 보낼 매력적인 한 마디를 만들어줘:")
            }
        }
    }
}
