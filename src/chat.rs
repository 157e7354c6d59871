//! Chat assistant helpers: fallback reply and starter questions.

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::models::LabPanel;

/// Reply shown when the chat collaborator cannot be reached.
pub const CHAT_FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting. Please try again later.";

/// Starter question for an empty conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSuggestion {
    pub text: String,
    pub category: String,
}

impl PromptSuggestion {
    fn new(text: impl Into<String>, category: &str) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

/// Default starter questions.
pub fn default_prompt_suggestions() -> Vec<PromptSuggestion> {
    vec![
        PromptSuggestion::new("What do my liver function tests measure?", "labs"),
        PromptSuggestion::new("How can I support my liver health?", "lifestyle"),
        PromptSuggestion::new("What questions should I ask my doctor?", "general"),
        PromptSuggestion::new("What does a CT scan of the liver show?", "imaging"),
    ]
}

/// Starter questions, made specific when the panel has abnormal values.
pub fn chat_suggestions(panel: Option<&LabPanel>) -> Vec<PromptSuggestion> {
    let mut suggestions = default_prompt_suggestions();

    let first_abnormal = panel.and_then(|p| p.abnormal().next());
    if let Some(observation) = first_abnormal {
        let name = catalog::blood_test(observation.test).name;
        suggestions[0] = PromptSuggestion::new(format!("Why might my {name} be out of range?"), "labs");
    }

    suggestions
}
