use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::ChatSender;

/// Combined scan + panel guidance returned by the insight collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInsights {
    pub potential_issues: String,
    pub lifestyle_advice: String,
    pub specialist_guidance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::User,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: ChatSender::Bot,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

/// User-facing notice (rendered as a toast by the presentation layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn ai_error(description: &str) -> Self {
        Self {
            title: "AI Error".into(),
            description: description.into(),
        }
    }
}
