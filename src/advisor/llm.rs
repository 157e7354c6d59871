use super::parser::{parse_insights_response, parse_text_response};
use super::prompt::{
    build_chat_prompt, build_explanation_prompt, build_insights_prompt, CHAT_SYSTEM_PROMPT,
    EXPLANATION_SYSTEM_PROMPT, INSIGHTS_SYSTEM_PROMPT,
};
use super::types::{ChatReply, ChatRequest, Explanation, ExplanationRequest, InsightRequest};
use super::{AdvisorError, HealthAdvisor};
use super::ollama::LlmClient;
use crate::models::HealthInsights;

/// `HealthAdvisor` backed by a text-generation model.
pub struct LlmAdvisor<C: LlmClient> {
    client: C,
    model: String,
}

impl<C: LlmClient> LlmAdvisor<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn generate(&self, task: &'static str, prompt: &str, system: &str) -> Result<String, AdvisorError> {
        tracing::debug!(task, model = %self.model, prompt_len = prompt.len(), "advisor request");
        let started = std::time::Instant::now();
        let result = self.client.generate(&self.model, prompt, system);
        match &result {
            Ok(text) => tracing::debug!(
                task,
                elapsed_ms = started.elapsed().as_millis() as u64,
                response_len = text.len(),
                "advisor response"
            ),
            Err(e) => tracing::warn!(task, error = %e, "advisor request failed"),
        }
        result
    }
}

impl<C: LlmClient> HealthAdvisor for LlmAdvisor<C> {
    fn provide_insights(&self, request: &InsightRequest) -> Result<HealthInsights, AdvisorError> {
        let prompt = build_insights_prompt(&request.scan_summary, &request.abnormal_tests);
        let response = self.generate("insights", &prompt, INSIGHTS_SYSTEM_PROMPT)?;
        parse_insights_response(&response)
    }

    fn chat(&self, request: &ChatRequest) -> Result<ChatReply, AdvisorError> {
        let prompt = build_chat_prompt(request.panel.as_ref(), &request.question);
        let response = self.generate("chat", &prompt, CHAT_SYSTEM_PROMPT)?;
        Ok(ChatReply {
            reply: parse_text_response(&response)?,
        })
    }

    fn explain(&self, request: &ExplanationRequest) -> Result<Explanation, AdvisorError> {
        let prompt = build_explanation_prompt(&request.abnormal_values);
        let response = self.generate("explanation", &prompt, EXPLANATION_SYSTEM_PROMPT)?;
        Ok(Explanation {
            explanation: parse_text_response(&response)?,
        })
    }
}
