//! External language-model collaborators: combined insights, chat about
//! the blood panel, and plain-language explanations of abnormal values.

pub mod llm;
pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod types;

pub use llm::*;
pub use ollama::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

use crate::models::HealthInsights;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("Model {0} is not available")]
    ModelUnavailable(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Advisor task failed: {0}")]
    TaskFailed(String),
}

/// The three collaborator calls the dashboard makes.
///
/// Implementations block; the dashboard runs them on the blocking pool.
pub trait HealthAdvisor: Send + Sync {
    fn provide_insights(&self, request: &InsightRequest) -> Result<HealthInsights, AdvisorError>;

    fn chat(&self, request: &ChatRequest) -> Result<ChatReply, AdvisorError>;

    fn explain(&self, request: &ExplanationRequest) -> Result<Explanation, AdvisorError>;
}
