use thiserror::Error;

pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Gemini API key is not configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("request to Gemini failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Gemini blocked the prompt: {reason}")]
    Blocked { reason: String },

    #[error("Gemini returned no text")]
    EmptyResponse,

    #[error("failed to decode Gemini response: {0}")]
    Decode(#[from] serde_json::Error),
}
