use thiserror::Error;

/// Errors that can occur when talking to the generative text API
#[derive(Error, Debug)]
pub enum LlmClientError {
    #[error("API key for Gemini is not configured")]
    MissingApiKey,

    #[error("Request to generative text API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generative text API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Generative text API returned no text")]
    EmptyResponse,

    #[error("Failed to decode generative text API response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LlmClientError>;
