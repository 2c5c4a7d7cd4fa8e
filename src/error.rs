use thiserror::Error;

/// Caller contract violations in the analysis core.
///
/// Recoverable conditions (malformed collaborator payloads, regex
/// construction failures, empty result sets) are handled locally and never
/// reach this type.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Failures talking to the assistant collaborator.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("assistant returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("assistant completion had no content")]
    EmptyCompletion,
}
