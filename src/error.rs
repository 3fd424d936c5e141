use std::path::PathBuf;

/// Configuration errors are fatal and surfaced immediately at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("prompt template not found at {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input validation errors, rejected at the CLI boundary before the
/// deterministic core runs.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("invalid date format {input:?}, expected YYYY-MM-DD or DD/MM/YYYY")]
    InvalidDateFormat { input: String },
}

/// Narrative backend errors. Non-fatal: every failure is recovered through
/// the local fallback generator and only surfaced as informational context.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("backend request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("invalid response from backend: {reason}")]
    InvalidResponse { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
