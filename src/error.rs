use thiserror::Error;

use crate::types::RecordId;

#[derive(Error, Debug)]
pub enum DeskError {
    // Client-side validation, never dispatched to the server
    #[error("{0}")]
    Validation(String),

    #[error("invalid {kind} '{value}'")]
    InvalidValue { kind: &'static str, value: String },

    // Remote errors
    #[error("{message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    #[error("{operation} failed: {message}")]
    PartialFailure {
        operation: &'static str,
        message: String,
    },

    #[error("record {0} already has a change in flight")]
    Busy(RecordId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl DeskError {
    /// Build a request error carrying the server's message.
    pub fn request(status: Option<u16>, message: impl Into<String>) -> Self {
        DeskError::Request {
            status,
            message: message.into(),
        }
    }

    /// True for errors detected locally before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DeskError::Validation(_) | DeskError::InvalidValue { .. }
        )
    }

    /// The human-readable part of the error, without any variant prefix.
    pub fn user_message(&self) -> String {
        match self {
            DeskError::Request { message, .. } => message.clone(),
            DeskError::PartialFailure { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for DeskError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Could not connect to the server".to_string()
        } else {
            err.to_string()
        };
        DeskError::Request { status, message }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
