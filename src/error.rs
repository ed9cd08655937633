use thiserror::Error;

pub type ClimboxResult<T> = Result<T, ClimboxError>;

#[derive(Debug, Error)]
pub enum ClimboxError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("fetch `{url}` failed with status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("fetch `{url}` failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("GViz returned HTML (sheet likely not public or blocked)")]
    GvizHtml,

    #[error("unexpected GViz response: {0}")]
    GvizEnvelope(String),

    #[error("invalid telemetry payload: {0}")]
    Payload(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("location `{0}` has no sheet id")]
    MissingSheetId(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Profile(#[from] crate::profile::ProfileError),
}
