use thiserror::Error;

/// Errors returned by WaveSpeed API operations.
#[derive(Error, Debug)]
pub enum WaveSpeedError {
    /// The API key was rejected (HTTP 401 or envelope code 401).
    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    /// WaveSpeed returned a non-success HTTP status.
    #[error("WaveSpeed returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The transport succeeded but the response envelope carried a
    /// non-success provider code.
    #[error("API error: {0}")]
    Api(String),

    /// An empty or missing task identifier was supplied.
    #[error("No valid task ID provided")]
    InvalidTask,

    /// A submission response did not carry a task identifier.
    #[error("No request ID in response")]
    MissingTaskId,

    /// The remote task reached the `failed` state.
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// The wall-clock deadline elapsed while polling for completion.
    #[error("Task timed out")]
    TaskTimedOut,

    /// All upload attempts failed, or the upload response was missing
    /// its download URL.
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The MIME type given to the upload helper is not supported.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// A request parameter failed validation before transmission.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file I/O error while preparing an upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, WaveSpeedError>;
