use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WaveSpeedError};

/// Opaque bearer credential for the WaveSpeed API.
///
/// Constructed once and handed to [`WaveSpeedClient`](crate::WaveSpeedClient);
/// never mutated afterwards. The `Debug` impl redacts the token so it cannot
/// leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw bearer token.
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// A WaveSpeed response body, classified once per response.
///
/// The API is inconsistent about its envelope: some endpoints wrap the real
/// payload in `{code, message, data}`, others return the payload directly.
/// Detection is by presence of a top-level `code` field, per response rather
/// than per endpoint.
#[derive(Debug, Clone)]
pub enum ApiResponse {
    /// `{code, message, data}` wrapper.
    Enveloped {
        code: i64,
        message: String,
        data: Value,
    },
    /// Body without a `code` field, passed through unchanged.
    Raw(Value),
}

impl ApiResponse {
    /// Classify a parsed JSON body.
    pub fn classify(body: Value) -> Self {
        let code = match body.as_object().and_then(|o| o.get("code")) {
            Some(c) => match c.as_i64() {
                Some(n) => n,
                None => return ApiResponse::Raw(body),
            },
            None => return ApiResponse::Raw(body),
        };
        let message = body
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        let data = body
            .get("data")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        ApiResponse::Enveloped {
            code,
            message,
            data,
        }
    }

    /// Unwrap into the payload the caller actually wants.
    ///
    /// `code_401_is_auth` mirrors an inconsistency in the upstream client:
    /// POST responses map envelope code 401 to [`WaveSpeedError::Unauthorized`]
    /// while GET responses report it as a plain API error.
    pub fn into_data(self, code_401_is_auth: bool) -> Result<Value> {
        match self {
            ApiResponse::Enveloped { code: 401, .. } if code_401_is_auth => {
                Err(WaveSpeedError::Unauthorized)
            }
            ApiResponse::Enveloped { code, message, .. } if code != 200 => {
                Err(WaveSpeedError::Api(message))
            }
            ApiResponse::Enveloped { data, .. } => Ok(data),
            ApiResponse::Raw(body) => Ok(body),
        }
    }
}

/// Coarse lifecycle of a remote task as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Completed,
    Failed,
    /// Queued, processing, or any status string the client does not know.
    Pending,
}

/// Transient snapshot of a remote task's status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    /// Media URLs (or base64 payloads, for endpoints that produce them).
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskStatus {
    /// Map the provider's status vocabulary onto the three states the
    /// client distinguishes. Unknown strings are treated as still pending
    /// and re-polled.
    pub fn state(&self) -> TaskState {
        match self.status.as_str() {
            "completed" => TaskState::Completed,
            "failed" => TaskState::Failed,
            _ => TaskState::Pending,
        }
    }
}

/// Result of submitting a generation request.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// Submitted without waiting; the task is still processing remotely.
    Submitted { request_id: String },
    /// Terminal snapshot, either returned synchronously by the provider or
    /// reached by polling.
    Finished(TaskStatus),
}

impl SendOutcome {
    /// Output URLs of a finished task, if any.
    pub fn outputs(&self) -> &[String] {
        match self {
            SendOutcome::Finished(status) => &status.outputs,
            SendOutcome::Submitted { .. } => &[],
        }
    }
}

/// Media category accepted by the binary upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Image,
    Audio,
}

impl FileKind {
    /// Resolve a MIME type by substring match, before any I/O happens.
    pub fn from_mime(mime_type: &str) -> Result<Self> {
        if mime_type.contains("video") {
            Ok(FileKind::Video)
        } else if mime_type.contains("image") {
            Ok(FileKind::Image)
        } else if mime_type.contains("audio") {
            Ok(FileKind::Audio)
        } else {
            Err(WaveSpeedError::UnsupportedFileType(mime_type.to_string()))
        }
    }

    /// Canonical filename the upload endpoint expects for this kind.
    pub fn upload_name(self) -> &'static str {
        match self {
            FileKind::Video => "video.mp4",
            FileKind::Image => "image.png",
            FileKind::Audio => "audio.mp3",
        }
    }
}
