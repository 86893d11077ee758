use std::future::Future;
use std::path::Path;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};

use crate::error::{Result, WaveSpeedError};
use crate::request::GenerationRequest;
use crate::types::*;

const DEFAULT_BASE_URL: &str = "https://api.wavespeed.ai";

/// Per-request timeout for plain POST/GET exchanges.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default deadline for long-running operations (task polling).
const LONG_OPERATION_TIMEOUT: Duration = Duration::from_secs(1800);

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const FILE_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider-side seeds must stay below this modulus; -1 is the
/// "let the provider choose" sentinel and passes through untouched.
const SEED_MODULUS: i64 = 9_999_999_999;

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Async client for the WaveSpeed AI media-generation API.
///
/// Owns the base URL and bearer credential, and provides the raw HTTP
/// exchange (`post`/`get` with envelope unwrapping), task-status polling,
/// request submission, and retrying binary upload.
///
/// # Example
/// ```no_run
/// use wavespeed_rs::WaveSpeedClient;
///
/// # async fn example() -> wavespeed_rs::Result<()> {
/// let client = WaveSpeedClient::new("ws-api-key");
/// let status = client.check_task_status("task-id").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WaveSpeedClient {
    http: Client,
    base_url: String,
    credential: Credential,
    default_timeout: Duration,
}

impl WaveSpeedClient {
    /// Create a new client with the given API credential.
    pub fn new(credential: impl Into<Credential>) -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            credential: credential.into(),
            default_timeout: LONG_OPERATION_TIMEOUT,
        }
    }

    /// Create a client from the `WAVESPEED_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        match std::env::var("WAVESPEED_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(WaveSpeedError::Validation(
                "WAVESPEED_API_KEY is not set".into(),
            )),
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Point the client at a different host (staging, mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize(base_url.into());
        self
    }

    /// Override the default long-operation timeout used when a caller does
    /// not supply one to [`wait_for_task`](Self::wait_for_task).
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Raw HTTP exchange ───────────────────────────────────────────

    /// Send a JSON POST and unwrap the response envelope.
    ///
    /// HTTP 401 and envelope code 401 both surface as
    /// [`WaveSpeedError::Unauthorized`]. Other non-2xx statuses become
    /// [`WaveSpeedError::Http`] with the body's `message` field when one
    /// parses out of it.
    pub async fn post(
        &self,
        path: &str,
        payload: &Value,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.credential.token())
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .json(payload)
            .send()
            .await
            .map_err(|e| WaveSpeedError::Network {
                context: format!("Cannot reach WaveSpeed at {}", self.base_url),
                source: e,
            })?;

        self.unwrap_response(resp, "message", true).await
    }

    /// Send a GET with optional query parameters and unwrap the envelope.
    ///
    /// Mirrors the upstream client's quirks: the error body is probed for an
    /// `error` field rather than `message`, and an envelope code 401 is
    /// reported as [`WaveSpeedError::Api`] instead of `Unauthorized`.
    pub async fn get(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .get(&url)
            .bearer_auth(self.credential.token())
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT));
        if let Some(params) = params {
            req = req.query(params);
        }
        let resp = req.send().await.map_err(|e| WaveSpeedError::Network {
            context: format!("Cannot reach WaveSpeed at {}", self.base_url),
            source: e,
        })?;

        self.unwrap_response(resp, "error", false).await
    }

    async fn unwrap_response(
        &self,
        resp: reqwest::Response,
        error_field: &str,
        code_401_is_auth: bool,
    ) -> Result<Value> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(WaveSpeedError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(http_error(status.as_u16(), &body, error_field));
        }

        let body: Value = resp.json().await.map_err(|e| WaveSpeedError::Network {
            context: "Failed to parse WaveSpeed response".into(),
            source: e,
        })?;
        ApiResponse::classify(body).into_data(code_401_is_auth)
    }

    // ── Task status ─────────────────────────────────────────────────

    /// Fetch the current status snapshot for a task.
    pub async fn check_task_status(&self, task_id: &str) -> Result<TaskStatus> {
        if task_id.is_empty() {
            return Err(WaveSpeedError::InvalidTask);
        }
        let value = self
            .get(&format!("/api/v2/predictions/{task_id}/result"), None, None)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch a task via the alternate `/api/v3/tasks/{id}` route some
    /// provider flows use.
    pub async fn get_task(&self, task_id: &str) -> Result<TaskStatus> {
        if task_id.is_empty() {
            return Err(WaveSpeedError::InvalidTask);
        }
        let value = self
            .get(&format!("/api/v3/tasks/{task_id}"), None, None)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Poll task status at `polling_interval` until the task completes,
    /// fails, or the wall-clock `timeout` elapses (the client default when
    /// `None`).
    ///
    /// The deadline never aborts an in-flight status request; it only stops
    /// the loop from starting another iteration.
    pub async fn wait_for_task(
        &self,
        task_id: &str,
        polling_interval: Duration,
        timeout: Option<Duration>,
    ) -> Result<TaskStatus> {
        if task_id.is_empty() {
            return Err(WaveSpeedError::InvalidTask);
        }
        let timeout = timeout.unwrap_or(self.default_timeout);
        poll_task(
            || self.check_task_status(task_id),
            polling_interval,
            timeout,
        )
        .await
    }

    // ── Request submission ──────────────────────────────────────────

    /// Build a descriptor's payload, post it, and either return immediately
    /// or wait for the task to finish.
    ///
    /// Forces `enable_base64_output = false` and normalizes the seed before
    /// transmission. Some endpoints return finished `outputs` inline even
    /// when a task was expected; that response is trusted only when it
    /// actually carries outputs, otherwise the task ID is polled as usual.
    pub async fn send_request<R>(
        &self,
        request: &R,
        wait_for_completion: bool,
        polling_interval: Duration,
        timeout: Option<Duration>,
    ) -> Result<SendOutcome>
    where
        R: GenerationRequest + ?Sized,
    {
        let payload = prepare_payload(request.build_payload()?);
        let response = self
            .post(request.api_path(), &Value::Object(payload), None)
            .await?;

        let snapshot: TaskStatus = serde_json::from_value(response)?;
        resolve_submission(snapshot, wait_for_completion, |task_id| async move {
            self.wait_for_task(&task_id, polling_interval, timeout).await
        })
        .await
    }

    // ── Binary upload ───────────────────────────────────────────────

    /// Upload encoded image bytes, returning the download URL.
    ///
    /// Connection/TLS failures are retried with linear backoff (2s, 4s, …)
    /// up to `max_retries` attempts; any HTTP or envelope error is fatal
    /// immediately.
    pub async fn upload_file(&self, image_bytes: Vec<u8>, max_retries: u32) -> Result<String> {
        self.upload_bytes("image.png", "image/png", image_bytes, max_retries, UPLOAD_TIMEOUT)
            .await
    }

    /// Upload a file from disk with an explicit MIME type. The canonical
    /// upload filename is derived from the MIME type before any I/O; an
    /// unrecognized type fails with [`WaveSpeedError::UnsupportedFileType`].
    pub async fn upload_file_with_type(
        &self,
        file_path: impl AsRef<Path>,
        mime_type: &str,
        max_retries: u32,
    ) -> Result<String> {
        let kind = FileKind::from_mime(mime_type)?;
        let bytes = std::fs::read(file_path)?;
        self.upload_bytes(kind.upload_name(), mime_type, bytes, max_retries, FILE_UPLOAD_TIMEOUT)
            .await
    }

    async fn upload_bytes(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<String> {
        let url = format!("{}/api/v2/media/upload/binary", self.base_url);

        retry_with_backoff(max_retries, || {
            let bytes = bytes.clone();
            let url = url.as_str();
            async move {
                let part = reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name.to_string())
                    .mime_str(mime_type)
                    .map_err(|_| {
                        Attempt::Fatal(WaveSpeedError::Validation(format!(
                            "invalid MIME type: {mime_type}"
                        )))
                    })?;
                let form = reqwest::multipart::Form::new().part("file", part);

                let resp = self
                    .http
                    .post(url)
                    .bearer_auth(self.credential.token())
                    .multipart(form)
                    .timeout(timeout)
                    .send()
                    .await
                    .map_err(|e| {
                        if is_transient(&e) {
                            Attempt::Transient(e.to_string())
                        } else {
                            Attempt::Fatal(WaveSpeedError::Network {
                                context: "Upload request failed".into(),
                                source: e,
                            })
                        }
                    })?;

                let status = resp.status();
                if status == StatusCode::UNAUTHORIZED {
                    return Err(Attempt::Fatal(WaveSpeedError::Unauthorized));
                }
                if !status.is_success() {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(Attempt::Fatal(WaveSpeedError::Http {
                        status: status.as_u16(),
                        message: body,
                    }));
                }

                let body: Value = resp.json().await.map_err(|e| {
                    Attempt::Fatal(WaveSpeedError::Network {
                        context: "Failed to parse upload response".into(),
                        source: e,
                    })
                })?;
                let data = ApiResponse::classify(body)
                    .into_data(true)
                    .map_err(Attempt::Fatal)?;

                // A 200 with an unexpected body shape must not pass silently.
                data.get("download_url")
                    .and_then(|v| v.as_str())
                    .map(String::from)
                    .ok_or_else(|| {
                        Attempt::Fatal(WaveSpeedError::UploadFailed(
                            "no download URL in response".into(),
                        ))
                    })
            }
        })
        .await
    }
}

/// Build the `Http` error for a non-2xx response, probing the body for the
/// given error field (`message` on POST, `error` on GET — an upstream
/// inconsistency kept intact).
fn http_error(status: u16, body: &str, error_field: &str) -> WaveSpeedError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get(error_field)
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| format!("HTTP {status}"));
    WaveSpeedError::Http { status, message }
}

/// Whether a transport error is worth retrying. TLS handshake failures and
/// connection resets both surface as connect errors in reqwest.
fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect()
}

/// Insert the forced fields into an outgoing payload: base64 output is
/// always disabled, and a non-sentinel seed is reduced modulo the provider
/// maximum.
pub(crate) fn prepare_payload(mut payload: Map<String, Value>) -> Map<String, Value> {
    payload.insert("enable_base64_output".into(), Value::Bool(false));
    if let Some(seed) = payload.get("seed").and_then(Value::as_i64) {
        if seed != -1 {
            payload.insert("seed".into(), Value::from(seed.rem_euclid(SEED_MODULUS)));
        }
    }
    payload
}

/// Polling state machine: check → sleep → re-check until a terminal state
/// or the deadline. Factored out of [`WaveSpeedClient::wait_for_task`] so
/// the status source can be injected.
pub(crate) async fn poll_task<F, Fut>(
    mut check: F,
    polling_interval: Duration,
    timeout: Duration,
) -> Result<TaskStatus>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TaskStatus>>,
{
    let start = tokio::time::Instant::now();
    while start.elapsed() < timeout {
        let snapshot = check().await?;
        match snapshot.state() {
            TaskState::Completed => return Ok(snapshot),
            TaskState::Failed => {
                let message = snapshot.error.unwrap_or_else(|| "Task failed".into());
                return Err(WaveSpeedError::TaskFailed(message));
            }
            TaskState::Pending => {}
        }
        tokio::time::sleep(polling_interval).await;
    }
    Err(WaveSpeedError::TaskTimedOut)
}

/// Decide what a submission response means: an inline finished result, a
/// task ID to hand back or poll, or neither. Factored out of
/// [`WaveSpeedClient::send_request`] so the polling step can be injected.
pub(crate) async fn resolve_submission<F, Fut>(
    snapshot: TaskStatus,
    wait_for_completion: bool,
    poll: F,
) -> Result<SendOutcome>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<TaskStatus>>,
{
    if wait_for_completion && !snapshot.outputs.is_empty() {
        return Ok(SendOutcome::Finished(snapshot));
    }
    if snapshot.id.is_empty() {
        return Err(WaveSpeedError::MissingTaskId);
    }
    if !wait_for_completion {
        return Ok(SendOutcome::Submitted {
            request_id: snapshot.id,
        });
    }
    let result = poll(snapshot.id).await?;
    Ok(SendOutcome::Finished(result))
}

/// Outcome of one upload attempt.
pub(crate) enum Attempt {
    /// Connection-class failure; retried with backoff.
    Transient(String),
    /// Anything else; propagated without retrying.
    Fatal(WaveSpeedError),
}

/// Run `op` up to `max_retries` times, sleeping `attempt * 2` seconds after
/// each transient failure. Fatal errors propagate immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(max_retries: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, Attempt>>,
{
    let mut last_error = String::new();
    for attempt in 1..=max_retries {
        match op().await {
            Ok(value) => return Ok(value),
            Err(Attempt::Fatal(e)) => return Err(e),
            Err(Attempt::Transient(message)) => {
                eprintln!(
                    "[wavespeed-rs] upload attempt {attempt} failed with connection error: {message}"
                );
                last_error = message;
                if attempt < max_retries {
                    let wait = Duration::from_secs(u64::from(attempt) * 2);
                    eprintln!("[wavespeed-rs] retrying in {}s", wait.as_secs());
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
    Err(WaveSpeedError::UploadFailed(format!(
        "{max_retries} attempts exhausted; last error: {last_error}"
    )))
}
