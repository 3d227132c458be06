//! Task service boundary: upload, task creation, status polling, result fetch.
//!
//! All real computation (the background removal itself) happens behind a
//! REST API. The [`TaskApi`] trait defines the four operations the pipeline
//! needs — upload an image, create a processing task, read a task back,
//! fetch result bytes — so the rest of the codebase is transport-agnostic
//! and tests can run against a recorded mock.
//!
//! The production implementation is [`RestApi`] (blocking reqwest).
//!
//! ## Polling
//!
//! Task processing is asynchronous on the service side; completion is
//! observed by polling `get_task` on a fixed interval. The loop is bounded
//! (maximum attempt count → [`TaskError::PollExhausted`]) and cancellable
//! through a shared [`CancelToken`] checked before every request and every
//! sleep, so an abandoned session never leaves a timer re-scheduling
//! itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Default wait between status polls.
pub const POLLING_INTERVAL: Duration = Duration::from_millis(2000);
/// Default poll attempt cap (5 minutes at the default interval).
pub const MAX_POLL_ATTEMPTS: u32 = 150;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("task {0} failed on the processing service")]
    TaskFailed(u64),
    #[error("task {id} still {status} after {attempts} poll attempts")]
    PollExhausted {
        id: u64,
        status: TaskStatus,
        attempts: u32,
    },
    #[error("polling cancelled")]
    Cancelled,
    #[error("malformed result payload: {0}")]
    MalformedResult(#[from] serde_json::Error),
    #[error("task {0} succeeded without result data")]
    MissingResult(u64),
}

/// Lifecycle states a task reports. `success` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Init,
    Queueing,
    Pending,
    Running,
    Success,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Queueing => "queueing",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A processing task as the service reports it.
///
/// Extra wire fields (timestamps, progress data) are ignored on
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_data: Option<String>,
}

impl Task {
    /// Parse the result image URL out of a successful task's `resultData`.
    pub fn result_image_url(&self) -> Result<String, TaskError> {
        let raw = self
            .result_data
            .as_deref()
            .ok_or(TaskError::MissingResult(self.id))?;
        let payload: ImagePayload = serde_json::from_str(raw)?;
        Ok(payload.image_url)
    }
}

/// The `data`/`resultData` JSON payload: a single image URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub image_url: String,
}

/// Request body for task creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub name: String,
    pub data: String,
    pub template_name: String,
}

/// Response of an image upload: where the file can be fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

/// Trait for task service transports.
///
/// Every transport must implement all four operations so the pipeline is
/// transport-agnostic. See the [module docs](self) for the operation table.
pub trait TaskApi: Sync {
    /// Persist a raw image; returns a fetchable URL.
    fn upload_image(&self, path: &Path) -> Result<UploadedImage, TaskError>;

    /// Enqueue a processing job.
    fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, TaskError>;

    /// Read a task's current state.
    fn get_task(&self, id: u64) -> Result<Task, TaskError>;

    /// Download raw bytes from a service URL (result images, templates).
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TaskError>;
}

/// Shared cancellation signal for a polling loop.
///
/// Cloning hands the same flag to another owner (e.g. a ctrl-c handler);
/// cancelling from any clone stops the loop at its next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bounds for a polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: POLLING_INTERVAL,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

/// Poll `get_task` until the task reaches a terminal status.
///
/// Returns the successful task, or an error for a failed task, an
/// exhausted attempt budget, or cancellation. `observe` is called once per
/// attempt with the status seen.
pub fn poll_until_complete_with(
    api: &impl TaskApi,
    id: u64,
    config: &PollConfig,
    cancel: &CancelToken,
    mut observe: impl FnMut(u32, TaskStatus),
) -> Result<Task, TaskError> {
    let mut last_status = TaskStatus::Init;

    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            return Err(TaskError::Cancelled);
        }

        let task = api.get_task(id)?;
        observe(attempt, task.status);
        match task.status {
            TaskStatus::Success => return Ok(task),
            TaskStatus::Failed => return Err(TaskError::TaskFailed(id)),
            status => last_status = status,
        }

        if attempt < config.max_attempts {
            if cancel.is_cancelled() {
                return Err(TaskError::Cancelled);
            }
            std::thread::sleep(config.interval);
        }
    }

    Err(TaskError::PollExhausted {
        id,
        status: last_status,
        attempts: config.max_attempts,
    })
}

/// [`poll_until_complete_with`] without an observer.
pub fn poll_until_complete(
    api: &impl TaskApi,
    id: u64,
    config: &PollConfig,
    cancel: &CancelToken,
) -> Result<Task, TaskError> {
    poll_until_complete_with(api, id, config, cancel, |_, _| {})
}

/// Blocking reqwest transport against the task service.
pub struct RestApi {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl RestApi {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, TaskError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("cutout-studio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl TaskApi for RestApi {
    fn upload_image(&self, path: &Path) -> Result<UploadedImage, TaskError> {
        let form = reqwest::blocking::multipart::Form::new().file("file", path)?;
        let response = self
            .authorize(self.client.post(format!("{}/api/file/upload", self.base_url)))
            .multipart(form)
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }

    fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, TaskError> {
        let response = self
            .authorize(self.client.post(format!("{}/api/task/create", self.base_url)))
            .json(request)
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }

    fn get_task(&self, id: u64) -> Result<Task, TaskError> {
        let response = self
            .authorize(self.client.get(format!("{}/api/task/{id}", self.base_url)))
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TaskError> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}
