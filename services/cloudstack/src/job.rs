//! Polling of CloudStack async jobs.
//!
//! State-changing commands answer with a `jobid`. The job is then polled
//! with `queryAsyncJobResult` until `jobstatus` turns `1` (done) or `2`
//! (failed):
//!
//! ```text
//! SUBMITTED -> PENDING -> ... -> PENDING -> DONE | ERROR
//! ```

use std::time::Duration;

use log::{debug, warn};
use stacksign_core::{Error, Result};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::cause::ErrorCause;
use crate::constants::*;
use crate::response::default_message;
use crate::{Client, Document};

/// Status reported in `jobstatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// `0`: still running.
    Pending,
    /// `1`: finished successfully.
    Succeeded,
    /// `2`: finished with an error.
    Failed,
}

impl JobStatus {
    /// Parse a `jobstatus` value.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(JobStatus::Pending),
            "1" => Some(JobStatus::Succeeded),
            "2" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// Result of a single `queryAsyncJobResult` call.
///
/// A failed job is reported as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Keep polling.
    Pending,
    /// The full `queryAsyncJobResult` response.
    Done(Document),
}

/// Outcome of a job where "nothing changed" is not a failure.
#[derive(Debug)]
pub enum JobOutcome {
    /// The job finished, with its result document.
    Completed(Document),
    /// The job was refused because nothing changed; the error is kept for
    /// logging.
    NotModified(Error),
}

/// JobPoller waits for an async job to reach a terminal state.
///
/// The interval and the optional deadline default to the client's config.
/// The deadline is checked before each sleep, so a wait may overrun it by at
/// most one interval.
#[derive(Debug, Clone)]
pub struct JobPoller<'a> {
    client: &'a Client,
    label: String,
    interval: Duration,
    max_wait: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl<'a> JobPoller<'a> {
    /// Create a poller. `label` names the operation in error messages.
    pub fn new(client: &'a Client, label: &str) -> Self {
        let config = client.config();
        Self {
            client,
            label: label.to_string(),
            interval: config.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            max_wait: config.max_job_wait,
            cancel: None,
        }
    }

    /// Set the delay between two status queries.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Give up with [`stacksign_core::ErrorKind::Timeout`] once `max_wait` has elapsed.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Abandon the wait with [`stacksign_core::ErrorKind::Cancelled`] once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Wait for the job referenced by `doc`.
    ///
    /// Returns `doc` itself when it carries no `jobid`: the command was
    /// synchronous.
    pub async fn wait(&self, doc: &Document) -> Result<Document> {
        match job_id(doc) {
            Some(job_id) => self.wait_for_id(&job_id).await,
            None => Ok(doc.clone()),
        }
    }

    /// Wait for `job_id` and return the final `queryAsyncJobResult` response.
    pub async fn wait_for_id(&self, job_id: &str) -> Result<Document> {
        debug!("{}: waiting for job {job_id}", self.label);
        let deadline = self.max_wait.map(|d| Instant::now() + d);

        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(Error::timeout(format!(
                    "{} did not finish within {:?}",
                    self.label,
                    self.max_wait.unwrap_or_default()
                ))
                .with_context(format!("job_id: {job_id}")));
            }

            self.pause(job_id).await?;

            match self.poll_once(job_id).await? {
                JobState::Pending => continue,
                JobState::Done(doc) => {
                    debug!("{}: job {job_id} succeeded", self.label);
                    return Ok(doc);
                }
            }
        }
    }

    /// Like [`JobPoller::wait`], but a "no change since last snapshot"
    /// failure becomes [`JobOutcome::NotModified`].
    pub async fn wait_outcome(&self, doc: &Document) -> Result<JobOutcome> {
        match self.wait(doc).await {
            Ok(doc) => Ok(JobOutcome::Completed(doc)),
            Err(err) if ErrorCause::of(&err) == ErrorCause::NotModified => {
                Ok(JobOutcome::NotModified(err))
            }
            Err(err) => Err(err),
        }
    }

    /// Issue one `queryAsyncJobResult` and read the job state.
    pub async fn poll_once(&self, job_id: &str) -> Result<JobState> {
        let url = self
            .client
            .build_url(QUERY_ASYNC_JOB_RESULT, &[("jobId", job_id)])?;

        let Some(doc) = self.client.get(&url).await? else {
            return Err(Error::service(
                JOB_FAILURE_CODE,
                format!("{}: no result returned for job {job_id}", self.label),
            ));
        };

        job_state(doc, &self.label).map_err(|e| e.with_context(format!("job_id: {job_id}")))
    }

    async fn pause(&self, job_id: &str) -> Result<()> {
        let Some(token) = &self.cancel else {
            sleep(self.interval).await;
            return Ok(());
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("{}: stopped waiting for job {job_id}", self.label);
                Err(Error::cancelled(format!("{} was cancelled while waiting", self.label))
                    .with_context(format!("job_id: {job_id}")))
            }
            _ = sleep(self.interval) => Ok(()),
        }
    }
}

/// The `jobid` carried by a response, if any.
pub fn job_id(doc: &Document) -> Option<String> {
    doc.find_text(TAG_JOB_ID)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read the state of a `queryAsyncJobResult` response.
///
/// A missing `jobstatus` counts as pending.
pub fn job_state(doc: Document, label: &str) -> Result<JobState> {
    let Some(status) = doc.find_text(TAG_JOB_STATUS).map(str::to_string) else {
        return Ok(JobState::Pending);
    };

    match JobStatus::from_code(&status) {
        Some(JobStatus::Pending) => Ok(JobState::Pending),
        Some(JobStatus::Succeeded) => Ok(JobState::Done(doc)),
        Some(JobStatus::Failed) => {
            let err = job_error(&doc, label);
            warn!("{label} failed: [{:?}] {}", err.code(), err.message());
            Err(err)
        }
        None => Err(Error::response_malformed(
            200,
            format!("unknown jobstatus {status:?}"),
            doc.body().clone(),
        )),
    }
}

/// Build the error of a failed job from its `jobresult`.
fn job_error(doc: &Document, label: &str) -> Error {
    let fallback = doc
        .find_text(TAG_JOB_RESULT_CODE)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v != 0)
        .unwrap_or(JOB_FAILURE_CODE);
    let unexplained = || Error::service(fallback, format!("{label} failed with an unexplained error"));

    let Some(result) = doc.find(TAG_JOB_RESULT) else {
        return unexplained();
    };

    let code = result
        .find_text(TAG_ERROR_CODE)
        .and_then(|v| v.parse::<u32>().ok());
    let text = result
        .find_text(TAG_ERROR_TEXT)
        .filter(|v| !v.is_empty());

    match (code, text) {
        (None, None) if !result.text().is_empty() => Error::service(fallback, result.text()),
        (None, None) => unexplained(),
        (code, text) => {
            let code = code.unwrap_or(fallback);
            let message = text.map(str::to_string).unwrap_or_else(|| default_message(code));
            Error::service(code, message)
        }
    }
}
