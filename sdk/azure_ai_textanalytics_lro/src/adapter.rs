//! The seam between the generic poller and one concrete job API.
//!
//! An [`LroAdapter`] knows the URLs, request body and result shape of one
//! kind of batch job. Everything else (activation, status mapping, paging,
//! batch-error handling) lives once in [`crate::poller::LroPoller`].

use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};
use azure_ai_textanalytics_core::models::{
    BatchStatistics, DocumentError, ServiceError, TextDocumentInput,
};
use azure_ai_textanalytics_core::version::ServiceVersion;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::handle::{parse_operation_location, JobHandle};
use crate::state::{OperationSnapshot, OperationState, TaskProgress};
use crate::target::ErrorTargetScheme;

/// The documents and display name of one job submission.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub display_name: Option<String>,
    pub documents: Vec<TextDocumentInput>,
}

impl SubmitRequest {
    /// Create a submission for `documents`.
    ///
    /// # Errors
    ///
    /// Returns [`TextAnalyticsError::Builder`] when `documents` is empty.
    pub fn new(documents: Vec<TextDocumentInput>) -> TextAnalyticsResult<Self> {
        if documents.is_empty() {
            return Err(TextAnalyticsError::Builder(
                "at least one document is required".into(),
            ));
        }
        Ok(Self {
            display_name: None,
            documents,
        })
    }

    /// Label the job; the service echoes it back in every status response.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// How a job is cancelled, for adapters that support it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelCall {
    /// `POST` to the given path (Language API `:cancel`).
    Post(String),
    /// `DELETE` the given path (legacy job resources).
    Delete(String),
}

/// Fields every job status response carries, around an API-specific body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEnvelope<B> {
    pub job_id: Option<String>,
    pub display_name: Option<String>,
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(alias = "lastUpdateDateTime")]
    pub last_updated_date_time: Option<DateTime<Utc>>,
    pub expiration_date_time: Option<DateTime<Utc>>,
    pub status: OperationState,
    #[serde(default)]
    pub errors: Vec<ServiceError>,
    #[serde(rename = "nextLink", alias = "@nextLink")]
    pub next_link: Option<String>,
    pub statistics: Option<BatchStatistics>,
    #[serde(flatten)]
    pub body: B,
}

/// The typed content of one result page, before the cursor is attached.
#[derive(Debug, Clone)]
pub struct PageContent<T> {
    pub items: Vec<T>,
    pub document_errors: Vec<DocumentError>,
    pub statistics: Option<BatchStatistics>,
    pub model_version: Option<String>,
}

impl<T> Default for PageContent<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            document_errors: Vec::new(),
            statistics: None,
            model_version: None,
        }
    }
}

/// One concrete job API: paths, request body and result extraction.
pub trait LroAdapter: Send + Sync {
    /// API-specific part of the status response.
    type Body: DeserializeOwned + Send;
    /// One item of a result page.
    type Item: Send;

    /// Short name used in logs and error messages (e.g. `analyze-actions`).
    fn operation_name(&self) -> &'static str;

    /// Service version this adapter was built for.
    fn service_version(&self) -> ServiceVersion;

    /// Path (and query) of the submit call.
    fn submit_path(&self) -> String;

    /// JSON body of the submit call.
    fn build_submit_request(&self, request: &SubmitRequest) -> TextAnalyticsResult<serde_json::Value>;

    /// Path of the status call, without paging parameters.
    fn status_path(&self, handle: &JobHandle) -> String;

    /// The cancel call, or `None` when this job kind cannot be cancelled.
    fn cancel_call(&self, handle: &JobHandle) -> Option<CancelCall>;

    /// Task counters reported in the status body.
    fn task_progress(&self, envelope: &JobEnvelope<Self::Body>) -> TaskProgress;

    /// Turn a completed status response into typed page content.
    fn extract_result_page(
        &self,
        envelope: JobEnvelope<Self::Body>,
    ) -> TextAnalyticsResult<PageContent<Self::Item>>;

    /// Job id from the `Operation-Location` header.
    fn extract_job_handle(&self, operation_location: &str) -> TextAnalyticsResult<JobHandle> {
        parse_operation_location(operation_location)
    }

    /// Build the snapshot for one status response.
    fn map_status(&self, handle: &JobHandle, envelope: &JobEnvelope<Self::Body>) -> OperationSnapshot {
        OperationSnapshot {
            job_handle: handle.clone(),
            state: envelope.status.clone(),
            display_name: envelope.display_name.clone(),
            created_at: envelope.created_date_time,
            last_modified_at: envelope.last_updated_date_time,
            expires_at: envelope.expiration_date_time,
            progress: self.task_progress(envelope),
        }
    }

    /// Vocabulary used to resolve batch error targets.
    fn error_target_scheme(&self) -> ErrorTargetScheme {
        ErrorTargetScheme::for_version(self.service_version())
    }
}

impl TaskProgress {
    /// Counters for a job that runs exactly one task.
    pub fn single(state: &OperationState) -> Self {
        let mut progress = Self {
            total: 1,
            ..Self::default()
        };
        match state {
            OperationState::Succeeded => progress.succeeded = 1,
            state if state.is_terminal() => progress.failed = 1,
            _ => progress.in_progress = 1,
        }
        progress
    }
}
