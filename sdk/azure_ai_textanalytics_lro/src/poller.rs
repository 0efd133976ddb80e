//! The generic job poller.
//!
//! [`LroPoller`] drives any [`LroAdapter`] through its lifecycle:
//! activation, status polls, cancellation and paged result retrieval. It holds
//! no per-job state, so one poller can serve many jobs and every method is
//! keyed by a [`JobHandle`].
//!
//! ## Example
//!
//! ```rust,ignore
//! let poller = LroPoller::new(client, adapter);
//! let handle = poller.activate(&SubmitRequest::new(documents)?).await?;
//!
//! let snapshot = driver::poll_until_complete(&poller, &handle, Duration::from_secs(2), 60).await?;
//! if snapshot.state.is_success() {
//!     let pages = driver::fetch_all_pages(&poller, &handle).await?;
//! }
//! ```

use std::future::Future;

use azure_ai_textanalytics_core::client::TextAnalyticsClient;
use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};
use azure_ai_textanalytics_core::models::{BatchStatistics, DocumentError};
use futures::Stream;
use tracing::Instrument;

use crate::adapter::{CancelCall, JobEnvelope, LroAdapter, SubmitRequest};
use crate::cursor::{ContinuationCursor, PageOptions};
use crate::handle::JobHandle;
use crate::state::OperationSnapshot;

/// Name of the response header that carries the job URL.
pub const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One page of results of a completed job.
#[derive(Debug, Clone)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    pub document_errors: Vec<DocumentError>,
    pub statistics: Option<BatchStatistics>,
    pub model_version: Option<String>,
    /// Cursor of the following page; `None` on the last page.
    pub continuation: Option<ContinuationCursor>,
}

impl<T> ResultPage<T> {
    /// `true` when no further page exists.
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}

/// The service accepted a cancellation request.
///
/// Acceptance is not completion: keep polling until the job reports a
/// terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelConfirmation {
    pub job_handle: JobHandle,
    /// Status URL returned with the acceptance, when the service sent one.
    pub operation_location: Option<String>,
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Polls, cancels and pages one kind of batch job.
#[derive(Debug, Clone)]
pub struct LroPoller<A> {
    client: TextAnalyticsClient,
    adapter: A,
    page_options: PageOptions,
}

impl<A: LroAdapter> LroPoller<A> {
    pub fn new(client: TextAnalyticsClient, adapter: A) -> Self {
        Self {
            client,
            adapter,
            page_options: PageOptions::default(),
        }
    }

    /// Paging parameters used by [`fetch_page`](Self::fetch_page) when no cursor is given.
    pub fn with_page_options(mut self, options: PageOptions) -> Self {
        self.page_options = options;
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn client(&self) -> &TextAnalyticsClient {
        &self.client
    }

    pub fn page_options(&self) -> PageOptions {
        self.page_options
    }

    /// Submit a job and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`TextAnalyticsError::InvalidState`] if the acceptance carries
    /// no `Operation-Location` header, or a transport error from the submit call.
    #[tracing::instrument(
        name = "textanalytics::lro::activate",
        skip(self, request),
        fields(operation = self.adapter.operation_name(), documents = request.documents.len())
    )]
    pub async fn activate(&self, request: &SubmitRequest) -> TextAnalyticsResult<JobHandle> {
        tracing::debug!("submitting job");

        let body = self.adapter.build_submit_request(request)?;
        let response = self.client.post(&self.adapter.submit_path(), &body).await?;

        let location = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                TextAnalyticsError::InvalidState(format!(
                    "job acceptance did not include an {OPERATION_LOCATION_HEADER} header"
                ))
            })?;

        let handle = self.adapter.extract_job_handle(location)?;
        tracing::debug!(job = %handle, "job accepted");
        Ok(handle)
    }

    /// Fetch the job's status once.
    ///
    /// Polling is observation only: repeated calls on an unchanged job give
    /// equal snapshots.
    #[tracing::instrument(
        name = "textanalytics::lro::poll",
        skip(self),
        fields(operation = self.adapter.operation_name(), job = %handle)
    )]
    pub async fn poll(&self, handle: &JobHandle) -> TextAnalyticsResult<OperationSnapshot> {
        let envelope = self.status(handle, None).await?;
        let snapshot = self.adapter.map_status(handle, &envelope);
        tracing::trace!(state = %snapshot.state, "job status");
        Ok(snapshot)
    }

    /// Request cancellation of a job.
    ///
    /// Support is decided before any request is made: for job kinds that
    /// cannot be cancelled this returns [`TextAnalyticsError::Unsupported`]
    /// immediately and no future is produced.
    pub fn cancel<'a>(
        &'a self,
        handle: &'a JobHandle,
    ) -> TextAnalyticsResult<
        impl Future<Output = TextAnalyticsResult<CancelConfirmation>> + Send + 'a,
    > {
        let call = self.adapter.cancel_call(handle).ok_or_else(|| {
            TextAnalyticsError::Unsupported(format!(
                "{} jobs cannot be cancelled",
                self.adapter.operation_name()
            ))
        })?;

        let span = tracing::info_span!(
            "textanalytics::lro::cancel",
            operation = self.adapter.operation_name(),
            job = %handle
        );

        Ok(async move {
            tracing::debug!("requesting cancellation");
            let response = match &call {
                CancelCall::Post(path) => self.client.post_empty(path).await?,
                CancelCall::Delete(path) => self.client.delete(path).await?,
            };
            let operation_location = response
                .headers()
                .get(OPERATION_LOCATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            Ok(CancelConfirmation {
                job_handle: handle.clone(),
                operation_location,
            })
        }
        .instrument(span))
    }

    /// Fetch one page of results of a completed job.
    ///
    /// `cursor` is the continuation of a previous page; `None` fetches the first
    /// page using the poller's [`PageOptions`].
    ///
    /// # Errors
    ///
    /// - [`TextAnalyticsError::BatchResult`] when the job reported batch errors,
    ///   with each error's task target resolved where possible.
    /// - [`TextAnalyticsError::InvalidState`] when the job is not terminal yet, or
    ///   the results are in a shape the adapter does not recognize.
    #[tracing::instrument(
        name = "textanalytics::lro::fetch_page",
        skip(self, cursor),
        fields(operation = self.adapter.operation_name(), job = %handle)
    )]
    pub async fn fetch_page(
        &self,
        handle: &JobHandle,
        cursor: Option<&ContinuationCursor>,
    ) -> TextAnalyticsResult<ResultPage<A::Item>> {
        let cursor = cursor.copied().unwrap_or(self.page_options);
        let envelope = self.status(handle, Some(&cursor)).await?;

        if !envelope.errors.is_empty() {
            let errors = self
                .adapter
                .error_target_scheme()
                .batch_errors(&envelope.errors);
            tracing::debug!(count = errors.len(), "job reported batch errors");
            return Err(TextAnalyticsError::BatchResult { errors });
        }

        if !envelope.status.is_terminal() {
            return Err(TextAnalyticsError::InvalidState(format!(
                "job {handle} is still {}; results are available once it completes",
                envelope.status
            )));
        }

        let continuation = ContinuationCursor::from_next_link(envelope.next_link.as_deref())?;
        let content = self.adapter.extract_result_page(envelope)?;

        tracing::debug!(
            items = content.items.len(),
            has_next = continuation.is_some(),
            "fetched result page"
        );

        Ok(ResultPage {
            items: content.items,
            document_errors: content.document_errors,
            statistics: content.statistics,
            model_version: content.model_version,
            continuation,
        })
    }

    /// Every result page of a completed job, following continuations until
    /// the last page. The stream ends after the first error.
    pub fn pages<'a>(
        &'a self,
        handle: &'a JobHandle,
    ) -> impl Stream<Item = TextAnalyticsResult<ResultPage<A::Item>>> + 'a {
        // `None` once the last page has been yielded.
        let first: Option<Option<ContinuationCursor>> = Some(None);

        futures::stream::try_unfold(first, move |next| async move {
            let Some(cursor) = next else {
                return Ok(None);
            };
            let page = self.fetch_page(handle, cursor.as_ref()).await?;
            let following = page.continuation.map(Some);
            Ok(Some((page, following)))
        })
    }

    async fn status(
        &self,
        handle: &JobHandle,
        cursor: Option<&ContinuationCursor>,
    ) -> TextAnalyticsResult<JobEnvelope<A::Body>> {
        let mut path = self.adapter.status_path(handle);
        if let Some(cursor) = cursor {
            let family = self.adapter.service_version().family();
            append_query(&mut path, &cursor.query_pairs(family));
        }

        let response = self.client.get(&path).await?;
        let envelope = response.json::<JobEnvelope<A::Body>>().await?;
        Ok(envelope)
    }
}

fn append_query(path: &mut String, pairs: &[(&str, String)]) {
    for (key, value) in pairs {
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str(key);
        path.push('=');
        path.push_str(value);
    }
}
