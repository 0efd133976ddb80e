//! Blocking variant of [`LroPoller`].
//!
//! [`BlockingLroPoller`] owns a current-thread Tokio runtime and blocks on the
//! async poller's futures, so its behavior matches the async API call for
//! call. Do not use it from inside an async context: blocking a runtime
//! thread on another runtime panics.

use std::time::Duration;

use azure_ai_textanalytics_core::client::TextAnalyticsClient;
use azure_ai_textanalytics_core::error::TextAnalyticsResult;
use tokio::runtime::Runtime;

use crate::adapter::{LroAdapter, SubmitRequest};
use crate::cursor::{ContinuationCursor, PageOptions};
use crate::driver::{self, LroOutcome, PollBudget};
use crate::handle::JobHandle;
use crate::poller::{CancelConfirmation, LroPoller, ResultPage};
use crate::state::OperationSnapshot;

/// Synchronous job poller.
#[derive(Debug)]
pub struct BlockingLroPoller<A> {
    inner: LroPoller<A>,
    runtime: Runtime,
}

impl<A: LroAdapter> BlockingLroPoller<A> {
    /// Create a poller with its own runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TextAnalyticsError::Io`](azure_ai_textanalytics_core::TextAnalyticsError::Io)
    /// if the runtime cannot be started.
    pub fn new(client: TextAnalyticsClient, adapter: A) -> TextAnalyticsResult<Self> {
        Self::from_async(LroPoller::new(client, adapter))
    }

    /// Wrap an existing async poller.
    pub fn from_async(inner: LroPoller<A>) -> TextAnalyticsResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { inner, runtime })
    }

    pub fn with_page_options(mut self, options: PageOptions) -> Self {
        self.inner = self.inner.with_page_options(options);
        self
    }

    /// The async poller this wraps.
    pub fn as_async(&self) -> &LroPoller<A> {
        &self.inner
    }

    /// See [`LroPoller::activate`].
    pub fn activate(&self, request: &SubmitRequest) -> TextAnalyticsResult<JobHandle> {
        self.runtime.block_on(self.inner.activate(request))
    }

    /// See [`LroPoller::poll`].
    pub fn poll(&self, handle: &JobHandle) -> TextAnalyticsResult<OperationSnapshot> {
        self.runtime.block_on(self.inner.poll(handle))
    }

    /// See [`LroPoller::cancel`]. Unsupported job kinds fail without a request.
    pub fn cancel(&self, handle: &JobHandle) -> TextAnalyticsResult<CancelConfirmation> {
        let request = self.inner.cancel(handle)?;
        self.runtime.block_on(request)
    }

    /// See [`LroPoller::fetch_page`].
    pub fn fetch_page(
        &self,
        handle: &JobHandle,
        cursor: Option<&ContinuationCursor>,
    ) -> TextAnalyticsResult<ResultPage<A::Item>> {
        self.runtime.block_on(self.inner.fetch_page(handle, cursor))
    }

    /// Iterate result pages lazily, one request per page.
    pub fn pages<'a>(&'a self, handle: &'a JobHandle) -> BlockingPages<'a, A> {
        BlockingPages {
            poller: self,
            handle,
            next: Some(None),
        }
    }

    /// Fetch every result page, in order.
    pub fn fetch_all_pages(&self, handle: &JobHandle) -> TextAnalyticsResult<Vec<ResultPage<A::Item>>> {
        self.pages(handle).collect()
    }

    /// Poll until terminal, sleeping the calling thread between polls.
    ///
    /// Same contract as [`driver::poll_until_complete`].
    pub fn poll_until_complete(
        &self,
        handle: &JobHandle,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> TextAnalyticsResult<OperationSnapshot> {
        let mut budget = PollBudget::new(max_attempts);
        loop {
            let attempt = budget.next_attempt()?;
            let snapshot = self.poll(handle)?;
            if snapshot.is_terminal() {
                tracing::debug!(state = %snapshot.state, attempt, "job reached terminal state");
                return Ok(snapshot);
            }
            std::thread::sleep(poll_interval);
        }
    }

    /// See [`driver::run_to_completion`].
    pub fn run_to_completion(
        &self,
        request: &SubmitRequest,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> TextAnalyticsResult<LroOutcome<A::Item>> {
        self.runtime.block_on(driver::run_to_completion(
            &self.inner,
            request,
            poll_interval,
            max_attempts,
        ))
    }
}

/// Iterator returned by [`BlockingLroPoller::pages`].
pub struct BlockingPages<'a, A> {
    poller: &'a BlockingLroPoller<A>,
    handle: &'a JobHandle,
    // `None` once the last page has been yielded or an error returned.
    next: Option<Option<ContinuationCursor>>,
}

impl<A: LroAdapter> Iterator for BlockingPages<'_, A> {
    type Item = TextAnalyticsResult<ResultPage<A::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.next.take()?;
        match self.poller.fetch_page(self.handle, cursor.as_ref()) {
            Ok(page) => {
                self.next = page.continuation.map(Some);
                Some(Ok(page))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
