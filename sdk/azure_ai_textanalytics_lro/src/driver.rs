//! Convenience loops over [`LroPoller`]: poll until terminal, collect pages.

use std::time::Duration;

use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};
use futures::TryStreamExt;

use crate::adapter::{LroAdapter, SubmitRequest};
use crate::handle::JobHandle;
use crate::poller::{LroPoller, ResultPage};
use crate::state::{OperationSnapshot, OperationState};

/// Counts poll attempts against an optional ceiling (`0` means unlimited).
#[derive(Debug, Clone, Copy)]
pub(crate) struct PollBudget {
    max_attempts: u32,
    attempts: u32,
}

impl PollBudget {
    pub(crate) fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts: 0,
        }
    }

    /// Claim the next attempt, or fail with [`TextAnalyticsError::PollTimeout`].
    pub(crate) fn next_attempt(&mut self) -> TextAnalyticsResult<u32> {
        if self.max_attempts > 0 && self.attempts >= self.max_attempts {
            return Err(TextAnalyticsError::PollTimeout {
                attempts: self.attempts,
            });
        }
        self.attempts += 1;
        Ok(self.attempts)
    }
}

/// Poll a job until it reaches a terminal state.
///
/// Stops on the first terminal snapshot, whatever the outcome; the caller
/// inspects [`OperationSnapshot::state`]. `max_attempts` of `0` polls forever.
///
/// # Errors
///
/// Returns [`TextAnalyticsError::PollTimeout`] when `max_attempts` polls pass
/// without a terminal state, or the first error from a poll.
#[tracing::instrument(
    name = "textanalytics::lro::poll_until_complete",
    skip(poller, poll_interval),
    fields(operation = poller.adapter().operation_name(), job = %handle)
)]
pub async fn poll_until_complete<A: LroAdapter>(
    poller: &LroPoller<A>,
    handle: &JobHandle,
    poll_interval: Duration,
    max_attempts: u32,
) -> TextAnalyticsResult<OperationSnapshot> {
    tracing::debug!("starting to poll for completion");
    let mut budget = PollBudget::new(max_attempts);

    loop {
        let attempt = budget.next_attempt()?;
        let snapshot = poller.poll(handle).await?;

        if snapshot.is_terminal() {
            tracing::debug!(state = %snapshot.state, attempt, "job reached terminal state");
            return Ok(snapshot);
        }

        tracing::trace!(state = %snapshot.state, attempt, "job still in progress");
        tokio::time::sleep(poll_interval).await;
    }
}

/// Fetch every result page of a completed job, in order.
pub async fn fetch_all_pages<A: LroAdapter>(
    poller: &LroPoller<A>,
    handle: &JobHandle,
) -> TextAnalyticsResult<Vec<ResultPage<A::Item>>> {
    poller.pages(handle).try_collect().await
}

/// A job driven from submission to its final state.
#[derive(Debug, Clone)]
pub struct LroOutcome<T> {
    pub job_handle: JobHandle,
    /// The terminal snapshot that ended polling.
    pub snapshot: OperationSnapshot,
    /// Result pages; empty for cancelled or rejected jobs.
    pub pages: Vec<ResultPage<T>>,
}

impl<T> LroOutcome<T> {
    /// All items across pages.
    pub fn into_items(self) -> Vec<T> {
        self.pages.into_iter().flat_map(|p| p.items).collect()
    }
}

/// Submit, poll until terminal, then fetch all pages.
///
/// Pages are fetched for `succeeded`, `partiallyCompleted` and `failed` jobs;
/// a failed job with batch errors therefore surfaces as
/// [`TextAnalyticsError::BatchResult`].
pub async fn run_to_completion<A: LroAdapter>(
    poller: &LroPoller<A>,
    request: &SubmitRequest,
    poll_interval: Duration,
    max_attempts: u32,
) -> TextAnalyticsResult<LroOutcome<A::Item>> {
    let job_handle = poller.activate(request).await?;
    let snapshot = poll_until_complete(poller, &job_handle, poll_interval, max_attempts).await?;

    let pages = if has_results(&snapshot.state) {
        fetch_all_pages(poller, &job_handle).await?
    } else {
        Vec::new()
    };

    Ok(LroOutcome {
        job_handle,
        snapshot,
        pages,
    })
}

pub(crate) fn has_results(state: &OperationState) -> bool {
    matches!(
        state,
        OperationState::Succeeded | OperationState::PartiallyCompleted | OperationState::Failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{job_body, setup_poller};
    use azure_ai_textanalytics_core::models::TextDocumentInput;
    use azure_ai_textanalytics_core::version::ServiceVersion;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn handle() -> JobHandle {
        JobHandle::new("job-1").expect("valid handle")
    }

    #[test]
    fn test_budget_unlimited() {
        let mut budget = PollBudget::new(0);
        for _ in 0..10_000 {
            budget.next_attempt().expect("unlimited");
        }
    }

    #[test]
    fn test_budget_limited() {
        let mut budget = PollBudget::new(2);
        assert_eq!(budget.next_attempt().unwrap(), 1);
        assert_eq!(budget.next_attempt().unwrap(), 2);
        let err = budget.next_attempt().unwrap_err();
        assert!(matches!(err, TextAnalyticsError::PollTimeout { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_poll_until_complete_stops_at_first_terminal_state() {
        for terminal in ["succeeded", "failed", "cancelled", "partiallyCompleted", "rejected"] {
            let server = MockServer::start().await;
            let poller = setup_poller(&server, ServiceVersion::V3_1, false);

            Mock::given(method("GET"))
                .and(path("/test/jobs/job-1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(job_body("notStarted")))
                .up_to_n_times(1)
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/test/jobs/job-1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(job_body("running")))
                .up_to_n_times(2)
                .expect(2)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/test/jobs/job-1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(job_body(terminal)))
                .expect(1)
                .mount(&server)
                .await;

            let snapshot = poll_until_complete(&poller, &handle(), Duration::from_millis(1), 0)
                .await
                .expect("should complete");
            assert_eq!(snapshot.state, OperationState::from(terminal));

            server.verify().await;
        }
    }

    #[tokio::test]
    async fn test_poll_until_complete_times_out() {
        let server = MockServer::start().await;
        let poller = setup_poller(&server, ServiceVersion::V3_1, false);

        Mock::given(method("GET"))
            .and(path("/test/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_body("running")))
            .expect(3)
            .mount(&server)
            .await;

        let err = poll_until_complete(&poller, &handle(), Duration::from_millis(1), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, TextAnalyticsError::PollTimeout { attempts: 3 }), "{err:?}");
    }

    #[tokio::test]
    async fn test_poll_until_complete_propagates_poll_error() {
        let server = MockServer::start().await;
        let poller = setup_poller(&server, ServiceVersion::V3_1, false);

        Mock::given(method("GET"))
            .and(path("/test/jobs/job-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "code": "NotFound", "message": "job not found" }
            })))
            .mount(&server)
            .await;

        let err = poll_until_complete(&poller, &handle(), Duration::from_millis(1), 5)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_poll_until_complete_emits_span() {
        let server = MockServer::start().await;
        let poller = setup_poller(&server, ServiceVersion::V3_1, false);

        Mock::given(method("GET"))
            .and(path("/test/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_body("succeeded")))
            .mount(&server)
            .await;

        let _ = poll_until_complete(&poller, &handle(), Duration::from_millis(1), 2).await;
        assert!(logs_contain("textanalytics::lro::poll_until_complete"));
    }

    #[tokio::test]
    async fn test_run_to_completion_collects_items() {
        let server = MockServer::start().await;
        let poller = setup_poller(&server, ServiceVersion::V3_1, false);

        Mock::given(method("POST"))
            .and(path("/test/jobs"))
            .respond_with(ResponseTemplate::new(202).append_header(
                "Operation-Location",
                format!("{}/test/jobs/job-1", server.uri()).as_str(),
            ))
            .mount(&server)
            .await;

        let mut done = job_body("succeeded");
        done["documents"] = serde_json::json!([{ "id": "1" }, { "id": "2" }]);
        Mock::given(method("GET"))
            .and(path("/test/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(done))
            .mount(&server)
            .await;

        let request = SubmitRequest::new(vec![
            TextDocumentInput::new("1", "a"),
            TextDocumentInput::new("2", "b"),
        ])
        .expect("valid request");

        let outcome = run_to_completion(&poller, &request, Duration::from_millis(1), 10)
            .await
            .expect("should complete");
        assert_eq!(outcome.job_handle.as_str(), "job-1");
        assert!(outcome.snapshot.state.is_success());
        let ids: Vec<_> = outcome.into_items().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_run_to_completion_skips_pages_for_cancelled_job() {
        let server = MockServer::start().await;
        let poller = setup_poller(&server, ServiceVersion::V3_1, false);

        Mock::given(method("POST"))
            .and(path("/test/jobs"))
            .respond_with(ResponseTemplate::new(202).append_header(
                "Operation-Location",
                format!("{}/test/jobs/job-1", server.uri()).as_str(),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/test/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_body("cancelled")))
            .expect(1)
            .mount(&server)
            .await;

        let request =
            SubmitRequest::new(vec![TextDocumentInput::new("1", "a")]).expect("valid request");
        let outcome = run_to_completion(&poller, &request, Duration::from_millis(1), 10)
            .await
            .expect("should complete");
        assert_eq!(outcome.snapshot.state, OperationState::Cancelled);
        assert!(outcome.pages.is_empty());
    }
}
