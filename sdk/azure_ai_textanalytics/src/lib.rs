#![doc = include_str!("../README.md")]

pub mod language;
pub mod legacy;
pub mod results;
pub mod tasks;

pub use azure_ai_textanalytics_lro::{
    driver, BlockingLroPoller, ContinuationCursor, JobHandle, LroPoller, OperationSnapshot,
    OperationState, PageOptions, ResultPage, SubmitRequest,
};
pub use results::{ActionResult, DocumentsPage, TaskResults};
pub use tasks::{TaskAction, TaskKind, TaskSpec};

use azure_ai_textanalytics_core::client::TextAnalyticsClient;
use azure_ai_textanalytics_core::error::TextAnalyticsResult;
use azure_ai_textanalytics_lro::LroAdapter;

/// Pair `adapter` with a clone of `client` and submit the job.
pub(crate) async fn start<A: LroAdapter>(
    client: &TextAnalyticsClient,
    adapter: A,
    request: &SubmitRequest,
) -> TextAnalyticsResult<(LroPoller<A>, JobHandle)> {
    let poller = LroPoller::new(client.clone(), adapter);
    let handle = poller.activate(request).await?;
    Ok((poller, handle))
}
