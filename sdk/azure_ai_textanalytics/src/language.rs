//! Adapters for the Language API jobs endpoint (`/language/analyze-text/jobs`).
//!
//! - [`AnalyzeActionsAdapter`] runs several tasks over one batch. Its items are
//!   [`ActionResult`]s. It cannot be cancelled.
//! - [`SingleTaskAdapter`] runs exactly one task and yields that task's
//!   documents directly. It can be cancelled.
//!
//! ## Example
//!
//! ```rust,no_run
//! use azure_ai_textanalytics::language;
//! use azure_ai_textanalytics::tasks::AbstractiveSummaryOptions;
//! use azure_ai_textanalytics_core::client::TextAnalyticsClient;
//! use azure_ai_textanalytics_core::models::TextDocumentInput;
//! use azure_ai_textanalytics_lro::{driver, SubmitRequest};
//! use std::time::Duration;
//!
//! # async fn example(client: &TextAnalyticsClient) -> Result<(), Box<dyn std::error::Error>> {
//! let request = SubmitRequest::new(vec![TextDocumentInput::new("1", "A long article...")])?;
//! let (poller, handle) =
//!     language::begin_abstractive_summary(client, &request, AbstractiveSummaryOptions::default())
//!         .await?;
//!
//! driver::poll_until_complete(&poller, &handle, Duration::from_secs(2), 60).await?;
//! for page in driver::fetch_all_pages(&poller, &handle).await? {
//!     for doc in page.items {
//!         println!("{}: {}", doc.id, doc.summaries[0].text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;

use azure_ai_textanalytics_core::client::TextAnalyticsClient;
use azure_ai_textanalytics_core::error::{TextAnalyticsError, TextAnalyticsResult};
use azure_ai_textanalytics_core::models::MultiLanguageAnalysisInput;
use azure_ai_textanalytics_core::version::{ApiFamily, ServiceVersion};
use azure_ai_textanalytics_lro::{
    CancelCall, JobEnvelope, JobHandle, LroAdapter, LroPoller, PageContent, SubmitRequest,
    TaskProgress,
};
use serde::{Deserialize, Serialize};

use crate::results::{
    AbstractiveSummaryDocument, ActionResult, ClassifyDocument, DocumentsPage,
    ExtractiveSummaryDocument, HealthcareEntitiesDocument, RawTaskItem, RecognizeEntitiesDocument,
    TaskDocumentKind,
};
use crate::tasks::{
    check_tasks, AbstractiveSummaryOptions, CustomOptions, ExtractiveSummaryOptions,
    HealthcareOptions, TaskAction, TaskSpec,
};

const JOBS_PATH: &str = "/language/analyze-text/jobs";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeTextJobRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    analysis_input: MultiLanguageAnalysisInput<'a>,
    tasks: Vec<serde_json::Value>,
}

/// The `tasks` section of a Language API job status.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageTasks {
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub in_progress: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub(crate) items: Vec<RawTaskItem>,
}

/// Language API job status body (the part around the common envelope).
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageJobBody {
    pub tasks: Option<LanguageTasks>,
}

fn require_language(version: ServiceVersion) -> TextAnalyticsResult<()> {
    match version.family() {
        ApiFamily::Language => Ok(()),
        ApiFamily::Legacy => Err(TextAnalyticsError::Unsupported(format!(
            "the Language jobs API is not available on service version {version}; use the legacy adapters"
        ))),
    }
}

fn progress(envelope: &JobEnvelope<LanguageJobBody>) -> TaskProgress {
    envelope
        .body
        .tasks
        .as_ref()
        .map(|t| TaskProgress {
            total: t.total,
            succeeded: t.completed,
            failed: t.failed,
            in_progress: t.in_progress,
        })
        .unwrap_or_default()
}

fn submit_body(
    request: &SubmitRequest,
    tasks: &[TaskSpec],
) -> TextAnalyticsResult<serde_json::Value> {
    let tasks = tasks
        .iter()
        .map(TaskSpec::to_language_task)
        .collect::<TextAnalyticsResult<Vec<_>>>()?;

    Ok(serde_json::to_value(AnalyzeTextJobRequest {
        display_name: request.display_name.as_deref(),
        analysis_input: MultiLanguageAnalysisInput {
            documents: &request.documents,
        },
        tasks,
    })?)
}

// ---------------------------------------------------------------------------
// Multi-task adapter
// ---------------------------------------------------------------------------

/// Several tasks over one batch on the Language API.
#[derive(Debug, Clone)]
pub struct AnalyzeActionsAdapter {
    version: ServiceVersion,
    tasks: Vec<TaskSpec>,
}

impl AnalyzeActionsAdapter {
    /// # Errors
    ///
    /// [`TextAnalyticsError::Unsupported`] for a legacy `version` or a task kind
    /// newer than `version`; [`TextAnalyticsError::Builder`] for an empty task list.
    pub fn new(version: ServiceVersion, tasks: Vec<TaskSpec>) -> TextAnalyticsResult<Self> {
        require_language(version)?;
        check_tasks(&tasks, version)?;
        Ok(Self { version, tasks })
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }
}

impl LroAdapter for AnalyzeActionsAdapter {
    type Body = LanguageJobBody;
    type Item = ActionResult;

    fn operation_name(&self) -> &'static str {
        "analyze-actions"
    }

    fn service_version(&self) -> ServiceVersion {
        self.version
    }

    fn submit_path(&self) -> String {
        format!("{JOBS_PATH}?api-version={}", self.version)
    }

    fn build_submit_request(&self, request: &SubmitRequest) -> TextAnalyticsResult<serde_json::Value> {
        submit_body(request, &self.tasks)
    }

    fn status_path(&self, handle: &JobHandle) -> String {
        format!("{JOBS_PATH}/{handle}?api-version={}", self.version)
    }

    fn cancel_call(&self, _handle: &JobHandle) -> Option<CancelCall> {
        None
    }

    fn task_progress(&self, envelope: &JobEnvelope<LanguageJobBody>) -> TaskProgress {
        progress(envelope)
    }

    /// Document errors stay inside each [`ActionResult`]; the page-level list is empty.
    fn extract_result_page(
        &self,
        envelope: JobEnvelope<LanguageJobBody>,
    ) -> TextAnalyticsResult<PageContent<ActionResult>> {
        let JobEnvelope {
            status,
            statistics,
            body,
            ..
        } = envelope;

        let items = body
            .tasks
            .map(|t| t.items)
            .unwrap_or_default()
            .into_iter()
            .map(|raw| {
                let kind = raw.language_kind()?;
                ActionResult::from_raw(kind, raw, &status)
            })
            .collect::<TextAnalyticsResult<Vec<_>>>()?;

        Ok(PageContent {
            items,
            statistics,
            ..PageContent::default()
        })
    }
}

// ---------------------------------------------------------------------------
// Single-task adapter
// ---------------------------------------------------------------------------

/// Exactly one task on the Language API, yielding documents of type `D`.
pub struct SingleTaskAdapter<D> {
    version: ServiceVersion,
    task: TaskSpec,
    _document: PhantomData<fn() -> D>,
}

impl<D> Clone for SingleTaskAdapter<D> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            task: self.task.clone(),
            _document: PhantomData,
        }
    }
}

impl<D> std::fmt::Debug for SingleTaskAdapter<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleTaskAdapter")
            .field("version", &self.version)
            .field("task", &self.task)
            .field("document", &std::any::type_name::<D>())
            .finish()
    }
}

impl<D: TaskDocumentKind> SingleTaskAdapter<D> {
    /// # Errors
    ///
    /// [`TextAnalyticsError::Unsupported`] for a legacy `version` or a task kind
    /// newer than `version`; [`TextAnalyticsError::Builder`] when the task's
    /// results do not decode into `D`.
    pub fn new(version: ServiceVersion, task: TaskSpec) -> TextAnalyticsResult<Self> {
        require_language(version)?;
        let kind = task.kind();
        if !D::KINDS.contains(&kind) {
            return Err(TextAnalyticsError::Builder(format!(
                "{kind} results do not decode into {}",
                std::any::type_name::<D>()
            )));
        }
        kind.check_version(version)?;

        Ok(Self {
            version,
            task,
            _document: PhantomData,
        })
    }

    pub fn task(&self) -> &TaskSpec {
        &self.task
    }
}

impl<D: TaskDocumentKind> LroAdapter for SingleTaskAdapter<D> {
    type Body = LanguageJobBody;
    type Item = D;

    fn operation_name(&self) -> &'static str {
        self.task.kind().language_kind()
    }

    fn service_version(&self) -> ServiceVersion {
        self.version
    }

    fn submit_path(&self) -> String {
        format!("{JOBS_PATH}?api-version={}", self.version)
    }

    fn build_submit_request(&self, request: &SubmitRequest) -> TextAnalyticsResult<serde_json::Value> {
        submit_body(request, std::slice::from_ref(&self.task))
    }

    fn status_path(&self, handle: &JobHandle) -> String {
        format!("{JOBS_PATH}/{handle}?api-version={}", self.version)
    }

    fn cancel_call(&self, handle: &JobHandle) -> Option<CancelCall> {
        Some(CancelCall::Post(format!(
            "{JOBS_PATH}/{handle}:cancel?api-version={}",
            self.version
        )))
    }

    fn task_progress(&self, envelope: &JobEnvelope<LanguageJobBody>) -> TaskProgress {
        match &envelope.body.tasks {
            Some(_) => progress(envelope),
            None => TaskProgress::single(&envelope.status),
        }
    }

    fn extract_result_page(
        &self,
        envelope: JobEnvelope<LanguageJobBody>,
    ) -> TextAnalyticsResult<PageContent<D>> {
        let expected = self.task.kind();
        let Some(item) = envelope
            .body
            .tasks
            .and_then(|t| t.items.into_iter().next())
        else {
            return Ok(PageContent {
                statistics: envelope.statistics,
                ..PageContent::default()
            });
        };

        let kind = item.language_kind()?;
        if kind != expected {
            return Err(TextAnalyticsError::InvalidState(format!(
                "expected {} results, service returned {}",
                expected.result_kind(),
                kind.result_kind()
            )));
        }

        let Some(results) = item.results else {
            return Ok(PageContent {
                statistics: envelope.statistics,
                ..PageContent::default()
            });
        };
        let page: DocumentsPage<D> = serde_json::from_value(results)?;

        Ok(PageContent {
            items: page.documents,
            document_errors: page.errors,
            statistics: page.statistics.or(envelope.statistics),
            model_version: page.model_version,
        })
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

pub type AbstractiveSummaryPoller = LroPoller<SingleTaskAdapter<AbstractiveSummaryDocument>>;
pub type ExtractiveSummaryPoller = LroPoller<SingleTaskAdapter<ExtractiveSummaryDocument>>;
pub type CustomEntitiesPoller = LroPoller<SingleTaskAdapter<RecognizeEntitiesDocument>>;
pub type ClassifyPoller = LroPoller<SingleTaskAdapter<ClassifyDocument>>;
pub type HealthcarePoller = LroPoller<SingleTaskAdapter<HealthcareEntitiesDocument>>;

/// Submit a multi-task job.
#[tracing::instrument(
    name = "textanalytics::language::begin_analyze_actions",
    skip(client, request, tasks),
    fields(tasks = tasks.len())
)]
pub async fn begin_analyze_actions(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    tasks: Vec<TaskSpec>,
) -> TextAnalyticsResult<(LroPoller<AnalyzeActionsAdapter>, JobHandle)> {
    let adapter = AnalyzeActionsAdapter::new(client.service_version(), tasks)?;
    crate::start(client, adapter, request).await
}

/// Submit a single-task job whose documents decode into `D`.
#[tracing::instrument(
    name = "textanalytics::language::begin_single_task",
    skip(client, request, task),
    fields(kind = %task.kind())
)]
pub async fn begin_single_task<D: TaskDocumentKind>(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    task: TaskSpec,
) -> TextAnalyticsResult<(LroPoller<SingleTaskAdapter<D>>, JobHandle)> {
    let adapter = SingleTaskAdapter::<D>::new(client.service_version(), task)?;
    crate::start(client, adapter, request).await
}

pub async fn begin_abstractive_summary(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    options: AbstractiveSummaryOptions,
) -> TextAnalyticsResult<(AbstractiveSummaryPoller, JobHandle)> {
    begin_single_task(client, request, TaskAction::AbstractiveSummary(options).into()).await
}

pub async fn begin_extractive_summary(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    options: ExtractiveSummaryOptions,
) -> TextAnalyticsResult<(ExtractiveSummaryPoller, JobHandle)> {
    begin_single_task(client, request, TaskAction::ExtractiveSummary(options).into()).await
}

pub async fn begin_recognize_custom_entities(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    options: CustomOptions,
) -> TextAnalyticsResult<(CustomEntitiesPoller, JobHandle)> {
    begin_single_task(client, request, TaskAction::RecognizeCustomEntities(options).into()).await
}

pub async fn begin_single_label_classify(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    options: CustomOptions,
) -> TextAnalyticsResult<(ClassifyPoller, JobHandle)> {
    begin_single_task(client, request, TaskAction::SingleLabelClassify(options).into()).await
}

pub async fn begin_multi_label_classify(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    options: CustomOptions,
) -> TextAnalyticsResult<(ClassifyPoller, JobHandle)> {
    begin_single_task(client, request, TaskAction::MultiLabelClassify(options).into()).await
}

pub async fn begin_analyze_healthcare_entities(
    client: &TextAnalyticsClient,
    request: &SubmitRequest,
    options: HealthcareOptions,
) -> TextAnalyticsResult<(HealthcarePoller, JobHandle)> {
    begin_single_task(client, request, TaskAction::AnalyzeHealthcareEntities(options).into()).await
}
