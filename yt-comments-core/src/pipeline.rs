use {
    std::{
        fmt,
        sync::{Arc, atomic::{AtomicBool, Ordering}},
    },
    tracing::{info, error},
    crate::{
        error::{PipelineError, Result},
        extract::{ExtractedComment, extract_negative},
        format::{ReportStyle, chunk_message, format_report},
        scorer::SentimentScorer,
        table::{AggregationTable, build_table},
        youtube::CommentSource,
    },
};

/// Cooperative cancellation handle, checked between pages and between
/// scoring batches, never mid-record. On cancellation the partially built
/// results are discarded.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
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

/// Stages of one pipeline run. A run moves strictly forward and never
/// re-enters a stage; retries happen by re-invoking [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Fetching,
    Scoring,
    Extracting,
    Formatting,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Scoring => "scoring",
            Self::Extracting => "extracting",
            Self::Formatting => "formatting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub include_replies: bool,
    /// Per-comment display truncation; `None` shows full text.
    pub max_comment_len: Option<usize>,
    /// Records in the rendered report.
    pub top: usize,
    /// Transport limit applied when chunking the chat report.
    pub max_chunk_size: usize,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub table: AggregationTable,
    pub negatives: Vec<ExtractedComment>,
    /// Interactive report (3-decimal scores).
    pub report: String,
    /// Chat report (2-decimal scores) split to fit the transport limit.
    pub chunks: Vec<String>,
}

/// One full pipeline pass: fetch + score into the aggregation table, extract
/// the negative comments, render both report flavors. Collaborators are
/// injected per run; there is no shared state between runs.
pub async fn run(
    source: &dyn CommentSource,
    scorer: Arc<dyn SentimentScorer>,
    video_id: &str,
    options: RunOptions,
    cancel: &CancelFlag,
) -> Result<PipelineOutput> {
    match run_stages(source, scorer, video_id, options, cancel).await {
        Ok(output) => {
            info!("pipeline {}: {} comments in table, {} negative", PipelineStage::Done, output.table.len(), output.negatives.len());
            Ok(output)
        },
        Err(err) => {
            error!("pipeline {}: {}", PipelineStage::Failed, err);
            Err(err)
        },
    }
}

async fn run_stages(
    source: &dyn CommentSource,
    scorer: Arc<dyn SentimentScorer>,
    video_id: &str,
    options: RunOptions,
    cancel: &CancelFlag,
) -> Result<PipelineOutput> {
    info!("pipeline {} comments for video {}", PipelineStage::Fetching, video_id);
    let table = build_table(source, scorer, video_id, options.include_replies, cancel).await?;
    info!("pipeline {}: {} comments scored, {} dropped", PipelineStage::Scoring, table.len(), table.dropped());

    info!("pipeline {} negative comments", PipelineStage::Extracting);
    let negatives = extract_negative(&table, options.max_comment_len)?;

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    info!("pipeline {} report", PipelineStage::Formatting);
    let report = format_report(&negatives, ReportStyle::interactive(options.top));
    let chat_report = format_report(&negatives, ReportStyle::chat(options.top));
    let chunks = chunk_message(&chat_report, options.max_chunk_size);

    Ok(PipelineOutput {
        table,
        negatives,
        report,
        chunks,
    })
}
