use thiserror::Error;

/// Failure of the comment source itself. The core never retries these,
/// the caller decides whether to re-invoke the pipeline.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("comment source unavailable: {0}")]
    Unavailable(String),

    #[error("not a recognizable video url or id: {0}")]
    InvalidVideoUrl(String),
}

/// Per-record scoring failure. Absorbed by the table builder (the record is
/// dropped with a warning); it only escalates when every record in a run
/// fails.
#[derive(Error, Debug, Clone)]
#[error("scoring failed: {0}")]
pub struct ScoringError(pub String);

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Nothing to show. Covers both "the video has no comments" and "no
    /// comments carry the requested label" -- a user-facing outcome, not a
    /// crash.
    #[error("{0}")]
    EmptyResult(String),

    #[error("scoring failed for all {failed} comments in this run")]
    AllRecordsFailedScoring { failed: usize },

    #[error("pipeline run was cancelled")]
    Cancelled,

    #[error("failed to write export: {0}")]
    Export(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("scoring task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
