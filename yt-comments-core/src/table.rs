use {
    std::{sync::Arc, collections::VecDeque},
    tracing::{info, warn},
    tokio::task::JoinHandle,
    crate::{
        error::{PipelineError, Result},
        models::{CommentRecord, ScoredComment},
        normalize::normalize,
        pipeline::CancelFlag,
        progress::Progress,
        scorer::SentimentScorer,
        youtube::CommentSource,
    },
};

// scoring batches allowed to queue up behind the page fetch loop
const MAX_PAGES_IN_FLIGHT: usize = 4;

/// Ordered collection of scored comments, insertion order = fetch order.
/// Built once per pipeline run and read-only afterwards; filtering and
/// sorting happen on derived collections, never in place.
#[derive(Debug)]
pub struct AggregationTable {
    rows: Vec<ScoredComment>,
    dropped: usize,
}

impl AggregationTable {
    pub fn rows(&self) -> &[ScoredComment] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records dropped because their scoring failed.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<ScoredComment>) -> Self {
        Self { rows, dropped: 0 }
    }
}

/// Fetch all comment pages for a video and score them.
///
/// Pages are consumed incrementally: each fetched page goes to the blocking
/// pool for normalization + batch scoring while the next fetch proceeds, with
/// a bounded number of batches in flight, and results are drained back in
/// fetch order so table order stays deterministic. A record whose scoring
/// fails is dropped with a warning; the run only fails when the source does,
/// when there are no comments at all, or when every record failed scoring.
pub async fn build_table(
    source: &dyn CommentSource,
    scorer: Arc<dyn SentimentScorer>,
    video_id: &str,
    include_replies: bool,
    cancel: &CancelFlag,
) -> Result<AggregationTable> {
    let mut rows = Vec::new();
    let mut fetched = 0usize;
    let mut dropped = 0usize;
    let mut page_token: Option<String> = None;
    let mut page_index = 0u32;
    let mut progress = Progress::new("scoring comments".to_owned());
    let mut score_handles: VecDeque<JoinHandle<(Vec<ScoredComment>, usize)>> = VecDeque::new();

    loop {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let page = source
            .fetch_page(video_id, page_token.as_deref(), include_replies)
            .await?;
        info!("fetched page {} with {} comments", page_index, page.comments.len());
        page_index += 1;
        fetched += page.comments.len();

        if !page.comments.is_empty() {
            let scorer = scorer.clone();
            let comments = page.comments;
            score_handles.push_back(tokio::task::spawn_blocking(move || {
                score_page(scorer, comments)
            }));
        }

        while score_handles.len() >= MAX_PAGES_IN_FLIGHT {
            let (scored, failed) = score_handles.pop_front().unwrap().await?;
            progress.advance((scored.len() + failed) as u64);
            rows.extend(scored);
            dropped += failed;
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    while let Some(handle) = score_handles.pop_front() {
        let (scored, failed) = handle.await?;
        progress.advance((scored.len() + failed) as u64);
        rows.extend(scored);
        dropped += failed;
    }

    if fetched == 0 {
        return Err(PipelineError::EmptyResult("video has no comments".to_owned()));
    }

    if rows.is_empty() {
        return Err(PipelineError::AllRecordsFailedScoring { failed: dropped });
    }

    if dropped > 0 {
        warn!("dropped {} of {} comments due to scoring failures", dropped, fetched);
    }

    Ok(AggregationTable { rows, dropped })
}

fn score_page(
    scorer: Arc<dyn SentimentScorer>,
    comments: Vec<CommentRecord>,
) -> (Vec<ScoredComment>, usize) {
    let normalized: Vec<String> = comments.iter().map(|c| normalize(&c.text)).collect();
    let results = scorer.score_batch(&normalized);

    let mut scored = Vec::with_capacity(comments.len());
    let mut failed = 0;

    for ((comment, normalized_text), result) in comments.into_iter().zip(normalized).zip(results) {
        match result {
            Ok(sentiment) => scored.push(comment.scored(normalized_text, sentiment)),
            Err(err) => {
                warn!("dropping comment {}: {}", comment.id, err);
                failed += 1;
            },
        }
    }

    (scored, failed)
}
