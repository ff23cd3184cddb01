use {
    std::sync::Arc,
    async_trait::async_trait,
    yt_comments_core::{
        error::{PipelineError, ScoringError, SourceError},
        format::{RECORD_SEPARATOR, ReportStyle, format_report},
        models::{CommentRecord, SentimentLabel},
        pipeline::{CancelFlag, PipelineOutput, RunOptions, run},
        scorer::{Sentiment, SentimentScorer},
        youtube::{CommentPage, CommentSource},
    },
};

/// Serves a fixed set of pages; optionally cancels a flag while serving a
/// given page to exercise cooperative cancellation.
struct StubSource {
    pages: Vec<Vec<CommentRecord>>,
    cancel_on_page: Option<(usize, CancelFlag)>,
}

impl StubSource {
    fn new(pages: Vec<Vec<CommentRecord>>) -> Self {
        Self {
            pages,
            cancel_on_page: None,
        }
    }
}

#[async_trait]
impl CommentSource for StubSource {
    async fn fetch_page(
        &self,
        _video_id: &str,
        page_token: Option<&str>,
        _include_replies: bool,
    ) -> Result<CommentPage, SourceError> {
        let index: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);

        if let Some((cancel_page, flag)) = &self.cancel_on_page {
            if index == *cancel_page {
                flag.cancel();
            }
        }

        let comments = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = if index + 1 < self.pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };

        Ok(CommentPage {
            comments,
            next_page_token,
        })
    }
}

/// The comment text itself scripts the verdict: "neg <s>" / "pos <s>" /
/// "fail", anything else is neutral at 0.0.
struct ScriptedScorer;

impl SentimentScorer for ScriptedScorer {
    fn score(&self, text: &str) -> Result<Sentiment, ScoringError> {
        let mut parts = text.split_whitespace();
        match parts.next() {
            Some("neg") => Ok(Sentiment {
                label: SentimentLabel::Negative,
                score: parts.next().unwrap().parse().unwrap(),
            }),
            Some("pos") => Ok(Sentiment {
                label: SentimentLabel::Positive,
                score: parts.next().unwrap().parse().unwrap(),
            }),
            Some("fail") => Err(ScoringError("scripted failure".to_owned())),
            _ => Ok(Sentiment {
                label: SentimentLabel::Neutral,
                score: 0.0,
            }),
        }
    }
}

fn comment(id: &str, text: &str) -> CommentRecord {
    CommentRecord {
        id: id.to_owned(),
        text: text.to_owned(),
        author: None,
        published_at: None,
        is_reply: false,
    }
}

fn options() -> RunOptions {
    RunOptions {
        include_replies: false,
        max_comment_len: Some(250),
        top: 20,
        max_chunk_size: 4096,
    }
}

async fn run_stub(source: StubSource, options: RunOptions) -> Result<PipelineOutput, PipelineError> {
    run(
        &source,
        Arc::new(ScriptedScorer),
        "video-under-test",
        options,
        &CancelFlag::new(),
    )
    .await
}

#[tokio::test]
async fn end_to_end_orders_negatives_most_negative_first() {
    // the five-comment scenario: labels neg/pos/neg/neutral/neg
    let source = StubSource::new(vec![
        vec![
            comment("c0", "neg 0.9"),
            comment("c1", "pos 0.1"),
            comment("c2", "neg 0.3"),
        ],
        vec![comment("c3", "whatever"), comment("c4", "neg 0.6")],
    ]);

    let output = run_stub(source, options()).await.unwrap();

    assert_eq!(output.table.len(), 5);
    assert_eq!(output.table.dropped(), 0);

    let scores: Vec<f64> = output.negatives.iter().map(|n| n.score).collect();
    assert_eq!(scores, vec![0.3, 0.6, 0.9]);

    assert!(output.report.starts_with("negative comment #0 score=0.300\nneg 0.3"));
    assert_eq!(output.chunks.len(), 1);
    assert!(output.chunks[0].contains("score=0.30"));
}

#[tokio::test]
async fn table_preserves_fetch_order_across_pages() {
    let source = StubSource::new(vec![
        vec![comment("a", "neg -0.1"), comment("b", "pos 0.5")],
        vec![comment("c", "plain text")],
        vec![comment("d", "neg -0.9")],
    ]);

    let output = run_stub(source, options()).await.unwrap();
    let ids: Vec<&str> = output.table.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn failing_records_are_dropped_not_fatal() {
    let source = StubSource::new(vec![vec![
        comment("good", "neg -0.4"),
        comment("bad", "fail"),
        comment("alsogood", "neg -0.2"),
    ]]);

    let output = run_stub(source, options()).await.unwrap();
    assert_eq!(output.table.len(), 2);
    assert_eq!(output.table.dropped(), 1);
    assert_eq!(output.negatives.len(), 2);
}

#[tokio::test]
async fn all_records_failing_escalates() {
    let source = StubSource::new(vec![vec![comment("a", "fail"), comment("b", "fail")]]);

    let err = run_stub(source, options()).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::AllRecordsFailedScoring { failed: 2 }
    ));
}

#[tokio::test]
async fn zero_comments_is_an_empty_result() {
    let source = StubSource::new(vec![vec![]]);

    let err = run_stub(source, options()).await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyResult(_)));
}

#[tokio::test]
async fn no_negative_comments_is_an_empty_result() {
    let source = StubSource::new(vec![vec![comment("a", "pos 0.9"), comment("b", "meh")]]);

    let err = run_stub(source, options()).await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyResult(_)));
}

#[tokio::test]
async fn cancellation_between_pages_discards_partial_results() {
    let cancel = CancelFlag::new();
    let mut source = StubSource::new(vec![
        vec![comment("a", "neg -0.5")],
        vec![comment("b", "neg -0.6")],
        vec![comment("c", "neg -0.7")],
    ]);
    source.cancel_on_page = Some((1, cancel.clone()));

    let err = run(
        &source,
        Arc::new(ScriptedScorer),
        "video-under-test",
        options(),
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled));
}

#[tokio::test]
async fn chunked_output_reassembles_into_the_chat_report() {
    // enough verbose negatives to force several chunks at a small limit
    let comments: Vec<CommentRecord> = (0..30)
        .map(|i| {
            comment(
                &format!("c{}", i),
                &format!("neg -0.{:02} padding padding padding padding padding", i + 1),
            )
        })
        .collect();
    let source = StubSource::new(vec![comments]);

    let mut opts = options();
    opts.top = 30;
    opts.max_chunk_size = 200;

    let output = run_stub(source, opts).await.unwrap();

    assert!(output.chunks.len() > 1);
    for chunk in &output.chunks {
        assert!(chunk.chars().count() <= 200);
    }

    // no record was truncated, so rejoining the chunks gives back the
    // exact chat-style report
    let rejoined = output.chunks.join(RECORD_SEPARATOR);
    assert_eq!(
        rejoined,
        format_report(&output.negatives, ReportStyle::chat(30))
    );
}
