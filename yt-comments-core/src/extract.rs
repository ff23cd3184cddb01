use {
    serde::Serialize,
    crate::{
        error::{PipelineError, Result},
        models::{SentimentLabel, TruncatedField},
        table::AggregationTable,
    },
};

/// A comment selected for display, with an explicit set of text columns
/// subject to truncation. Output order is most-negative-first.
#[derive(Serialize, Debug, Clone)]
pub struct ExtractedComment {
    pub id: String,
    pub score: f64,
    pub original_text: TruncatedField,
    pub normalized_text: TruncatedField,
}

/// Filter the table down to one sentiment label and sort ascending by score
/// (lower = more negative, so the most negative comments come first). The
/// sort is stable: equal scores keep their fetch order, which keeps output
/// reproducible across runs for identical scorer output.
///
/// An empty selection is a user-facing outcome ("nothing to show"), reported
/// as [`PipelineError::EmptyResult`].
pub fn extract(
    table: &AggregationTable,
    label: SentimentLabel,
    max_len: Option<usize>,
) -> Result<Vec<ExtractedComment>> {
    let mut selected: Vec<_> = table
        .rows()
        .iter()
        .filter(|row| row.label == label)
        .collect();

    if selected.is_empty() {
        return Err(PipelineError::EmptyResult(format!(
            "no comments with label {} to show",
            label
        )));
    }

    selected.sort_by(|a, b| a.score.total_cmp(&b.score));

    Ok(selected
        .into_iter()
        .map(|row| ExtractedComment {
            id: row.id.clone(),
            score: row.score,
            original_text: TruncatedField::new(&row.original_text, max_len),
            normalized_text: TruncatedField::new(&row.normalized_text, max_len),
        })
        .collect())
}

/// The common case: most negative comments first.
pub fn extract_negative(
    table: &AggregationTable,
    max_len: Option<usize>,
) -> Result<Vec<ExtractedComment>> {
    extract(table, SentimentLabel::Negative, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoredComment;

    fn row(id: &str, label: SentimentLabel, score: f64) -> ScoredComment {
        ScoredComment {
            id: id.to_owned(),
            author: None,
            published_at: None,
            is_reply: false,
            original_text: format!("original {}", id),
            normalized_text: format!("normalized {}", id),
            label,
            score,
        }
    }

    #[test]
    fn sorts_negatives_ascending_by_score() {
        // the scorer emitted: neg 0.9, pos 0.1, neg 0.3, neutral 0.5, neg 0.6
        let table = AggregationTable::from_rows(vec![
            row("a", SentimentLabel::Negative, 0.9),
            row("b", SentimentLabel::Positive, 0.1),
            row("c", SentimentLabel::Negative, 0.3),
            row("d", SentimentLabel::Neutral, 0.5),
            row("e", SentimentLabel::Negative, 0.6),
        ]);

        let extracted = extract_negative(&table, None).unwrap();
        let scores: Vec<f64> = extracted.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![0.3, 0.6, 0.9]);
        let ids: Vec<&str> = extracted.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "e", "a"]);
    }

    #[test]
    fn equal_scores_keep_fetch_order() {
        let table = AggregationTable::from_rows(vec![
            row("first", SentimentLabel::Negative, -0.5),
            row("second", SentimentLabel::Negative, -0.5),
            row("third", SentimentLabel::Negative, -0.5),
        ]);

        let extracted = extract_negative(&table, None).unwrap();
        let ids: Vec<&str> = extracted.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn no_negative_comments_is_an_empty_result() {
        let table = AggregationTable::from_rows(vec![
            row("a", SentimentLabel::Positive, 0.8),
            row("b", SentimentLabel::Neutral, 0.1),
        ]);

        assert!(matches!(
            extract_negative(&table, None),
            Err(PipelineError::EmptyResult(_))
        ));
    }

    #[test]
    fn truncates_both_text_columns() {
        let mut long = row("a", SentimentLabel::Negative, -0.9);
        long.original_text = "x".repeat(300);
        long.normalized_text = "y".repeat(280);
        let table = AggregationTable::from_rows(vec![long]);

        let extracted = extract_negative(&table, Some(250)).unwrap();
        assert!(extracted[0].original_text.was_truncated);
        assert_eq!(extracted[0].original_text.original_length, 300);
        assert!(extracted[0].normalized_text.was_truncated);
        assert_eq!(extracted[0].normalized_text.original_length, 280);
    }

    #[test]
    fn can_extract_other_labels_too() {
        let table = AggregationTable::from_rows(vec![
            row("a", SentimentLabel::Positive, 0.8),
            row("b", SentimentLabel::Negative, -0.2),
        ]);

        let extracted = extract(&table, SentimentLabel::Positive, None).unwrap();
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].id, "a");
    }
}
