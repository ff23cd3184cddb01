use {
    std::fmt,
    serde::{Serialize, Deserialize},
    chrono::{DateTime, Utc},
    crate::scorer::Sentiment,
};

/// One unit of user-generated text as retrieved from the source. Immutable
/// once fetched; owned by the pipeline run that fetched it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommentRecord {
    pub id: String,
    pub text: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_reply: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment after normalization and scoring. Label and score always come
/// from one scorer invocation over `normalized_text`.
#[derive(Serialize, Debug, Clone)]
pub struct ScoredComment {
    pub id: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_reply: bool,
    pub original_text: String,
    pub normalized_text: String,
    pub label: SentimentLabel,
    pub score: f64,
}

impl CommentRecord {
    pub fn scored(self, normalized_text: String, sentiment: Sentiment) -> ScoredComment {
        ScoredComment {
            id: self.id,
            author: self.author,
            published_at: self.published_at,
            is_reply: self.is_reply,
            original_text: self.text,
            normalized_text,
            label: sentiment.label,
            score: sentiment.score,
        }
    }
}

pub const TRUNCATION_MARKER: &str = "…";

/// A text column prepared for display: at most `max_len` characters, with a
/// continuation marker appended only when something was actually cut.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TruncatedField {
    pub text: String,
    pub original_length: usize,
    pub was_truncated: bool,
}

impl TruncatedField {
    pub fn new(text: &str, max_len: Option<usize>) -> Self {
        let original_length = text.chars().count();

        match max_len {
            Some(max_len) if original_length > max_len => {
                let mut truncated: String = text.chars().take(max_len).collect();
                truncated.push_str(TRUNCATION_MARKER);
                Self {
                    text: truncated,
                    original_length,
                    was_truncated: true,
                }
            },
            _ => Self {
                text: text.to_owned(),
                original_length,
                was_truncated: false,
            },
        }
    }
}
