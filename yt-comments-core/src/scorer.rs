use {
    std::collections::HashSet,
    once_cell::sync::Lazy,
    crate::{
        error::ScoringError,
        models::SentimentLabel,
    },
};

#[cfg(feature = "bert")]
use {
    std::sync::Mutex,
    rust_bert::pipelines::sentiment::{SentimentModel, SentimentPolarity},
};

/// Label and score produced together by one scorer invocation.
#[derive(Debug, Clone, Copy)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

/// Black-box sentiment classifier boundary.
///
/// Score convention: implementations must emit a signed polarity in
/// [-1.0, 1.0] where lower = more negative (a negative label carries its
/// confidence negated). The pipeline sorts ascending on this value to put
/// the most negative comments first, so the convention is load-bearing.
///
/// Implementations must be safe to call from multiple threads; they hold no
/// per-call mutable state visible to callers.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<Sentiment, ScoringError>;

    /// Score a batch of texts, one result per input, in input order.
    /// Implementations backed by batching models should override this.
    fn score_batch(&self, texts: &[String]) -> Vec<Result<Sentiment, ScoringError>> {
        texts.iter().map(|text| self.score(text)).collect()
    }
}

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "good", "great", "excellent", "wonderful", "fantastic", "amazing", "awesome",
        "love", "loved", "happy", "joy", "pleased", "delighted", "satisfied", "perfect",
        "beautiful", "brilliant", "outstanding", "superb", "best", "better", "win",
        "enjoy", "enjoyed", "pleasant", "excited", "exciting", "thrilled", "thanks",
        "thank", "helpful", "like", "liked", "favorite", "nice", "cool", "fun",
        "impressive", "underrated", "masterpiece", "legend", "legendary", "banger",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "angry", "sad", "upset", "disappointed", "disappointing", "unhappy",
        "fail", "failure", "failed", "problem", "wrong", "broken", "pain", "painful",
        "hurt", "disaster", "loss", "lose", "losing", "lost", "dislike", "disliked",
        "unpleasant", "boring", "bored", "annoying", "annoyed", "cringe", "trash",
        "garbage", "stupid", "dumb", "useless", "overrated", "scam", "clickbait",
        "unsubscribe", "waste", "wasted", "mid",
    ]
    .into_iter()
    .collect()
});

/// Dictionary-based scorer used when no transformer model is available
/// (building with the `bert` feature swaps in [`BertSentimentScorer`]).
/// Scores are word-hit tallies normalized by token count, clamped to
/// [-1.0, 1.0].
pub struct LexiconScorer {
    neutral_threshold: f64,
}

impl LexiconScorer {
    pub fn new(neutral_threshold: f64) -> Self {
        Self { neutral_threshold }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<Sentiment, ScoringError> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            return Ok(Sentiment {
                label: SentimentLabel::Neutral,
                score: 0.0,
            });
        }

        let mut tally = 0i64;
        for token in &tokens {
            if POSITIVE_WORDS.contains(token) {
                tally += 1;
            } else if NEGATIVE_WORDS.contains(token) {
                tally -= 1;
            }
        }

        let score = ((tally as f64) / (tokens.len() as f64)).clamp(-1.0, 1.0);
        let label = if score <= -self.neutral_threshold {
            SentimentLabel::Negative
        } else if score >= self.neutral_threshold {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Neutral
        };

        Ok(Sentiment { label, score })
    }
}

/// Map a binary model's confidence-of-predicted-polarity onto the signed
/// convention documented on [`SentimentScorer`]. Confidence below
/// `neutral_threshold` maps to `Neutral` with a residual that starts at zero
/// for a maximally uncertain prediction (confidence 0.5) and grows toward
/// the polarity as confidence approaches the threshold.
pub fn signed_from_confidence(negative: bool, confidence: f64, neutral_threshold: f64) -> Sentiment {
    let (label, magnitude) = if confidence < neutral_threshold {
        (SentimentLabel::Neutral, (confidence - 0.5).max(0.0))
    } else if negative {
        (SentimentLabel::Negative, confidence)
    } else {
        (SentimentLabel::Positive, confidence)
    };

    Sentiment {
        label,
        score: if negative { -magnitude } else { magnitude },
    }
}

/// rust-bert SST-2 sentiment model behind the trait boundary.
///
/// The underlying tch model is not `Sync`, hence the mutex; prediction is
/// batched per page so the lock is coarse anyway. The model reports
/// confidence-of-predicted-polarity, mapped through
/// [`signed_from_confidence`].
#[cfg(feature = "bert")]
pub struct BertSentimentScorer {
    model: Mutex<SentimentModel>,
    neutral_threshold: f64,
}

#[cfg(feature = "bert")]
impl BertSentimentScorer {
    pub const DEFAULT_NEUTRAL_THRESHOLD: f64 = 0.7;

    /// Model download and weight loading block for a while, so construction
    /// happens on the blocking pool.
    pub async fn new(neutral_threshold: f64) -> Result<Self, ScoringError> {
        let model = tokio::task::spawn_blocking(|| SentimentModel::new(Default::default()))
            .await
            .map_err(|err| ScoringError(format!("model setup task failed: {}", err)))?
            .map_err(|err| ScoringError(format!("failed to load sentiment model: {}", err)))?;

        Ok(Self {
            model: Mutex::new(model),
            neutral_threshold,
        })
    }

    fn into_sentiment(&self, polarity: SentimentPolarity, confidence: f64) -> Sentiment {
        let negative = matches!(polarity, SentimentPolarity::Negative);
        signed_from_confidence(negative, confidence, self.neutral_threshold)
    }
}

#[cfg(feature = "bert")]
impl SentimentScorer for BertSentimentScorer {
    fn score(&self, text: &str) -> Result<Sentiment, ScoringError> {
        self.score_batch(&[text.to_owned()]).remove(0)
    }

    fn score_batch(&self, texts: &[String]) -> Vec<Result<Sentiment, ScoringError>> {
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let predictions = match self.model.lock() {
            Ok(model) => model.predict(&inputs),
            Err(poisoned) => {
                let err = ScoringError(format!("sentiment model lock poisoned: {}", poisoned));
                return texts.iter().map(|_| Err(err.clone())).collect();
            },
        };

        predictions
            .into_iter()
            .map(|prediction| Ok(self.into_sentiment(prediction.polarity, prediction.score)))
            .collect()
    }
}
