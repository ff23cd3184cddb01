/// Placeholder substituted for at-mentions before scoring.
pub const USER_PLACEHOLDER: &str = "@user";

/// Placeholder substituted for links before scoring.
pub const LINK_PLACEHOLDER: &str = "http";

/// Normalize comment text for the scorer: handles and links become fixed
/// placeholders so high-cardinality tokens do not pollute the vocabulary,
/// everything else is kept as-is and rejoined with single spaces.
///
/// Total and deterministic for any input, and idempotent.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|token| {
            if token.starts_with('@') && token.chars().count() > 1 {
                USER_PLACEHOLDER
            } else if token.starts_with("http") {
                LINK_PLACEHOLDER
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
