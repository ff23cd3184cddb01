use {
    tracing::warn,
    crate::extract::ExtractedComment,
};

/// Blank line between formatted records; also the only place a chunk
/// boundary may fall.
pub const RECORD_SEPARATOR: &str = "\n\n";

/// How to render the report. One parameterized formatter replaces the
/// near-identical script variants this grew out of.
#[derive(Clone, Copy, Debug)]
pub struct ReportStyle {
    /// At most this many records, in the order the extractor produced them.
    pub top: usize,
    /// Decimal places for the score in the header line.
    pub precision: usize,
    /// Show the normalized text column instead of the original one.
    pub use_normalized_text: bool,
}

impl ReportStyle {
    /// Console display: 3 decimals, original text.
    pub fn interactive(top: usize) -> Self {
        Self {
            top,
            precision: 3,
            use_normalized_text: false,
        }
    }

    /// Chat delivery: 2 decimals, original text.
    pub fn chat(top: usize) -> Self {
        Self {
            top,
            precision: 2,
            use_normalized_text: false,
        }
    }
}

/// Render the top records into one text block: per record a header line with
/// the 0-based rank and the fixed-precision score, then the text, then a
/// blank separator line. No re-sorting happens here.
///
/// Comment text is reflowed so blank lines inside a comment collapse to a
/// single newline; the blank-line record separator therefore never occurs
/// inside a record, which is what lets [`chunk_message`] split on it safely.
pub fn format_report(records: &[ExtractedComment], style: ReportStyle) -> String {
    records
        .iter()
        .take(style.top)
        .enumerate()
        .map(|(rank, record)| {
            let text = if style.use_normalized_text {
                &record.normalized_text
            } else {
                &record.original_text
            };
            let header = format!(
                "negative comment #{} score={:.prec$}",
                rank,
                record.score,
                prec = style.precision
            );
            let text = collapse_blank_lines(&text.text);
            if text.is_empty() {
                header
            } else {
                format!("{}\n{}", header, text)
            }
        })
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}

fn collapse_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a formatted report into pieces that fit a transport limit, only
/// ever cutting at the record separators. A single record block that alone
/// exceeds the limit is hard-truncated to exactly `max_chunk_size`
/// characters and logged; that is the worst-case fallback, never an error.
/// Joining the returned chunks with [`RECORD_SEPARATOR`] reproduces the
/// input, modulo that fallback.
pub fn chunk_message(text: &str, max_chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    let separator_chars = RECORD_SEPARATOR.chars().count();

    for block in text.split(RECORD_SEPARATOR) {
        let mut block_chars = block.chars().count();
        let block = if block_chars > max_chunk_size {
            warn!(
                "record of {} chars exceeds transport limit of {}, hard-truncating",
                block_chars, max_chunk_size
            );
            block_chars = max_chunk_size;
            block.chars().take(max_chunk_size).collect()
        } else {
            block.to_owned()
        };

        if !current.is_empty() && current_chars + separator_chars + block_chars > max_chunk_size {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if !current.is_empty() {
            current.push_str(RECORD_SEPARATOR);
            current_chars += separator_chars;
        }
        current.push_str(&block);
        current_chars += block_chars;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
