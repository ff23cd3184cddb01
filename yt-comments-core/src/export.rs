use {
    std::{fs::File, io::Write, path::Path},
    serde::Serialize,
    chrono::{DateTime, Utc},
    crate::{
        error::Result,
        models::ScoredComment,
        table::AggregationTable,
    },
};

// column headers kept compatible with the analyzer's historical res.csv
#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Comment Id")]
    id: &'a str,
    #[serde(rename = "Author")]
    author: Option<&'a str>,
    #[serde(rename = "Published At")]
    published_at: Option<DateTime<Utc>>,
    #[serde(rename = "Is Reply")]
    is_reply: bool,
    #[serde(rename = "Original Comment Text")]
    original_text: &'a str,
    #[serde(rename = "Cleaned Comment Text")]
    normalized_text: &'a str,
    #[serde(rename = "Sentiment")]
    sentiment: &'a str,
    #[serde(rename = "Sentiment Score")]
    score: f64,
}

impl<'a> From<&'a ScoredComment> for ExportRow<'a> {
    fn from(row: &'a ScoredComment) -> Self {
        Self {
            id: &row.id,
            author: row.author.as_deref(),
            published_at: row.published_at,
            is_reply: row.is_reply,
            original_text: &row.original_text,
            normalized_text: &row.normalized_text,
            sentiment: row.label.as_str(),
            score: row.score,
        }
    }
}

/// Write the whole table, one row per scored comment, to a CSV writer.
pub fn write_csv<W: Write>(table: &AggregationTable, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in table.rows() {
        writer.serialize(ExportRow::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(table: &AggregationTable, path: &Path) -> Result<()> {
    write_csv(table, File::create(path)?)
}
