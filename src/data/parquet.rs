//! Parquet file handling for exported comment tables

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::data::normalize::parse_timestamp;
use crate::data::records::CommentRecord;

/// Load a comment table with columns `comment_id`, `author`, `comment_text`,
/// `comment_date`, `like_count` and an optional `linkage`.
///
/// Rows without an id or author are returned with empty fields and are
/// dropped later by the normalizer.
pub fn load_comment_table(path: &str) -> Result<Vec<CommentRecord>> {
    log::info!("Reading parquet file: {}", path);

    if !std::path::Path::new(path).exists() {
        return Err(anyhow::anyhow!("File not found: {}", path));
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?
        .collect()
        .with_context(|| format!("failed to read comment table {}", path))?;

    log::debug!("File schema: {:?}", df.schema());
    log::info!("Loaded {} comment rows", df.height());

    let ids = df.column("comment_id")?.cast(&DataType::String)?;
    let ids = ids.str()?;
    let authors = df.column("author")?.cast(&DataType::String)?;
    let authors = authors.str()?;
    let texts = df.column("comment_text")?.cast(&DataType::String)?;
    let texts = texts.str()?;
    let dates = df.column("comment_date")?.cast(&DataType::String)?;
    let dates = dates.str()?;
    let likes = df.column("like_count")?.cast(&DataType::Int64)?;
    let likes = likes.i64()?;

    // Tables exported before any reply was fetched carry no linkage column
    let linkage = match df.column("linkage") {
        Ok(column) => Some(column.cast(&DataType::String)?),
        Err(_) => {
            log::warn!("No linkage column in {}; no reply edges can be built", path);
            None
        }
    };
    let linkage = linkage.as_ref().map(|c| c.str()).transpose()?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        records.push(CommentRecord {
            comment_id: ids.get(i).unwrap_or_default().to_string(),
            author: authors.get(i).unwrap_or_default().to_string(),
            comment_text: texts.get(i).unwrap_or_default().to_string(),
            comment_date: dates.get(i).and_then(parse_timestamp),
            like_count: likes.get(i),
            linkage: linkage
                .and_then(|col| col.get(i))
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        });
    }

    Ok(records)
}
