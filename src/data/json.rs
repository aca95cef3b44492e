//! JSON inputs: raw comment-thread pages and pre-normalized record lists

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::normalize::CommentThreadPage;
use crate::data::records::CommentRecord;

#[derive(Deserialize)]
#[serde(untagged)]
enum PageFile {
    Many(Vec<CommentThreadPage>),
    One(CommentThreadPage),
}

/// Load comment-thread pages; the file holds either one page or an array of pages
pub fn load_threads_json<P: AsRef<Path>>(path: P) -> Result<Vec<CommentThreadPage>> {
    let path = path.as_ref();
    log::info!("Reading comment threads: {}", path.display());

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let pages: PageFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse comment threads in {}", path.display()))?;

    let pages = match pages {
        PageFile::Many(pages) => pages,
        PageFile::One(page) => vec![page],
    };
    log::info!("Loaded {} comment-thread pages", pages.len());

    Ok(pages)
}

/// Load a JSON array of comment records
pub fn load_records_json<P: AsRef<Path>>(path: P) -> Result<Vec<CommentRecord>> {
    let path = path.as_ref();
    log::info!("Reading comment records: {}", path.display());

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let records: Vec<CommentRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse comment records in {}", path.display()))?;

    log::info!("Loaded {} comment records", records.len());
    Ok(records)
}
