//! Comment ingestion normalizer
//!
//! Turns the platform's paged comment-thread listings into a flat, deduplicated
//! list of [`CommentRecord`]s. Replies carry the id of their thread's top-level
//! comment as `linkage`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::records::CommentRecord;

/// One page of a comment-thread listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadPage {
    #[serde(default)]
    pub items: Vec<CommentThread>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(default)]
    pub id: Option<String>,

    pub snippet: ThreadSnippet,

    #[serde(default)]
    pub replies: Option<ThreadReplies>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSnippet {
    pub top_level_comment: RawComment,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadReplies {
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub snippet: CommentSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    #[serde(default)]
    pub author_display_name: Option<String>,

    #[serde(default)]
    pub text_original: Option<String>,

    #[serde(default)]
    pub published_at: Option<String>,

    /// Usually a number, occasionally a string
    #[serde(default)]
    pub like_count: Option<Value>,
}

/// Counters describing what the normalizer did to its input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeStats {
    pub input_records: usize,
    pub dropped_incomplete: usize,
    pub exact_duplicates: usize,
    pub text_duplicates: usize,
    pub output_records: usize,
}

/// Flatten and normalize comment-thread pages
pub fn normalize_threads(pages: &[CommentThreadPage]) -> (Vec<CommentRecord>, NormalizeStats) {
    let mut raw = Vec::new();

    for thread in pages.iter().flat_map(|page| page.items.iter()) {
        let top = &thread.snippet.top_level_comment;
        let thread_id = thread.id.clone().or_else(|| top.id.clone());

        raw.push(RawRecord::from_comment(thread_id.clone(), top, None));

        if let Some(replies) = &thread.replies {
            for reply in &replies.comments {
                raw.push(RawRecord::from_comment(
                    reply.id.clone(),
                    reply,
                    thread_id.clone(),
                ));
            }
        }
    }

    log::debug!("Flattened {} pages into {} raw comments", pages.len(), raw.len());

    let mut stats = NormalizeStats {
        input_records: raw.len(),
        ..Default::default()
    };

    let records: Vec<CommentRecord> = raw
        .into_iter()
        .filter_map(|r| {
            let record = r.into_record();
            if record.is_none() {
                stats.dropped_incomplete += 1;
            }
            record
        })
        .collect();

    finish(records, stats)
}

/// Normalize records that are already flat, e.g. loaded from a table
pub fn normalize_records(records: Vec<CommentRecord>) -> (Vec<CommentRecord>, NormalizeStats) {
    let mut stats = NormalizeStats {
        input_records: records.len(),
        ..Default::default()
    };

    let records: Vec<CommentRecord> = records
        .into_iter()
        .filter_map(|mut record| {
            record.author = scrub_text(&record.author);
            record.comment_text = scrub_text(&record.comment_text);
            if record.comment_id.is_empty() || record.author.is_empty() {
                stats.dropped_incomplete += 1;
                return None;
            }
            Some(record)
        })
        .collect();

    finish(records, stats)
}

fn finish(
    records: Vec<CommentRecord>,
    mut stats: NormalizeStats,
) -> (Vec<CommentRecord>, NormalizeStats) {
    if stats.dropped_incomplete > 0 {
        log::warn!(
            "Dropped {} comments without an id or author",
            stats.dropped_incomplete
        );
    }

    let before = records.len();
    let records: Vec<CommentRecord> = records.into_iter().unique().collect();
    stats.exact_duplicates = before - records.len();

    let before = records.len();
    let mut records: Vec<CommentRecord> = records
        .into_iter()
        .unique_by(|r| r.comment_text.clone())
        .collect();
    stats.text_duplicates = before - records.len();

    // Most-liked first, unknown like counts last; stable for equal counts
    records.sort_by(|a, b| b.like_count.cmp(&a.like_count));

    stats.output_records = records.len();
    log::info!(
        "Normalized {} comments into {} records ({} exact and {} text duplicates removed)",
        stats.input_records,
        stats.output_records,
        stats.exact_duplicates,
        stats.text_duplicates
    );

    (records, stats)
}

/// Comment fields before validation and coercion
struct RawRecord {
    comment_id: Option<String>,
    author: Option<String>,
    text: Option<String>,
    published_at: Option<String>,
    like_count: Option<Value>,
    linkage: Option<String>,
}

impl RawRecord {
    fn from_comment(id: Option<String>, comment: &RawComment, linkage: Option<String>) -> Self {
        let snippet = &comment.snippet;
        Self {
            comment_id: id,
            author: snippet.author_display_name.clone(),
            text: snippet.text_original.clone(),
            published_at: snippet.published_at.clone(),
            like_count: snippet.like_count.clone(),
            linkage,
        }
    }

    fn into_record(self) -> Option<CommentRecord> {
        let comment_id = self.comment_id.filter(|id| !id.is_empty())?;
        let author = self
            .author
            .map(|a| scrub_text(&a))
            .filter(|a| !a.is_empty())?;

        Some(CommentRecord {
            comment_id,
            author,
            comment_text: self.text.map(|t| scrub_text(&t)).unwrap_or_default(),
            comment_date: self.published_at.as_deref().and_then(parse_timestamp),
            like_count: self.like_count.as_ref().and_then(coerce_like_count),
            linkage: self.linkage,
        })
    }
}

/// Remove everything outside printable ASCII.
///
/// Applied to author names and comment text. Comment ids and linkage are
/// platform-issued ASCII tokens and pass through unchanged, so replies still
/// resolve against the id they were fetched with.
pub fn scrub_text(text: &str) -> String {
    text.chars().filter(|c| (' '..='~').contains(c)).collect()
}

/// Coerce a like count to an integer, `None` when it is not numeric
pub fn coerce_like_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Parse a timestamp into UTC, accepting RFC 3339 and the common table formats
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn page(json: &str) -> CommentThreadPage {
        serde_json::from_str(json).unwrap()
    }

    const PAGE: &str = r#"{
        "nextPageToken": "abc",
        "items": [
            {
                "id": "t1",
                "snippet": {"topLevelComment": {"id": "t1", "snippet": {
                    "authorDisplayName": "Alice", "textOriginal": "first!",
                    "publishedAt": "2024-03-01T10:00:00Z", "likeCount": 3}}},
                "replies": {"comments": [
                    {"id": "t1.r1", "snippet": {"authorDisplayName": "Bob",
                        "textOriginal": "welcome", "publishedAt": "2024-03-01T11:00:00Z",
                        "likeCount": 7}}
                ]}
            },
            {
                "id": "t2",
                "snippet": {"topLevelComment": {"id": "t2", "snippet": {
                    "authorDisplayName": "Carol", "textOriginal": "nice video",
                    "likeCount": "12"}}}
            }
        ]
    }"#;

    #[test]
    fn test_threads_flatten_with_linkage() {
        let (records, stats) = normalize_threads(&[page(PAGE)]);

        assert_eq!(stats.input_records, 3);
        assert_eq!(records.len(), 3);

        let reply = records.iter().find(|r| r.comment_id == "t1.r1").unwrap();
        assert_eq!(reply.author, "Bob");
        assert_eq!(reply.linkage.as_deref(), Some("t1"));

        let top = records.iter().find(|r| r.comment_id == "t1").unwrap();
        assert!(top.linkage.is_none());
        assert_eq!(top.comment_date.unwrap().day(), 1);
    }

    #[test]
    fn test_sorted_by_likes_descending() {
        let (records, _) = normalize_threads(&[page(PAGE)]);
        let likes: Vec<Option<i64>> = records.iter().map(|r| r.like_count).collect();
        assert_eq!(likes, vec![Some(12), Some(7), Some(3)]);
    }

    #[test]
    fn test_missing_likes_sort_last() {
        let records = vec![
            CommentRecord::new("a", "A").with_text("x"),
            CommentRecord::new("b", "B").with_text("y").with_likes(1),
        ];
        let (records, _) = normalize_records(records);
        assert_eq!(records[0].comment_id, "b");
        assert_eq!(records[1].comment_id, "a");
    }

    #[test]
    fn test_duplicates_removed() {
        let records = vec![
            CommentRecord::new("a", "A").with_text("same"),
            CommentRecord::new("a", "A").with_text("same"),
            CommentRecord::new("b", "B").with_text("same"),
            CommentRecord::new("c", "C").with_text("other"),
        ];
        let (records, stats) = normalize_records(records);

        assert_eq!(stats.exact_duplicates, 1);
        assert_eq!(stats.text_duplicates, 1);
        let ids: Vec<&str> = records.iter().map(|r| r.comment_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_incomplete_records_dropped() {
        let json = r#"{"items": [
            {"id": "t1", "snippet": {"topLevelComment": {"snippet": {"textOriginal": "anon"}}}},
            {"id": "t2", "snippet": {"topLevelComment": {"snippet": {"authorDisplayName": "☃"}}}}
        ]}"#;
        let (records, stats) = normalize_threads(&[page(json)]);
        assert!(records.is_empty());
        assert_eq!(stats.dropped_incomplete, 2);
    }

    #[test]
    fn test_scrub_text() {
        assert_eq!(scrub_text("caf\u{e9} ok\n"), "caf ok");
        assert_eq!(scrub_text("plain ~text~"), "plain ~text~");
    }

    #[test]
    fn test_ids_and_linkage_are_not_scrubbed() {
        let records = vec![
            CommentRecord::new("Ugw\u{e9}1", "Ren\u{e9}e").with_text("top"),
            CommentRecord::new("Ugw\u{e9}1.r1", "Bob").with_text("reply").reply_to("Ugw\u{e9}1"),
        ];
        let (records, _) = normalize_records(records);

        let top = records.iter().find(|r| r.author == "Rene").unwrap();
        assert_eq!(top.comment_id, "Ugw\u{e9}1");
        let reply = records.iter().find(|r| r.author == "Bob").unwrap();
        assert_eq!(reply.linkage.as_deref(), Some(top.comment_id.as_str()));
    }

    #[test]
    fn test_coerce_like_count() {
        assert_eq!(coerce_like_count(&serde_json::json!(5)), Some(5));
        assert_eq!(coerce_like_count(&serde_json::json!(5.0)), Some(5));
        assert_eq!(coerce_like_count(&serde_json::json!(" 42 ")), Some(42));
        assert_eq!(coerce_like_count(&serde_json::json!("many")), None);
        assert_eq!(coerce_like_count(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 10:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-01"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
