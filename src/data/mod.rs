//! Comment ingestion: loading and normalizing raw comment data

pub mod json;
pub mod normalize;
pub mod parquet;
pub mod records;

pub use normalize::{normalize_records, normalize_threads, NormalizeStats};
pub use records::CommentRecord;
