//! Comment interaction graph analysis
//!
//! Builds an author-level reply graph from video comments, ranks authors by
//! centrality, extracts the most connected authors for rendering and detects
//! communities on a bounded sample.

pub mod analyzer;
pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod storage;
pub mod viz;

pub use analyzer::{analyze, analyze_with, AnalysisReport, GraphStats};
pub use config::{AnalysisConfig, ClosenessDirection};
pub use data::CommentRecord;
pub use error::AnalysisError;

pub use anyhow::{anyhow, Result};
