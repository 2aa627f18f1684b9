//! Idea Validator Core Library
//!
//! Scrapes discussion platforms for a business idea's keywords, merges the
//! extracted findings, and turns them into weighted validation scores with an
//! executive summary.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod format;
pub mod keywords;
pub mod llm;
pub mod merge;
pub mod pipeline;
pub mod provider;
pub mod score;
pub mod storage;
pub mod summary;
pub mod types;

// Re-export commonly used items at crate root
pub use aggregate::{RunContext, aggregate};
pub use config::{ScoringWeights, SourceConfig, StatusThresholds, ValidatorConfig, load_config};
pub use error::{Result, ValidatorError};
pub use extract::{Extractor, LlmExtractor};
pub use fetch::{PageFetcher, ScraperApiFetcher};
pub use format::{format_item, format_summary_readable};
pub use keywords::{KeywordGenerator, LlmKeywordGenerator, fallback_keywords};
pub use llm::ChatClient;
pub use merge::merge_records;
pub use pipeline::{Progress, ValidationOutcome, Validator, evaluate, rescore};
pub use provider::{Provider, ProviderConfig};
pub use score::{ScoreExplanations, explain, score};
pub use storage::{RunStore, default_runs_root, load_report, load_summary};
pub use summary::{summarize, validation_status};
pub use types::{
    AggregatedReport, ExecutiveSummary, ExtractionRecord, Item, KeywordReport, RawCounts,
    ReportMetadata, ScoreSet, SummaryDocument, ValidationStatus,
};
