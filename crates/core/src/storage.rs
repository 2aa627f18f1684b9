use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{Local, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::{
    error::{Result, ValidatorError},
    types::{AggregatedReport, ExtractionRecord, KeywordReport, SummaryDocument},
};

const MAX_COMPONENT_CHARS: usize = 30;
pub const FINAL_REPORT_FILE: &str = "final_report.json";
pub const SUMMARY_FILE: &str = "executive_summary.json";

/// Default root for run directories
pub fn default_runs_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("idea-validator")
        .join("runs")
}

/// Makes a business idea or keyword safe to use as one path component.
pub fn sanitize_component(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();
    let safe: String = kept
        .trim()
        .replace(' ', "_")
        .to_lowercase()
        .chars()
        .take(MAX_COMPONENT_CHARS)
        .collect();
    if safe.is_empty() {
        "untitled".to_string()
    } else {
        safe
    }
}

/// Get the path of the summary document written beside a final report
pub fn summary_path_for(report_path: &Path) -> PathBuf {
    report_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(SUMMARY_FILE)
}

async fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(value)?;
    fs::write(path, &pretty_json).await?;
    debug!(path = %path.display(), "saved");
    Ok(())
}

async fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .map_err(|source| ValidatorError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Load an aggregated report from a persisted file
pub async fn load_report(path: &Path) -> Result<AggregatedReport> {
    AggregatedReport::from_json_str(&read_to_string(path).await?)
}

pub async fn load_summary(path: &Path) -> Result<SummaryDocument> {
    Ok(serde_json::from_str(&read_to_string(path).await?)?)
}

pub async fn save_summary(document: &SummaryDocument, path: &Path) -> Result<()> {
    write_json(document, path).await
}

#[derive(Serialize)]
struct KeywordMetadata<'a> {
    keyword: &'a str,
    timestamp: String,
    sources: &'a [String],
    pages_per_source: u32,
}

/// Checkpoint directory of a single validation run:
///
/// ```text
/// <root>/<idea>/<YYYYmmdd_HHMMSS>[_<n>]/
///     keywords_metadata.json
///     keywords/<nn>_<keyword>/keyword_metadata.json
///     keywords/<nn>_<keyword>/raw/<source>_page<n>.txt
///     keywords/<nn>_<keyword>/analyzed/<source>_page<n>.json
///     keywords/<nn>_<keyword>/reports/keyword_report.json
///     final_report.json
///     executive_summary.json
/// ```
#[derive(Debug, Clone)]
pub struct RunStore {
    run_dir: PathBuf,
}

impl RunStore {
    /// Creates a fresh run directory. Runs started within the same second
    /// get `_2`, `_3`, ... suffixes instead of sharing a directory.
    pub async fn create(root: &Path, business_idea: &str) -> Result<Self> {
        let idea_dir = root.join(sanitize_component(business_idea));
        fs::create_dir_all(&idea_dir).await?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut attempt = 1;
        loop {
            let name = match attempt {
                1 => stamp.clone(),
                n => format!("{stamp}_{n}"),
            };
            let run_dir = idea_dir.join(name);
            match fs::create_dir(&run_dir).await {
                Ok(()) => return Ok(Self { run_dir }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// `keywords/<ordinal>_<keyword>`, where the ordinal is the keyword's
    /// 1-based position in the run. Keywords that sanitize to the same
    /// component still get separate directories.
    pub fn keyword_dir(&self, index: usize, keyword: &str) -> PathBuf {
        self.run_dir
            .join("keywords")
            .join(format!("{:02}_{}", index + 1, sanitize_component(keyword)))
    }

    async fn keyword_subdir(&self, index: usize, keyword: &str, name: &str) -> Result<PathBuf> {
        let dir = self.keyword_dir(index, keyword).join(name);
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    pub async fn save_keywords_metadata(&self, business_idea: &str, keywords: &[String]) -> Result<()> {
        let metadata = serde_json::json!({
            "business_idea": business_idea,
            "timestamp": Utc::now().to_rfc3339(),
            "keywords": keywords,
        });
        write_json(&metadata, &self.run_dir.join("keywords_metadata.json")).await
    }

    pub async fn save_raw_page(
        &self,
        index: usize,
        keyword: &str,
        source: &str,
        page: u32,
        text: &str,
    ) -> Result<()> {
        let dir = self.keyword_subdir(index, keyword, "raw").await?;
        let path = dir.join(format!("{}_page{}.txt", sanitize_component(source), page));
        fs::write(&path, text).await?;
        Ok(())
    }

    pub async fn save_page_analysis(
        &self,
        index: usize,
        keyword: &str,
        source: &str,
        page: u32,
        record: &ExtractionRecord,
    ) -> Result<()> {
        let dir = self.keyword_subdir(index, keyword, "analyzed").await?;
        let path = dir.join(format!("{}_page{}.json", sanitize_component(source), page));
        let logged = serde_json::json!({
            "metadata": {
                "source": source,
                "page": page,
                "keyword": keyword,
                "timestamp": Utc::now().to_rfc3339(),
            },
            "analysis": record,
        });
        write_json(&logged, &path).await
    }

    pub async fn save_keyword_report(
        &self,
        index: usize,
        keyword: &str,
        report: &KeywordReport,
        source_results: &BTreeMap<String, Vec<ExtractionRecord>>,
        sources: &[String],
        pages_per_source: u32,
    ) -> Result<()> {
        let dir = self.keyword_subdir(index, keyword, "reports").await?;
        let metadata = KeywordMetadata {
            keyword,
            timestamp: Utc::now().to_rfc3339(),
            sources,
            pages_per_source,
        };
        write_json(&metadata, &self.keyword_dir(index, keyword).join("keyword_metadata.json")).await?;

        let document = serde_json::json!({
            "metadata": metadata,
            "results": report,
            "source_results": source_results,
        });
        write_json(&document, &dir.join("keyword_report.json")).await
    }

    pub async fn save_final_report(&self, report: &AggregatedReport) -> Result<PathBuf> {
        let path = self.run_dir.join(FINAL_REPORT_FILE);
        write_json(report, &path).await?;
        Ok(path)
    }

    pub async fn save_summary(&self, document: &SummaryDocument) -> Result<PathBuf> {
        let path = self.run_dir.join(SUMMARY_FILE);
        save_summary(document, &path).await?;
        Ok(path)
    }
}
