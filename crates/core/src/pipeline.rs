use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::{info, warn};

use crate::{
    aggregate::{RunContext, aggregate},
    config::{SourceConfig, ValidatorConfig},
    error::{Result, ValidatorError},
    extract::Extractor,
    fetch::PageFetcher,
    keywords::{KeywordGenerator, fallback_keywords, normalize_keywords},
    merge::merge_records,
    score::score,
    storage::RunStore,
    summary::summarize,
    types::{AggregatedReport, ExecutiveSummary, ExtractionRecord, KeywordReport, ScoreSet, SummaryDocument},
};

/// Milestones of a run, reported to the caller as they happen.
#[derive(Debug)]
pub enum Progress<'a> {
    KeywordsReady {
        keywords: &'a [String],
        fallback: bool,
    },
    KeywordStarted {
        index: usize,
        total: usize,
        keyword: &'a str,
    },
    PageSkipped {
        keyword: &'a str,
        source: &'a str,
        page: u32,
        reason: String,
    },
    PageAnalyzed {
        keyword: &'a str,
        source: &'a str,
        page: u32,
        findings: usize,
    },
    KeywordFinished {
        keyword: &'a str,
        findings: usize,
    },
    Scored {
        overall: f64,
    },
}

pub struct ValidationOutcome {
    pub report: AggregatedReport,
    pub scores: ScoreSet,
    pub summary: ExecutiveSummary,
    pub run_dir: Option<PathBuf>,
}

impl ValidationOutcome {
    pub fn document(&self) -> SummaryDocument {
        SummaryDocument {
            scores: self.scores.clone(),
            executive_summary: self.summary.clone(),
        }
    }
}

/// Scores a finished report and derives its executive summary.
pub fn evaluate(report: &AggregatedReport, config: &ValidatorConfig) -> SummaryDocument {
    let scores = score(report, &config.scoring);
    let executive_summary = summarize(report, &scores, config);
    SummaryDocument {
        scores,
        executive_summary,
    }
}

/// Checkpoint writes are best-effort: a failed write is logged, never fatal.
fn checkpoint(result: Result<impl Sized>, what: &str) {
    if let Err(e) = result {
        warn!(error = %e, "failed to save {what}");
    }
}

/// Runs keyword generation, scraping, extraction, aggregation and scoring
/// for one business idea. Collaborators are injected so the run has no
/// process-wide state.
pub struct Validator {
    config: ValidatorConfig,
    fetcher: Box<dyn PageFetcher>,
    extractor: Box<dyn Extractor>,
    keyword_generator: Box<dyn KeywordGenerator>,
    runs_root: Option<PathBuf>,
}

impl Validator {
    pub fn new(
        config: ValidatorConfig,
        fetcher: Box<dyn PageFetcher>,
        extractor: Box<dyn Extractor>,
        keyword_generator: Box<dyn KeywordGenerator>,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor,
            keyword_generator,
            runs_root: None,
        }
    }

    /// Persist checkpoints for every run under `root`.
    pub fn with_runs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.runs_root = Some(root.into());
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub async fn run(
        &self,
        business_idea: &str,
        observer: &mut (dyn FnMut(&Progress<'_>) + Send),
    ) -> Result<ValidationOutcome> {
        let idea = business_idea.trim();
        if idea.is_empty() {
            return Err(ValidatorError::invalid_input("business idea is empty"));
        }

        let store = match &self.runs_root {
            Some(root) => Some(RunStore::create(root, idea).await?),
            None => None,
        };

        let (keywords, fallback) = self.keywords_for(idea).await;
        if keywords.is_empty() {
            return Err(ValidatorError::invalid_input(
                "no keywords could be derived from the business idea",
            ));
        }
        info!(count = keywords.len(), fallback, "keywords ready");
        observer(&Progress::KeywordsReady {
            keywords: &keywords,
            fallback,
        });
        if let Some(store) = &store {
            checkpoint(
                store.save_keywords_metadata(idea, &keywords).await,
                "keywords metadata",
            );
        }

        let mut keyword_results: BTreeMap<String, KeywordReport> = BTreeMap::new();
        for (index, keyword) in keywords.iter().enumerate() {
            observer(&Progress::KeywordStarted {
                index,
                total: keywords.len(),
                keyword,
            });
            let report = self.process_keyword(index, keyword, store.as_ref(), observer).await;
            keyword_results.insert(keyword.clone(), report);
        }

        let context = RunContext {
            sources: self.config.source_names(),
            pages_per_source: self.config.pages_per_source,
        };
        let report = aggregate(idea, &keywords, keyword_results, context);
        let SummaryDocument {
            scores,
            executive_summary,
        } = evaluate(&report, &self.config);
        info!(
            overall = scores.overall_viability_score,
            status = %executive_summary.validation_status,
            "validation finished"
        );
        observer(&Progress::Scored {
            overall: scores.overall_viability_score,
        });

        let outcome = ValidationOutcome {
            report,
            scores,
            summary: executive_summary,
            run_dir: store.as_ref().map(|s| s.run_dir().to_path_buf()),
        };
        if let Some(store) = &store {
            checkpoint(store.save_final_report(&outcome.report).await, "final report");
            checkpoint(store.save_summary(&outcome.document()).await, "executive summary");
        }
        Ok(outcome)
    }

    async fn keywords_for(&self, idea: &str) -> (Vec<String>, bool) {
        let count = self.config.num_keywords;
        match self.keyword_generator.generate(idea, count).await {
            Ok(keywords) => {
                let keywords = normalize_keywords(keywords);
                if !keywords.is_empty() {
                    return (keywords, false);
                }
                warn!("keyword generator returned nothing, using fallback keywords");
                (fallback_keywords(idea, count), true)
            }
            Err(e) => {
                warn!(error = %e, "keyword generation failed, using fallback keywords");
                (fallback_keywords(idea, count), true)
            }
        }
    }

    /// Scrapes every configured source page by page for one keyword and
    /// merges whatever was extracted. Failed pages are skipped and failed
    /// extractions count as empty records.
    async fn process_keyword(
        &self,
        index: usize,
        keyword: &str,
        store: Option<&RunStore>,
        observer: &mut (dyn FnMut(&Progress<'_>) + Send),
    ) -> KeywordReport {
        let mut pages: Vec<ExtractionRecord> = Vec::new();
        let mut source_results: BTreeMap<String, Vec<ExtractionRecord>> = BTreeMap::new();

        for source in &self.config.sources {
            for page in 1..=self.config.pages_per_source {
                let Some(record) = self.process_page(index, keyword, source, page, store, observer).await
                else {
                    continue;
                };
                source_results
                    .entry(source.name.clone())
                    .or_default()
                    .push(record.clone());
                pages.push(record);
                self.pause().await;
            }
        }

        let report = merge_records(&pages);
        info!(keyword, pages = pages.len(), findings = report.findings(), "keyword processed");
        if let Some(store) = store {
            checkpoint(
                store
                    .save_keyword_report(
                        index,
                        keyword,
                        &report,
                        &source_results,
                        &self.config.source_names(),
                        self.config.pages_per_source,
                    )
                    .await,
                "keyword report",
            );
        }
        observer(&Progress::KeywordFinished {
            keyword,
            findings: report.findings(),
        });
        report
    }

    async fn process_page(
        &self,
        index: usize,
        keyword: &str,
        source: &SourceConfig,
        page: u32,
        store: Option<&RunStore>,
        observer: &mut (dyn FnMut(&Progress<'_>) + Send),
    ) -> Option<ExtractionRecord> {
        let url = source.search_url(keyword, page);
        let skip = |reason: String| Progress::PageSkipped {
            keyword,
            source: &source.name,
            page,
            reason,
        };

        let text = match self.fetcher.fetch(&url).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                observer(&skip("empty page".to_string()));
                return None;
            }
            Err(e) => {
                info!(error = %e, url = %url, "page fetch failed");
                observer(&skip(e.to_string()));
                return None;
            }
        };
        if let Some(store) = store {
            checkpoint(
                store.save_raw_page(index, keyword, &source.name, page, &text).await,
                "raw page",
            );
        }

        let record = match self.extractor.extract(&text, keyword).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, keyword, source = %source.name, page, "extraction failed, using empty record");
                ExtractionRecord::default()
            }
        };
        if let Some(store) = store {
            checkpoint(
                store
                    .save_page_analysis(index, keyword, &source.name, page, &record)
                    .await,
                "page analysis",
            );
        }
        observer(&Progress::PageAnalyzed {
            keyword,
            source: &source.name,
            page,
            findings: record.findings(),
        });
        Some(record)
    }

    async fn pause(&self) {
        if self.config.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }
    }
}

/// Re-scores a persisted final report with the given configuration.
pub async fn rescore(report_path: &Path, config: &ValidatorConfig) -> Result<(AggregatedReport, SummaryDocument)> {
    let report = crate::storage::load_report(report_path).await?;
    let document = evaluate(&report, config);
    Ok((report, document))
}
