use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;

use crate::{
    merge::merge_records,
    types::{AggregatedReport, KeywordReport, ReportMetadata},
};

/// Run-level context recorded alongside the aggregated findings.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub sources: Vec<String>,
    pub pages_per_source: u32,
}

/// Unions the per-keyword reports into one deduplicated report.
///
/// Keywords are visited in the order given, then any report keyed by a
/// keyword missing from `keywords` (in key order), so the union is
/// deterministic. `keyword_results` is stored as supplied.
pub fn aggregate(
    business_idea: &str,
    keywords: &[String],
    keyword_results: BTreeMap<String, KeywordReport>,
    context: RunContext,
) -> AggregatedReport {
    let listed = keywords.iter().filter_map(|k| keyword_results.get(k));
    let unlisted = keyword_results
        .iter()
        .filter(|(k, _)| !keywords.contains(k))
        .map(|(_, r)| r);

    let aggregated_results = merge_records(listed.chain(unlisted));

    debug!(
        keywords = keywords.len(),
        reports = keyword_results.len(),
        pain_points = aggregated_results.pain_points.len(),
        "aggregated keyword reports"
    );

    AggregatedReport {
        metadata: ReportMetadata {
            business_idea: business_idea.to_string(),
            keywords: keywords.to_vec(),
            timestamp: Utc::now(),
            sources: context.sources,
            pages_per_source: context.pages_per_source,
        },
        aggregated_results,
        keyword_results,
    }
}
