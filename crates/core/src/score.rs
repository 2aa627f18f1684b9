use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::ScoringWeights,
    types::{AggregatedReport, Item, KeywordReport, RawCounts, ScoreSet},
};

pub const COMPONENT_MAX: f64 = 10.0;
const SQRT_SCALE: f64 = 2.5;

/// Rounds to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `min(10, sqrt(count) * 2.5)`: 1 -> 2.5, 4 -> 5.0, 16 and up -> 10.0.
pub fn diminishing_score(count: usize) -> f64 {
    ((count as f64).sqrt() * SQRT_SCALE).min(COMPONENT_MAX)
}

/// Moderate competition (4-7 competitors) is the strongest signal; none at
/// all and saturation both score lower.
pub fn competition_score(competitors: usize) -> f64 {
    match competitors {
        0 => 3.0,
        1..=3 => 7.0,
        4..=7 => 10.0,
        8..=15 => 8.0,
        _ => 6.0,
    }
}

/// Average findings per keyword, read from each keyword's own report.
pub fn average_findings_per_keyword(report: &AggregatedReport) -> f64 {
    let keywords = &report.metadata.keywords;
    if keywords.is_empty() {
        return 0.0;
    }
    let total: usize = keywords
        .iter()
        .map(|k| report.keyword_report(k).map_or(0, KeywordReport::findings))
        .sum();
    total as f64 / keywords.len() as f64
}

pub fn keyword_relevance_score(report: &AggregatedReport) -> f64 {
    average_findings_per_keyword(report).min(COMPONENT_MAX)
}

/// Computes every component score and the weighted overall score.
///
/// The overall score is taken from the unrounded components; all values are
/// rounded to one decimal at the end.
pub fn score(report: &AggregatedReport, weights: &ScoringWeights) -> ScoreSet {
    let aggregated = &report.aggregated_results;
    let raw_counts = RawCounts {
        pain_points: aggregated.pain_points.len(),
        excitement_signals: aggregated.excitement_signals.len(),
        competitors: aggregated.mentions_of_competitors.len(),
    };

    let pain = diminishing_score(raw_counts.pain_points);
    let interest = diminishing_score(raw_counts.excitement_signals);
    let competition = competition_score(raw_counts.competitors);
    let keyword_relevance = keyword_relevance_score(report);

    let overall = 10.0
        * (pain * weights.pain_points
            + interest * weights.excitement_signals
            + competition * weights.competitors
            + keyword_relevance * weights.keyword_relevance);

    debug!(pain, interest, competition, keyword_relevance, overall, "computed scores");

    ScoreSet {
        market_pain_score: round1(pain),
        market_interest_score: round1(interest),
        competition_score: round1(competition),
        keyword_relevance_score: round1(keyword_relevance),
        overall_viability_score: round1(overall),
        raw_counts,
    }
}

/// One human-readable sentence per score describing what it was based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreExplanations {
    pub market_pain_score: String,
    pub market_interest_score: String,
    pub competition_score: String,
    pub keyword_relevance_score: String,
    pub overall_viability_score: String,
}

fn average_relevance(items: &[Item]) -> Option<f64> {
    let scored: Vec<f64> = items.iter().filter_map(Item::relevance).collect();
    if scored.is_empty() {
        return None;
    }
    Some(scored.iter().sum::<f64>() / scored.len() as f64)
}

fn count_sentence(count: usize, noun: &str, items: &[Item]) -> String {
    match average_relevance(items) {
        Some(avg) => format!("Based on {count} {noun} with average relevance of {avg:.1}/10."),
        None => format!("Based on {count} {noun}."),
    }
}

fn percent(weight: f64) -> String {
    format!("{}%", round1(weight * 100.0))
}

pub fn explain(report: &AggregatedReport, scores: &ScoreSet, weights: &ScoringWeights) -> ScoreExplanations {
    let aggregated = &report.aggregated_results;
    let competitors = scores.raw_counts.competitors;
    let landscape = match competitors {
        0 => "No competitors may mean there is no proven market.",
        1..=3 => "Few competitors suggests an open market.",
        4..=7 => "Moderate competition indicates a validated market.",
        8..=15 => "More competition indicates an established market.",
        _ => "Heavy competition can make market entry challenging.",
    };

    ScoreExplanations {
        market_pain_score: count_sentence(
            scores.raw_counts.pain_points,
            "pain points",
            &aggregated.pain_points,
        ),
        market_interest_score: count_sentence(
            scores.raw_counts.excitement_signals,
            "excitement signals",
            &aggregated.excitement_signals,
        ),
        competition_score: format!("Based on {competitors} competitors mentioned. {landscape}"),
        keyword_relevance_score: format!(
            "Based on average of {:.1} findings per keyword across {} keywords.",
            average_findings_per_keyword(report),
            report.metadata.keywords.len()
        ),
        overall_viability_score: format!(
            "Calculated from weighted component scores: Pain Points ({}), Excitement ({}), Competition ({}), Keyword Relevance ({}).",
            percent(weights.pain_points),
            percent(weights.excitement_signals),
            percent(weights.competitors),
            percent(weights.keyword_relevance),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        aggregate::{RunContext, aggregate},
        types::ExtractionRecord,
    };

    fn items(prefix: &str, n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::plain(format!("{prefix} {i}"))).collect()
    }

    fn keyword_report(pain: usize, excitement: usize, competitors: usize) -> KeywordReport {
        ExtractionRecord {
            pain_points: items("pain", pain),
            excitement_signals: items("excitement", excitement),
            mentions_of_competitors: items("competitor", competitors),
            ..Default::default()
        }
    }

    fn report_of(reports: Vec<(&str, KeywordReport)>) -> AggregatedReport {
        let keywords: Vec<String> = reports.iter().map(|(k, _)| k.to_string()).collect();
        let results: BTreeMap<String, KeywordReport> = reports
            .into_iter()
            .map(|(k, r)| (k.to_string(), r))
            .collect();
        aggregate("idea", &keywords, results, RunContext::default())
    }

    fn scores_of(reports: Vec<(&str, KeywordReport)>) -> ScoreSet {
        score(&report_of(reports), &ScoringWeights::default())
    }

    #[test]
    fn no_pain_points_scores_zero() {
        let scores = scores_of(vec![("a", keyword_report(0, 1, 1))]);
        assert_eq!(scores.market_pain_score, 0.0);
    }

    #[test]
    fn four_pain_points_score_five() {
        let scores = scores_of(vec![("a", keyword_report(4, 0, 0))]);
        assert_eq!(scores.market_pain_score, 5.0);
    }

    #[test]
    fn diminishing_curve_caps_at_ten() {
        assert_eq!(diminishing_score(1), 2.5);
        assert_eq!(diminishing_score(16), 10.0);
        assert_eq!(diminishing_score(25), 10.0);
    }

    #[test]
    fn competition_buckets() {
        assert_eq!(competition_score(0), 3.0);
        assert_eq!(competition_score(1), 7.0);
        assert_eq!(competition_score(3), 7.0);
        assert_eq!(competition_score(4), 10.0);
        assert_eq!(competition_score(5), 10.0);
        assert_eq!(competition_score(7), 10.0);
        assert_eq!(competition_score(8), 8.0);
        assert_eq!(competition_score(15), 8.0);
        assert_eq!(competition_score(16), 6.0);
        assert_eq!(competition_score(20), 6.0);
    }

    #[test]
    fn keyword_relevance_averages_per_keyword_reports() {
        let scores = scores_of(vec![
            ("a", keyword_report(3, 2, 1)),
            ("b", KeywordReport::default()),
        ]);
        assert_eq!(scores.keyword_relevance_score, 3.0);
    }

    #[test]
    fn keyword_relevance_uses_keyword_reports_not_the_global_union() {
        // both keywords found the same two pain points: the union has 2, each keyword has 2
        let shared = keyword_report(2, 0, 0);
        let scores = scores_of(vec![("a", shared.clone()), ("b", shared)]);
        assert_eq!(scores.raw_counts.pain_points, 2);
        assert_eq!(scores.keyword_relevance_score, 2.0);
    }

    #[test]
    fn keyword_relevance_is_capped() {
        let scores = scores_of(vec![("a", keyword_report(9, 9, 9))]);
        assert_eq!(scores.keyword_relevance_score, 10.0);
    }

    #[test]
    fn listed_keyword_without_report_counts_as_zero() {
        let mut report = report_of(vec![("a", keyword_report(4, 0, 0))]);
        report.metadata.keywords.push("missing".to_string());
        let scores = score(&report, &ScoringWeights::default());
        assert_eq!(scores.keyword_relevance_score, 2.0);
    }

    #[test]
    fn empty_report_scores_are_well_formed() {
        let report = aggregate("idea", &[], BTreeMap::new(), RunContext::default());
        let scores = score(&report, &ScoringWeights::default());

        assert_eq!(scores.market_pain_score, 0.0);
        assert_eq!(scores.market_interest_score, 0.0);
        assert_eq!(scores.competition_score, 3.0);
        assert_eq!(scores.keyword_relevance_score, 0.0);
        assert_eq!(scores.overall_viability_score, 6.0);
        assert_eq!(scores.raw_counts, RawCounts::default());
    }

    #[test]
    fn overall_is_weighted_sum_of_components() {
        let scores = scores_of(vec![("a", keyword_report(4, 1, 5))]);
        assert_eq!(scores.market_pain_score, 5.0);
        assert_eq!(scores.market_interest_score, 2.5);
        assert_eq!(scores.competition_score, 10.0);
        assert_eq!(scores.keyword_relevance_score, 10.0);
        assert_eq!(scores.overall_viability_score, 60.0);
    }

    #[test]
    fn overall_uses_unrounded_components() {
        // pain sqrt(3)*2.5 = 4.33, interest sqrt(2)*2.5 = 3.54, two keywords with 6 findings
        let scores = scores_of(vec![
            ("a", keyword_report(3, 2, 1)),
            ("b", KeywordReport::default()),
        ]);
        assert_eq!(scores.market_pain_score, 4.3);
        assert_eq!(scores.market_interest_score, 3.5);
        assert_eq!(scores.competition_score, 7.0);
        assert_eq!(scores.overall_viability_score, 44.3);
    }

    #[test]
    fn maximal_report_scores_one_hundred() {
        let scores = scores_of(vec![("a", keyword_report(16, 16, 5))]);
        assert_eq!(scores.overall_viability_score, 100.0);
    }

    #[test]
    fn pain_score_is_monotonic() {
        let mut previous = 0.0;
        for n in 0..40 {
            let scores = scores_of(vec![("a", keyword_report(n, 0, 0))]);
            assert!(scores.market_pain_score >= previous);
            previous = scores.market_pain_score;
        }
    }

    #[test]
    fn scores_stay_within_bounds() {
        for (p, e, c) in [(0, 0, 0), (1, 2, 3), (7, 30, 12), (50, 50, 50)] {
            let scores = scores_of(vec![("a", keyword_report(p, e, c)), ("b", keyword_report(e, c, p))]);
            for component in [
                scores.market_pain_score,
                scores.market_interest_score,
                scores.competition_score,
                scores.keyword_relevance_score,
            ] {
                assert!((0.0..=10.0).contains(&component));
            }
            assert!((0.0..=100.0).contains(&scores.overall_viability_score));
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let report = report_of(vec![("a", keyword_report(3, 5, 9)), ("b", keyword_report(1, 0, 2))]);
        let weights = ScoringWeights::default();
        assert_eq!(score(&report, &weights), score(&report, &weights));
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round1(4.25), 4.3);
        assert_eq!(round1(4.24), 4.2);
        assert_eq!(round1(79.96), 80.0);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn explanations_mention_counts_and_weights() {
        let mut report = report_of(vec![("a", keyword_report(0, 0, 5))]);
        report.aggregated_results.pain_points = vec![Item::scored("slow", 8.0), Item::scored("costly", 6.0)];
        let weights = ScoringWeights::default();
        let scores = score(&report, &weights);
        let explanations = explain(&report, &scores, &weights);

        assert_eq!(
            explanations.market_pain_score,
            "Based on 2 pain points with average relevance of 7.0/10."
        );
        assert_eq!(explanations.market_interest_score, "Based on 0 excitement signals.");
        assert!(explanations.competition_score.starts_with("Based on 5 competitors"));
        assert!(explanations.overall_viability_score.contains("Pain Points (35%)"));
    }
}
