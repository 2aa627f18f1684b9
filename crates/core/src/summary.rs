use std::cmp::Ordering;

use crate::{
    config::{StatusThresholds, ValidatorConfig},
    types::{AggregatedReport, ExecutiveSummary, Item, ScoreSet, ValidationStatus},
};

const STRONG_SIGNAL: f64 = 7.0;
const WEAK_SIGNAL: f64 = 3.0;

pub fn validation_status(overall: f64, thresholds: &StatusThresholds) -> ValidationStatus {
    if overall >= thresholds.strongly_validated {
        ValidationStatus::StronglyValidated
    } else if overall >= thresholds.validated {
        ValidationStatus::Validated
    } else if overall >= thresholds.partially_validated {
        ValidationStatus::PartiallyValidated
    } else if overall >= thresholds.weakly_validated {
        ValidationStatus::WeaklyValidated
    } else {
        ValidationStatus::NotValidated
    }
}

struct InsightRule {
    positive: &'static str,
    negative: &'static str,
}

const PAIN: InsightRule = InsightRule {
    positive: "Strong pain points identified, indicating a clear market need.",
    negative: "Few significant pain points identified, suggesting limited market need.",
};

const INTEREST: InsightRule = InsightRule {
    positive: "High market interest detected, indicating potential demand.",
    negative: "Low market interest detected, suggesting limited demand.",
};

const COMPETITION: InsightRule = InsightRule {
    positive: "Healthy competitive landscape, indicating a validated market.",
    negative: "Limited competition may indicate an untapped market or lack of market viability.",
};

const KEYWORD_RELEVANCE: InsightRule = InsightRule {
    positive: "Keywords were highly relevant, providing good market insights.",
    negative: "Keywords had limited relevance, suggesting the need for refined market research.",
};

impl InsightRule {
    fn apply(&self, score: f64) -> Option<String> {
        if score >= STRONG_SIGNAL {
            Some(self.positive.to_string())
        } else if score <= WEAK_SIGNAL {
            Some(self.negative.to_string())
        } else {
            None
        }
    }
}

/// Zero to four sentences, in pain, interest, competition, keyword order.
pub fn key_insights(scores: &ScoreSet) -> Vec<String> {
    [
        (&PAIN, scores.market_pain_score),
        (&INTEREST, scores.market_interest_score),
        (&COMPETITION, scores.competition_score),
        (&KEYWORD_RELEVANCE, scores.keyword_relevance_score),
    ]
    .into_iter()
    .filter_map(|(rule, score)| rule.apply(score))
    .collect()
}

/// Items worth presenting: scored items below `min_relevance` are hidden,
/// the rest are ordered by relevance (highest first) ahead of unscored items,
/// which keep their original order.
pub fn top_items(items: &[Item], min_relevance: f64, limit: usize) -> Vec<Item> {
    let mut visible: Vec<&Item> = items
        .iter()
        .filter(|item| item.relevance().is_none_or(|r| r >= min_relevance))
        .collect();
    visible.sort_by(|a, b| match (a.relevance(), b.relevance()) {
        (Some(ra), Some(rb)) => rb.total_cmp(&ra),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    visible.into_iter().take(limit).cloned().collect()
}

pub fn summarize(
    report: &AggregatedReport,
    scores: &ScoreSet,
    config: &ValidatorConfig,
) -> ExecutiveSummary {
    let aggregated = &report.aggregated_results;
    let status = validation_status(scores.overall_viability_score, &config.thresholds);
    let top = |items: &[Item]| top_items(items, config.min_relevance, config.top_n);

    ExecutiveSummary {
        business_idea: report.metadata.business_idea.clone(),
        validation_status: status,
        overall_score: scores.overall_viability_score,
        top_pain_points: top(&aggregated.pain_points),
        top_excitement_signals: top(&aggregated.excitement_signals),
        top_competitors: top(&aggregated.mentions_of_competitors),
        key_insights: key_insights(scores),
        recommendation: status.recommendation().to_string(),
    }
}
