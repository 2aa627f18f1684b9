use crate::{
    score::ScoreExplanations,
    types::{AggregatedReport, Category, Item, SummaryDocument},
};

/// Format an item, with its relevance when the extractor scored it
pub fn format_item(item: &Item) -> String {
    match item.relevance() {
        Some(relevance) => format!("{} (Relevance: {}/10)", item.text(), relevance),
        None => item.text().to_string(),
    }
}

fn push_list(output: &mut String, heading: &str, items: &[Item]) {
    output.push_str(&format!("### {}\n\n", heading));
    if items.is_empty() {
        output.push_str("None found\n\n");
        return;
    }
    for item in items {
        output.push_str(&format!("• {}\n", format_item(item)));
    }
    output.push('\n');
}

/// Format a validation result as human-readable markdown
pub fn format_summary_readable(
    report: &AggregatedReport,
    document: &SummaryDocument,
    explanations: Option<&ScoreExplanations>,
) -> String {
    let scores = &document.scores;
    let summary = &document.executive_summary;
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", summary.business_idea));
    output.push_str(&format!(
        "**Status:** {} | **Overall:** {}/100 | **Keywords:** {}\n\n",
        summary.validation_status,
        summary.overall_score,
        report.metadata.keywords.join(", ")
    ));

    output.push_str("## Scorecard\n\n");
    let rows = [
        ("Market Pain", scores.market_pain_score, explanations.map(|e| &e.market_pain_score)),
        ("Market Interest", scores.market_interest_score, explanations.map(|e| &e.market_interest_score)),
        ("Competition", scores.competition_score, explanations.map(|e| &e.competition_score)),
        (
            "Keyword Relevance",
            scores.keyword_relevance_score,
            explanations.map(|e| &e.keyword_relevance_score),
        ),
    ];
    for (label, value, why) in rows {
        output.push_str(&format!("• {}: {}/10", label, value));
        if let Some(why) = why {
            output.push_str(&format!(" ({})", why));
        }
        output.push('\n');
    }
    output.push_str(&format!(
        "\n**Overall viability:** {}/100\n\n",
        scores.overall_viability_score
    ));

    output.push_str("## Executive Summary\n\n");
    push_list(&mut output, "Top Pain Points", &summary.top_pain_points);
    push_list(&mut output, "Top Excitement Signals", &summary.top_excitement_signals);
    push_list(&mut output, "Key Competitors", &summary.top_competitors);

    if !summary.key_insights.is_empty() {
        output.push_str("### Key Insights\n\n");
        for insight in &summary.key_insights {
            output.push_str(&format!("• {}\n", insight));
        }
        output.push('\n');
    }

    let red_flags = &report.aggregated_results.red_flags;
    if !red_flags.is_empty() {
        push_list(&mut output, "Red Flags", red_flags);
    }

    output.push_str("## Results by Keyword\n\n");
    for keyword in &report.metadata.keywords {
        output.push_str(&format!("### {}\n\n", keyword));
        let Some(results) = report.keyword_report(keyword) else {
            output.push_str("No results\n\n");
            continue;
        };
        for category in Category::ALL {
            let count = results.items(category).len();
            if count > 0 {
                output.push_str(&format!("• {}: {} items\n", category.label(), count));
            } else {
                output.push_str(&format!("• {}: None found\n", category.label()));
            }
        }
        output.push('\n');
    }

    output.push_str("## Recommendation\n\n");
    output.push_str(&summary.recommendation);
    output.push('\n');

    output
}
