use std::{
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeStruct};
use serde_json::Value;

use crate::error::{Result, ValidatorError};

pub const MAX_RELEVANCE: f64 = 10.0;

/// A single finding reported by the extractor.
///
/// Extractors emit either bare strings or `{text, relevance}` objects. Anything
/// that still carries a display string is kept as `PlainText` (unscored).
#[derive(Debug, Clone)]
pub enum Item {
    PlainText(String),
    ScoredText { text: String, relevance: f64 },
}

impl Item {
    pub fn plain(text: impl Into<String>) -> Self {
        Item::PlainText(text.into())
    }

    /// Builds a scored item. Non-finite relevance yields an unscored item,
    /// finite values are clamped into `[0, 10]`.
    pub fn scored(text: impl Into<String>, relevance: f64) -> Self {
        match normalize_relevance(relevance) {
            Some(relevance) => Item::ScoredText {
                text: text.into(),
                relevance,
            },
            None => Item::PlainText(text.into()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Item::PlainText(text) => text,
            Item::ScoredText { text, .. } => text,
        }
    }

    pub fn relevance(&self) -> Option<f64> {
        match self {
            Item::PlainText(_) => None,
            Item::ScoredText { relevance, .. } => Some(*relevance),
        }
    }

    /// Interprets an arbitrary JSON value as an item. Returns `None` when no
    /// display string can be recovered.
    pub fn from_value(value: Value) -> Option<Item> {
        match value {
            Value::String(text) => Some(Item::PlainText(text)),
            Value::Number(n) => Some(Item::PlainText(n.to_string())),
            Value::Bool(b) => Some(Item::PlainText(b.to_string())),
            Value::Object(mut map) => {
                let text = match map.remove("text") {
                    Some(Value::String(text)) => text,
                    _ => return None,
                };
                match map.get("relevance").and_then(Value::as_f64) {
                    Some(relevance) => Some(Item::scored(text, relevance)),
                    None => Some(Item::PlainText(text)),
                }
            }
            Value::Null | Value::Array(_) => None,
        }
    }
}

fn normalize_relevance(relevance: f64) -> Option<f64> {
    if !relevance.is_finite() {
        return None;
    }
    // `+ 0.0` folds -0.0 into 0.0 so equal values hash equally
    Some(relevance.clamp(0.0, MAX_RELEVANCE) + 0.0)
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Item::PlainText(a), Item::PlainText(b)) => a == b,
            (
                Item::ScoredText {
                    text: a,
                    relevance: ra,
                },
                Item::ScoredText {
                    text: b,
                    relevance: rb,
                },
            ) => a == b && ra.to_bits() == rb.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Item::PlainText(text) => {
                0u8.hash(state);
                text.hash(state);
            }
            Item::ScoredText { text, relevance } => {
                1u8.hash(state);
                text.hash(state);
                relevance.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        Item::PlainText(text.to_string())
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Item::PlainText(text) => serializer.serialize_str(text),
            Item::ScoredText { text, relevance } => {
                let mut state = serializer.serialize_struct("Item", 2)?;
                state.serialize_field("text", text)?;
                state.serialize_field("relevance", relevance)?;
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Item::from_value(value).ok_or_else(|| {
            serde::de::Error::custom("expected a string or an object with a `text` field")
        })
    }
}

/// Lenient list reader: `null` is empty, a lone value is a one-element list,
/// and entries without a display string are skipped.
fn deserialize_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<Item>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(values) => values.into_iter().filter_map(Item::from_value).collect(),
        other => Item::from_value(other).into_iter().collect(),
    };
    Ok(items)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    PainPoints,
    ExcitementSignals,
    Competitors,
    NotableQuotes,
    RedFlags,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::PainPoints,
        Category::ExcitementSignals,
        Category::Competitors,
        Category::NotableQuotes,
        Category::RedFlags,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::PainPoints => "Pain Points",
            Category::ExcitementSignals => "Excitement Signals",
            Category::Competitors => "Mentions of Competitors",
            Category::NotableQuotes => "Notable Quotes",
            Category::RedFlags => "Red Flags",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(default, deserialize_with = "deserialize_items")]
    pub pain_points: Vec<Item>,
    #[serde(default, deserialize_with = "deserialize_items")]
    pub excitement_signals: Vec<Item>,
    #[serde(default, deserialize_with = "deserialize_items")]
    pub mentions_of_competitors: Vec<Item>,
    #[serde(default, deserialize_with = "deserialize_items")]
    pub notable_quotes: Vec<Item>,
    #[serde(
        default,
        deserialize_with = "deserialize_items",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub red_flags: Vec<Item>,
}

impl ExtractionRecord {
    pub fn items(&self, category: Category) -> &[Item] {
        match category {
            Category::PainPoints => &self.pain_points,
            Category::ExcitementSignals => &self.excitement_signals,
            Category::Competitors => &self.mentions_of_competitors,
            Category::NotableQuotes => &self.notable_quotes,
            Category::RedFlags => &self.red_flags,
        }
    }

    pub fn items_mut(&mut self, category: Category) -> &mut Vec<Item> {
        match category {
            Category::PainPoints => &mut self.pain_points,
            Category::ExcitementSignals => &mut self.excitement_signals,
            Category::Competitors => &mut self.mentions_of_competitors,
            Category::NotableQuotes => &mut self.notable_quotes,
            Category::RedFlags => &mut self.red_flags,
        }
    }

    /// Pain points + excitement signals + competitor mentions. Quotes and red
    /// flags never count as findings.
    pub fn findings(&self) -> usize {
        self.pain_points.len() + self.excitement_signals.len() + self.mentions_of_competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.items(*c).is_empty())
    }
}

pub type KeywordReport = ExtractionRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default)]
    pub business_idea: String,
    pub keywords: Vec<String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub pages_per_source: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReport {
    pub metadata: ReportMetadata,
    #[serde(default)]
    pub aggregated_results: ExtractionRecord,
    #[serde(default)]
    pub keyword_results: BTreeMap<String, KeywordReport>,
}

impl AggregatedReport {
    /// Parses a persisted report. A report without a keyword list cannot be
    /// scored, so that case is rejected up front.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let has_keywords = value
            .get("metadata")
            .and_then(|m| m.get("keywords"))
            .is_some_and(Value::is_array);
        if !has_keywords {
            return Err(ValidatorError::invalid_input(
                "report has no metadata.keywords list",
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn keyword_report(&self, keyword: &str) -> Option<&KeywordReport> {
        self.keyword_results.get(keyword)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCounts {
    pub pain_points: usize,
    pub excitement_signals: usize,
    pub competitors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub market_pain_score: f64,
    pub market_interest_score: f64,
    pub competition_score: f64,
    pub keyword_relevance_score: f64,
    pub overall_viability_score: f64,
    pub raw_counts: RawCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationStatus {
    #[serde(rename = "Strongly Validated")]
    StronglyValidated,
    #[serde(rename = "Validated")]
    Validated,
    #[serde(rename = "Partially Validated")]
    PartiallyValidated,
    #[serde(rename = "Weakly Validated")]
    WeaklyValidated,
    #[serde(rename = "Not Validated")]
    NotValidated,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::StronglyValidated => "Strongly Validated",
            ValidationStatus::Validated => "Validated",
            ValidationStatus::PartiallyValidated => "Partially Validated",
            ValidationStatus::WeaklyValidated => "Weakly Validated",
            ValidationStatus::NotValidated => "Not Validated",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            ValidationStatus::StronglyValidated => {
                "This business idea shows strong market validation. Consider proceeding with development and creating an MVP."
            }
            ValidationStatus::Validated => {
                "This business idea shows good market validation. Consider proceeding with caution, focusing on the identified pain points."
            }
            ValidationStatus::PartiallyValidated => {
                "This business idea shows moderate market validation. Consider refining the concept based on the identified pain points and excitement signals."
            }
            ValidationStatus::WeaklyValidated => {
                "This business idea shows weak market validation. Consider pivoting or significantly refining the concept before proceeding."
            }
            ValidationStatus::NotValidated => {
                "This business idea lacks sufficient market validation. Consider exploring alternative ideas or completely rethinking the approach."
            }
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub business_idea: String,
    pub validation_status: ValidationStatus,
    pub overall_score: f64,
    pub top_pain_points: Vec<Item>,
    pub top_excitement_signals: Vec<Item>,
    pub top_competitors: Vec<Item>,
    pub key_insights: Vec<String>,
    pub recommendation: String,
}

/// The persisted output of a run: `{scores, executive_summary}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub scores: ScoreSet,
    pub executive_summary: ExecutiveSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_shapes_deserialize_leniently() {
        let record: ExtractionRecord = serde_json::from_value(json!({
            "pain_points": [
                "slow onboarding",
                {"text": "pricing is opaque", "relevance": 8},
                {"text": "no relevance here"},
                {"text": "bad relevance", "relevance": "high"},
                {"relevance": 4},
                null,
                42
            ],
            "excitement_signals": null,
            "notable_quotes": "a lone quote"
        }))
        .unwrap();

        assert_eq!(
            record.pain_points,
            vec![
                Item::plain("slow onboarding"),
                Item::scored("pricing is opaque", 8.0),
                Item::plain("no relevance here"),
                Item::plain("bad relevance"),
                Item::plain("42"),
            ]
        );
        assert!(record.excitement_signals.is_empty());
        assert!(record.mentions_of_competitors.is_empty());
        assert_eq!(record.notable_quotes, vec![Item::plain("a lone quote")]);
    }

    #[test]
    fn relevance_is_clamped_and_non_finite_is_unscored() {
        assert_eq!(Item::scored("a", 14.0).relevance(), Some(10.0));
        assert_eq!(Item::scored("a", -3.0).relevance(), Some(0.0));
        assert_eq!(Item::scored("a", f64::NAN), Item::plain("a"));
    }

    #[test]
    fn equality_is_exact_value() {
        assert_eq!(Item::scored("x", 7.0), Item::scored("x", 7.0));
        assert_ne!(Item::scored("x", 7.0), Item::scored("x", 6.0));
        assert_ne!(Item::scored("x", 7.0), Item::plain("x"));
        assert_eq!(Item::scored("x", -0.0), Item::scored("x", 0.0));
    }

    #[test]
    fn items_serialize_to_their_input_shapes() {
        let items = vec![Item::plain("a"), Item::scored("b", 6.0)];
        assert_eq!(
            serde_json::to_value(&items).unwrap(),
            json!(["a", {"text": "b", "relevance": 6.0}])
        );
    }

    #[test]
    fn red_flags_are_omitted_when_empty() {
        let value = serde_json::to_value(ExtractionRecord::default()).unwrap();
        assert!(value.get("red_flags").is_none());
        assert!(value.get("pain_points").is_some());
    }

    #[test]
    fn report_without_keywords_is_invalid_input() {
        let err = AggregatedReport::from_json_str(r#"{"metadata": {"business_idea": "x"}}"#)
            .unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidInput { .. }));
    }

    #[test]
    fn report_with_missing_sections_loads_with_defaults() {
        let report = AggregatedReport::from_json_str(
            r#"{"metadata": {"business_idea": "x", "keywords": ["a", "b"]}}"#,
        )
        .unwrap();
        assert_eq!(report.metadata.keywords, vec!["a", "b"]);
        assert!(report.aggregated_results.is_empty());
        assert!(report.keyword_results.is_empty());
    }

    #[test]
    fn status_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(ValidationStatus::PartiallyValidated).unwrap(),
            json!("Partially Validated")
        );
    }
}
