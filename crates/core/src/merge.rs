use std::collections::HashSet;

use crate::types::{Category, ExtractionRecord, Item};

/// Removes exact duplicates, keeping the first occurrence of each item.
pub fn dedup_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<Item> {
    let mut seen: HashSet<&Item> = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Concatenates every list across `records` and deduplicates each one.
///
/// Output order is first-occurrence order, so merging is deterministic and
/// idempotent: merging an already merged record returns it unchanged.
pub fn merge_records<'a>(records: impl IntoIterator<Item = &'a ExtractionRecord>) -> ExtractionRecord {
    let records: Vec<&ExtractionRecord> = records.into_iter().collect();
    let mut merged = ExtractionRecord::default();
    for category in Category::ALL {
        *merged.items_mut(category) =
            dedup_items(records.iter().flat_map(|r| r.items(category).iter()));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pain: &[&str], competitors: &[&str]) -> ExtractionRecord {
        ExtractionRecord {
            pain_points: pain.iter().map(|s| Item::plain(*s)).collect(),
            mentions_of_competitors: competitors.iter().map(|s| Item::plain(*s)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn merge_concatenates_and_dedups_in_first_seen_order() {
        let a = record(&["slow", "pricey"], &["Acme"]);
        let b = record(&["pricey", "buggy", "slow"], &["Acme", "Globex"]);

        let merged = merge_records([&a, &b]);

        assert_eq!(
            merged.pain_points,
            vec![Item::plain("slow"), Item::plain("pricey"), Item::plain("buggy")]
        );
        assert_eq!(
            merged.mentions_of_competitors,
            vec![Item::plain("Acme"), Item::plain("Globex")]
        );
        assert!(merged.excitement_signals.is_empty());
    }

    #[test]
    fn scored_items_with_different_relevance_stay_distinct() {
        let a = ExtractionRecord {
            pain_points: vec![Item::scored("slow", 7.0), Item::plain("slow")],
            ..Default::default()
        };
        let b = ExtractionRecord {
            pain_points: vec![Item::scored("slow", 4.0), Item::scored("slow", 7.0)],
            ..Default::default()
        };

        let merged = merge_records([&a, &b]);

        assert_eq!(
            merged.pain_points,
            vec![
                Item::scored("slow", 7.0),
                Item::plain("slow"),
                Item::scored("slow", 4.0),
            ]
        );
    }

    #[test]
    fn merge_is_a_fixed_point() {
        let a = record(&["x", "y", "x"], &["A", "B"]);
        let b = record(&["y", "z"], &["B", "C", "A"]);

        let once = merge_records([&a, &b]);
        let twice = merge_records([&once]);
        let doubled = merge_records([&a, &b, &a, &b]);

        assert_eq!(once, twice);
        assert_eq!(once, doubled);
    }

    #[test]
    fn merging_nothing_or_empties_yields_empty_record() {
        assert!(merge_records([]).is_empty());
        let empty = ExtractionRecord::default();
        assert!(merge_records([&empty, &empty]).is_empty());
    }

    #[test]
    fn red_flags_are_merged_too() {
        let a = ExtractionRecord {
            red_flags: vec![Item::plain("regulation")],
            ..Default::default()
        };
        let merged = merge_records([&a, &a]);
        assert_eq!(merged.red_flags, vec![Item::plain("regulation")]);
    }
}
