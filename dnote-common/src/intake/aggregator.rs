//! Aggregation of the live set
//!
//! Always a full recomputation: sessions hold tens to low hundreds of records
//! and a summary derived fresh on every read cannot drift from the live set.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::display::format_kg;
use crate::record::ScanRecord;

/// Total mass for one stock code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCodeTotal {
    pub stock_code: String,
    /// Full-precision sum of coerced masses
    pub total_kg: f64,
    /// Two-decimal display form of `total_kg`
    pub total_display: String,
    pub item_count: usize,
}

/// Per-stock-code totals plus grand total
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    /// Ascending by stock code
    pub groups: Vec<StockCodeTotal>,
    pub grand_total_kg: f64,
    pub grand_total_display: String,
    pub item_count: usize,
}

impl AggregateSummary {
    /// Group for `stock_code`, if any record carries it
    pub fn group(&self, stock_code: &str) -> Option<&StockCodeTotal> {
        self.groups
            .binary_search_by(|g| g.stock_code.as_str().cmp(stock_code))
            .ok()
            .map(|i| &self.groups[i])
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// Fold `records` into an [`AggregateSummary`]
///
/// Masses are coerced with [`crate::record::Mass::coerced_kg`]; the records
/// themselves are not touched.
pub fn aggregate(records: &[ScanRecord]) -> AggregateSummary {
    let mut by_code: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = by_code.entry(record.stock_code()).or_insert((0.0, 0));
        entry.0 += record.mass().coerced_kg();
        entry.1 += 1;
    }

    let groups: Vec<StockCodeTotal> = by_code
        .into_iter()
        .map(|(code, (total_kg, item_count))| StockCodeTotal {
            stock_code: code.to_string(),
            total_kg,
            total_display: format_kg(total_kg),
            item_count,
        })
        .collect();

    let grand_total_kg: f64 = groups.iter().map(|g| g.total_kg).sum();

    AggregateSummary {
        groups,
        grand_total_kg,
        grand_total_display: format_kg(grand_total_kg),
        item_count: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Mass;

    fn record(identity: &str, stock_code: &str, mass: Mass) -> ScanRecord {
        ScanRecord::new(
            identity.to_string(),
            "Acme".to_string(),
            stock_code.to_string(),
            mass,
            "15/03/2024".to_string(),
            "Raw".to_string(),
        )
    }

    #[test]
    fn test_groups_sorted_and_summed() {
        let records = vec![
            record("1", "B1", Mass::Number(5.0)),
            record("2", "A2", Mass::Number(3.0)),
            record("3", "A2", Mass::Number(2.0)),
        ];
        let summary = aggregate(&records);

        let pairs: Vec<(&str, &str)> = summary
            .groups
            .iter()
            .map(|g| (g.stock_code.as_str(), g.total_display.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A2", "5.00"), ("B1", "5.00")]);
        assert_eq!(summary.grand_total_display, "10.00");
        assert_eq!(summary.grand_total_kg, 10.0);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.group("A2").unwrap().item_count, 2);
    }

    #[test]
    fn test_empty_set() {
        let summary = aggregate(&[]);
        assert!(summary.groups.is_empty());
        assert!(summary.is_empty());
        assert_eq!(summary.grand_total_kg, 0.0);
        assert_eq!(summary.grand_total_display, "0.00");
    }

    #[test]
    fn test_unparsable_mass_counts_zero() {
        let records = vec![
            record("1", "X1", Mass::from("abc")),
            record("2", "X1", Mass::from("4.5")),
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.group("X1").unwrap().total_kg, 4.5);
        assert_eq!(summary.group("X1").unwrap().item_count, 2);
        // The stored record keeps its original value
        assert_eq!(records[0].mass(), &Mass::from("abc"));
    }

    #[test]
    fn test_grand_total_matches_groups_and_records() {
        let records = vec![
            record("1", "C", Mass::Number(1.25)),
            record("2", "A", Mass::from("2.5")),
            record("3", "B", Mass::Number(4.0)),
            record("4", "A", Mass::from("n/a")),
            record("5", "C", Mass::Number(0.25)),
        ];
        let summary = aggregate(&records);

        let by_groups: f64 = summary.groups.iter().map(|g| g.total_kg).sum();
        let by_records: f64 = records.iter().map(|r| r.mass().coerced_kg()).sum();
        assert_eq!(summary.grand_total_kg, by_groups);
        assert!((summary.grand_total_kg - by_records).abs() < 1e-9);
        assert_eq!(summary.grand_total_display, "8.00");
    }

    #[test]
    fn test_display_rounds_only_at_format_time() {
        let records = vec![
            record("1", "X1", Mass::Number(0.333)),
            record("2", "X1", Mass::Number(0.333)),
            record("3", "X1", Mass::Number(0.333)),
        ];
        let summary = aggregate(&records);
        assert!((summary.grand_total_kg - 0.999).abs() < 1e-9);
        assert_eq!(summary.grand_total_display, "1.00");
    }

    #[test]
    fn test_lexical_order_is_bytewise() {
        let records = vec![
            record("1", "b", Mass::Number(1.0)),
            record("2", "B", Mass::Number(1.0)),
            record("3", "10", Mass::Number(1.0)),
            record("4", "9", Mass::Number(1.0)),
        ];
        let codes: Vec<String> = aggregate(&records)
            .groups
            .into_iter()
            .map(|g| g.stock_code)
            .collect();
        assert_eq!(codes, vec!["10", "9", "B", "b"]);
    }
}
