// 📊 Aggregator - Sum of values per classification
// Groups keep raw casing and first-appearance order.

use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label of the single row produced when no classification column exists
pub const TOTAL_LABEL: &str = "Total";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub classification: String,
    pub total: f64,
}

/// Group numeric values by classification. Non-numeric values are skipped.
pub fn aggregate(table: &Table) -> Vec<AggregateRow> {
    if table.is_empty() {
        return Vec::new();
    }

    if table.roles().classification.is_none() {
        return vec![AggregateRow {
            classification: TOTAL_LABEL.to_string(),
            total: table.numeric_total(),
        }];
    }

    let mut rows: Vec<AggregateRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in table.records() {
        let slot = *index
            .entry(record.classification.as_str())
            .or_insert_with(|| {
                rows.push(AggregateRow {
                    classification: record.classification.clone(),
                    total: 0.0,
                });
                rows.len() - 1
            });

        if let Some(value) = record.value {
            rows[slot].total += value;
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleMapping;
    use crate::table::Record;

    fn grouped(records: Vec<Record>) -> Table {
        Table::from_records(records, RoleMapping::resolve(&["Akun", "Jenis Akun", "Nilai"]))
    }

    fn ungrouped(records: Vec<Record>) -> Table {
        Table::from_records(records, RoleMapping::resolve(&["Akun", "Nilai"]))
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let table = grouped(vec![
            Record::new("Pendapatan Jasa", "Pendapatan", Some(1000.0)),
            Record::new("Kas", "Liabilitas", Some(500.0)),
            Record::new("Pendapatan Bunga", "Pendapatan", Some(250.0)),
        ]);

        assert_eq!(
            aggregate(&table),
            vec![
                AggregateRow { classification: "Pendapatan".to_string(), total: 1250.0 },
                AggregateRow { classification: "Liabilitas".to_string(), total: 500.0 },
            ]
        );
    }

    #[test]
    fn test_grouping_is_case_sensitive() {
        let table = grouped(vec![
            Record::new("Kas", "Aset", Some(1.0)),
            Record::new("Bank", "aset", Some(2.0)),
        ]);

        let result = aggregate(&table);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].classification, "Aset");
        assert_eq!(result[1].classification, "aset");
    }

    #[test]
    fn test_non_numeric_rows_excluded_from_sum() {
        let table = grouped(vec![
            Record::new("Kas", "Aset", Some(100.0)),
            Record::new("Bank", "Aset", None),
            Record::new("Piutang", "Piutang", None),
        ]);

        let result = aggregate(&table);
        assert_eq!(result[0].total, 100.0);
        assert_eq!(result[1], AggregateRow { classification: "Piutang".to_string(), total: 0.0 });
    }

    #[test]
    fn test_grouping_conserves_total() {
        let table = grouped(vec![
            Record::new("a", "X", Some(1.5)),
            Record::new("b", "Y", Some(-3.0)),
            Record::new("c", "X", None),
            Record::new("d", "Z", Some(10.25)),
            Record::new("e", "Y", Some(4.0)),
        ]);

        let sum: f64 = aggregate(&table).iter().map(|r| r.total).sum();
        assert_eq!(sum, table.numeric_total());
    }

    #[test]
    fn test_single_total_without_classification() {
        let table = ungrouped(vec![
            Record::new("Kas", "", Some(100.0)),
            Record::new("Beban", "", Some(50.0)),
            Record::new("Bank", "", None),
        ]);

        assert_eq!(
            aggregate(&table),
            vec![AggregateRow { classification: TOTAL_LABEL.to_string(), total: 150.0 }]
        );
    }

    #[test]
    fn test_empty_table() {
        assert!(aggregate(&grouped(vec![])).is_empty());
        assert!(aggregate(&ungrouped(vec![])).is_empty());
    }
}
