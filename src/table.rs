// 📒 Ledger Table - Records read through the role mapping

use crate::error::{ReviewError, ReviewResult};
use crate::loader::{Cell, RawTable};
use crate::roles::{ResolvedColumn, Role, RoleMapping};
use serde::{Deserialize, Serialize};

/// One ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub account_name: String,
    pub classification: String,
    /// `None` when the value cell is not numeric-coercible
    pub value: Option<f64>,
}

impl Record {
    pub fn new(account_name: &str, classification: &str, value: Option<f64>) -> Self {
        Record {
            account_name: account_name.to_string(),
            classification: classification.to_string(),
            value,
        }
    }
}

/// Immutable set of records plus the mapping that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    records: Vec<Record>,
    roles: RoleMapping,
}

impl Table {
    /// Build records from a raw table. Fails when no Value column was resolved.
    pub fn build(raw: &RawTable, roles: RoleMapping) -> ReviewResult<Self> {
        let value_col = match &roles.value {
            Some(col) => col.index,
            None => {
                return Err(ReviewError::MissingValueColumn {
                    expected: Role::Value.synonyms().join(", "),
                    headers: raw.headers.clone(),
                })
            }
        };

        let text_at = |row: &[Cell], col: &Option<ResolvedColumn>| -> String {
            col.as_ref()
                .and_then(|c| row.get(c.index))
                .map(Cell::as_text)
                .unwrap_or_default()
        };

        let records = raw
            .rows
            .iter()
            .map(|row| Record {
                account_name: text_at(row, &roles.account_name),
                classification: text_at(row, &roles.classification),
                value: row.get(value_col).and_then(Cell::as_number),
            })
            .collect();

        Ok(Table { records, roles })
    }

    /// Construct directly from records (tests, programmatic callers)
    pub fn from_records(records: Vec<Record>, roles: RoleMapping) -> Self {
        Table { records, roles }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn roles(&self) -> &RoleMapping {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every numeric value
    pub fn numeric_total(&self) -> f64 {
        self.records.iter().filter_map(|r| r.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_build_reads_roles_not_positions() {
        let raw = raw(
            &["Nilai", "Keterangan", "Akun", "Jenis Akun"],
            vec![vec![Cell::Number(10.0), text("x"), text("Kas"), text("Aset")]],
        );
        let roles = RoleMapping::resolve(&raw.headers);
        let table = Table::build(&raw, roles).unwrap();

        assert_eq!(table.records()[0], Record::new("Kas", "Aset", Some(10.0)));
    }

    #[test]
    fn test_non_numeric_values_kept_as_none() {
        let raw = raw(
            &["Akun", "Jenis Akun", "Nilai"],
            vec![
                vec![text("Kas"), text("Aset"), text("n/a")],
                vec![text("Bank"), text("Aset"), text("42")],
                vec![text("Piutang"), text("Aset"), Cell::Empty],
            ],
        );
        let table = Table::build(&raw, RoleMapping::resolve(&raw.headers)).unwrap();

        let values: Vec<Option<f64>> = table.records().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![None, Some(42.0), None]);
        assert_eq!(table.numeric_total(), 42.0);
    }

    #[test]
    fn test_missing_value_column_is_structural() {
        let raw = raw(&["Akun", "Jenis Akun"], vec![vec![text("Kas"), text("Aset")]]);
        let result = Table::build(&raw, RoleMapping::resolve(&raw.headers));

        match result {
            Err(ReviewError::MissingValueColumn { headers, .. }) => {
                assert_eq!(headers, vec!["Akun", "Jenis Akun"]);
            }
            other => panic!("expected MissingValueColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_text_roles_become_empty() {
        let raw = raw(&["Nilai"], vec![vec![Cell::Number(5.0)]]);
        let table = Table::build(&raw, RoleMapping::resolve(&raw.headers)).unwrap();

        assert_eq!(table.records()[0], Record::new("", "", Some(5.0)));
    }
}
