// ⚠️ Consistency Rules - Rules as Data
// Keyword rules that flag an account name implying a classification the row does not carry

use crate::error::{ReviewError, ReviewResult};
use crate::table::{Record, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// What a matching account's classification must look like (compared lowercased)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    /// Classification must contain this substring
    Contains(String),
    /// Classification must equal one of these
    OneOf(Vec<String>),
}

impl Expectation {
    pub fn is_satisfied(&self, classification: &str) -> bool {
        let classification = classification.to_lowercase();
        match self {
            Expectation::Contains(needle) => classification.contains(&needle.to_lowercase()),
            Expectation::OneOf(allowed) => allowed
                .iter()
                .any(|a| a.to_lowercase() == classification),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyRule {
    /// Rule ID reported on each finding
    pub id: String,

    /// Substring looked for in the account name (case-insensitive)
    pub keyword: String,

    pub expect: Expectation,

    /// Message template: `{row}`, `{account}`, `{classification}`
    pub message: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl ConsistencyRule {
    pub fn new(id: &str, keyword: &str, expect: Expectation, message: &str) -> Self {
        ConsistencyRule {
            id: id.to_string(),
            keyword: keyword.to_string(),
            expect,
            message: message.to_string(),
            description: None,
        }
    }

    /// Substring match, not whole-word: "Bebanan" also hits "beban"
    pub fn applies_to(&self, account_name: &str) -> bool {
        account_name
            .to_lowercase()
            .contains(&self.keyword.to_lowercase())
    }

    /// Finding for this record, if the rule fires
    pub fn evaluate(&self, row_index: usize, record: &Record) -> Option<Finding> {
        if !self.applies_to(&record.account_name) || self.expect.is_satisfied(&record.classification) {
            return None;
        }

        let row = (row_index + 1).to_string();
        let message = render_template(&self.message, &[
            ("{row}", row.as_str()),
            ("{account}", record.account_name.as_str()),
            ("{classification}", record.classification.as_str()),
        ]);

        Some(Finding {
            row_index,
            rule_id: self.id.clone(),
            message,
        })
    }
}

/// Single pass over the template; substituted text is never rescanned
fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(placeholder, _)| tail.starts_with(placeholder)) {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// FINDING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 0-based record index
    pub row_index: usize,
    pub rule_id: String,
    pub message: String,
}

impl Finding {
    /// 1-based row number as shown to reviewers
    pub fn row_number(&self) -> usize {
        self.row_index + 1
    }
}

/// Keep the first finding of each distinct message
pub fn dedup_by_message(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|f| seen.insert(f.message.clone()))
        .collect()
}

// ============================================================================
// RULE ENGINE
// ============================================================================

pub struct RuleEngine {
    rules: Vec<ConsistencyRule>,
}

impl RuleEngine {
    /// Create a new empty rule engine
    pub fn new() -> Self {
        RuleEngine { rules: Vec::new() }
    }

    /// Revenue, expense and cash rules
    pub fn standard() -> Self {
        RuleEngine::from_rules(vec![
            ConsistencyRule::new(
                "revenue_mismatch",
                "pendapatan",
                Expectation::Contains("pendapatan".to_string()),
                "Row {row}: revenue account '{account}' is classified as '{classification}'",
            ),
            ConsistencyRule::new(
                "expense_mismatch",
                "beban",
                Expectation::Contains("beban".to_string()),
                "Row {row}: expense account '{account}' is classified as '{classification}'",
            ),
            ConsistencyRule::new(
                "cash_not_asset",
                "kas",
                Expectation::OneOf(vec!["aset".to_string(), "asset".to_string()]),
                "Row {row}: cash account '{account}' is classified as '{classification}', not as an asset",
            ),
        ])
    }

    /// Load rules from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ReviewResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;

        let rules: Vec<ConsistencyRule> = serde_json::from_str(&content).map_err(|e| {
            ReviewError::Rules(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Ok(RuleEngine::from_rules(rules))
    }

    /// Create engine from a list of rules, evaluated in list order
    pub fn from_rules(rules: Vec<ConsistencyRule>) -> Self {
        RuleEngine { rules }
    }

    /// Append a single rule
    pub fn add_rule(&mut self, rule: ConsistencyRule) {
        self.rules.push(rule);
    }

    /// Append every rule of another engine
    pub fn extend(&mut self, other: RuleEngine) {
        self.rules.extend(other.rules);
    }

    pub fn rules(&self) -> &[ConsistencyRule] {
        &self.rules
    }

    /// Get number of rules loaded
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Findings in table order, then rule order.
    /// Empty when the table has no account name or classification column.
    pub fn check(&self, table: &Table) -> Vec<Finding> {
        let roles = table.roles();
        if roles.account_name.is_none() || roles.classification.is_none() {
            return Vec::new();
        }

        table
            .records()
            .iter()
            .enumerate()
            .flat_map(|(i, record)| self.rules.iter().filter_map(move |rule| rule.evaluate(i, record)))
            .collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// TESTS
// ============================================================================
