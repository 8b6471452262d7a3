// 🧾 Report Assembler - aggregate + findings (+ optional commentary)

use crate::aggregate::AggregateRow;
use crate::error::SummarizerError;
use crate::loader::RawTable;
use crate::roles::{Role, RoleMapping};
use crate::rules::Finding;
use crate::summarizer::Summarizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Stored as commentary when no summarizer credential is configured
pub const COMMENTARY_NOT_AVAILABLE: &str =
    "AI commentary is not available: no summarizer credential is configured.";

/// Stored as commentary when the summarizer does not answer within its timeout
pub const COMMENTARY_TIMED_OUT: &str =
    "AI commentary is not available: the summarizer did not respond in time.";

const INTERPRETATION_FLAGGED: &str = "The review found potential inconsistencies in account \
classification that may affect the quality of the financial statements. Review the recording \
policy in use.";

const INTERPRETATION_CLEAN: &str = "Initial review shows the records are consistent with the \
accounting policy in use.";

const INTERPRETATION_NOT_EVALUATED: &str = "Consistency checks were not run because the account \
name or classification column is missing. The totals are shown, but no conclusion about \
classification consistency can be drawn.";

const RECOMMENDATIONS: [&str; 3] = [
    "Re-examine the accounts flagged as inconsistent",
    "Make sure account classification follows the accounting policy",
    "Use this result as a preliminary review before the statements are relied on",
];

// ============================================================================
// REPORT TYPES
// ============================================================================

/// Structure of the uploaded table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub row_count: usize,
    pub column_count: usize,
    pub headers: Vec<String>,
    pub roles: RoleMapping,
    /// SHA-256 of the source bytes, when known
    pub source_sha256: Option<String>,
}

impl Overview {
    pub fn new(raw: &RawTable, roles: &RoleMapping) -> Self {
        Overview {
            row_count: raw.row_count(),
            column_count: raw.column_count(),
            headers: raw.headers.clone(),
            roles: roles.clone(),
            source_sha256: None,
        }
    }

    pub fn with_source(mut self, bytes: &[u8]) -> Self {
        self.source_sha256 = Some(fingerprint(bytes));
        self
    }
}

pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Non-fatal condition that reduced what the review could do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Totals are ungrouped and consistency checks skipped
    MissingClassification,
    /// Consistency checks skipped
    MissingAccountName,
}

impl Advisory {
    /// Advisories implied by a role mapping
    pub fn for_roles(roles: &RoleMapping) -> Vec<Advisory> {
        let mut advisories = Vec::new();
        if !roles.has(Role::Classification) {
            advisories.push(Advisory::MissingClassification);
        }
        if !roles.has(Role::AccountName) {
            advisories.push(Advisory::MissingAccountName);
        }
        advisories
    }

    pub fn message(&self) -> String {
        match self {
            Advisory::MissingClassification => format!(
                "No classification column found (expected one of: {}). Showing a single total instead of grouped totals. Consistency checks were skipped.",
                Role::Classification.synonyms().join(", ")
            ),
            Advisory::MissingAccountName => format!(
                "No account name column found (expected one of: {}). Consistency checks were skipped.",
                Role::AccountName.synonyms().join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub overview: Overview,
    pub aggregate: Vec<AggregateRow>,
    pub findings: Vec<Finding>,
    pub advisories: Vec<Advisory>,
    pub commentary: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Whether the consistency rules were evaluated at all
    pub fn checks_ran(&self) -> bool {
        let roles = &self.overview.roles;
        roles.has(Role::AccountName) && roles.has(Role::Classification)
    }

    /// One-paragraph reading of the result
    pub fn interpretation(&self) -> &'static str {
        if !self.checks_ran() {
            INTERPRETATION_NOT_EVALUATED
        } else if self.has_findings() {
            INTERPRETATION_FLAGGED
        } else {
            INTERPRETATION_CLEAN
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        &RECOMMENDATIONS
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows, {} classification groups, {} findings",
            self.overview.row_count,
            self.aggregate.len(),
            self.findings.len()
        )
    }
}

// ============================================================================
// ASSEMBLER
// ============================================================================

pub struct ReportAssembler<'a> {
    summarizer: &'a dyn Summarizer,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(summarizer: &'a dyn Summarizer) -> Self {
        ReportAssembler { summarizer }
    }

    /// Combine stage outputs. Commentary is requested only when there are findings.
    pub fn assemble(
        &self,
        overview: Overview,
        aggregate: Vec<AggregateRow>,
        findings: Vec<Finding>,
    ) -> Report {
        let commentary = if findings.is_empty() {
            None
        } else {
            Some(self.commentary(&aggregate))
        };

        let advisories = Advisory::for_roles(&overview.roles);

        Report {
            overview,
            aggregate,
            findings,
            advisories,
            commentary,
            generated_at: Utc::now(),
        }
    }

    fn commentary(&self, aggregate: &[AggregateRow]) -> String {
        match self.summarizer.summarize(aggregate) {
            Ok(text) => {
                info!(chars = text.len(), "summarizer returned commentary");
                text
            }
            Err(SummarizerError::Unavailable) => COMMENTARY_NOT_AVAILABLE.to_string(),
            Err(SummarizerError::Timeout) => {
                warn!("summarizer timed out");
                COMMENTARY_TIMED_OUT.to_string()
            }
            Err(e) => {
                warn!(error = %e, "summarizer failed");
                format!("AI commentary could not be generated ({}).", e)
            }
        }
    }
}
