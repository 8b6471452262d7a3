// 🔁 Review Pipeline - Identify → Measure → Analyze → Communicate
// One table in, one report out. A missing value column halts before any stage runs.

use crate::aggregate::aggregate;
use crate::error::ReviewResult;
use crate::loader::{load_bytes, RawTable, SourceFormat};
use crate::report::{Advisory, Overview, Report, ReportAssembler};
use crate::roles::RoleMapping;
use crate::rules::{dedup_by_message, RuleEngine};
use crate::summarizer::Summarizer;
use crate::table::Table;
use std::path::Path;
use tracing::{info, warn};

pub struct Pipeline<'a> {
    rules: RuleEngine,
    summarizer: &'a dyn Summarizer,
    dedup_findings: bool,
}

impl<'a> Pipeline<'a> {
    /// Pipeline with the standard rule set
    pub fn new(summarizer: &'a dyn Summarizer) -> Self {
        Pipeline {
            rules: RuleEngine::standard(),
            summarizer,
            dedup_findings: false,
        }
    }

    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// Collapse findings that carry the same message
    pub fn dedup_findings(mut self, enabled: bool) -> Self {
        self.dedup_findings = enabled;
        self
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    /// Review an already-loaded table
    pub fn review(&self, raw: &RawTable) -> ReviewResult<Report> {
        let roles = RoleMapping::resolve(&raw.headers);
        self.run(raw, Overview::new(raw, &roles), roles)
    }

    /// Parse and review an uploaded byte stream
    pub fn review_bytes(&self, bytes: &[u8], format: SourceFormat) -> ReviewResult<Report> {
        let raw = load_bytes(bytes, format)?;
        let roles = RoleMapping::resolve(&raw.headers);
        let overview = Overview::new(&raw, &roles).with_source(bytes);
        self.run(&raw, overview, roles)
    }

    pub fn review_path(&self, path: &Path) -> ReviewResult<Report> {
        let format = SourceFormat::from_path(path)?;
        let bytes = std::fs::read(path)?;
        info!(path = %path.display(), "reviewing file");
        self.review_bytes(&bytes, format)
    }

    fn run(&self, raw: &RawTable, overview: Overview, roles: RoleMapping) -> ReviewResult<Report> {
        // Identify
        let table = Table::build(raw, roles)?;
        for advisory in Advisory::for_roles(table.roles()) {
            warn!(?advisory, "{}", advisory.message());
        }

        // Measure
        let aggregate = aggregate(&table);

        // Analyze
        let mut findings = self.rules.check(&table);
        if self.dedup_findings {
            findings = dedup_by_message(findings);
        }

        info!(
            rows = table.len(),
            groups = aggregate.len(),
            findings = findings.len(),
            "review complete"
        );

        // Communicate
        Ok(ReportAssembler::new(self.summarizer).assemble(overview, aggregate, findings))
    }
}
