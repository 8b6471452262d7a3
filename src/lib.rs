// AccuCheck - Ledger Classification Review
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod config;
pub mod loader;     // Tabular input: CSV / TSV / spreadsheet
pub mod roles;      // Identify: header → semantic role
pub mod table;
pub mod aggregate;  // Measure: totals per classification
pub mod rules;      // Analyze: name vs classification consistency
pub mod summarizer; // Communicate: optional commentary collaborator
pub mod report;
pub mod pipeline;

// Re-export commonly used types
pub use error::{ReviewError, ReviewResult, SummarizerError};
pub use config::{Config, SummarizerConfig};
pub use loader::{load_bytes, load_path, Cell, RawTable, SourceFormat};
pub use roles::{ResolvedColumn, Role, RoleMapping};
pub use table::{Record, Table};
pub use aggregate::{aggregate, AggregateRow, TOTAL_LABEL};
pub use rules::{dedup_by_message, ConsistencyRule, Expectation, Finding, RuleEngine};
pub use summarizer::{summarizer_from_config, HttpSummarizer, NoopSummarizer, Summarizer};
pub use report::{Advisory, Overview, Report, ReportAssembler, COMMENTARY_NOT_AVAILABLE, COMMENTARY_TIMED_OUT};
pub use pipeline::Pipeline;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
