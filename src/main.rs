// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use accucheck::{summarizer_from_config, Config, Pipeline, Report, RuleEngine};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(version, about = "Accounting classification consistency checker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review a ledger file and print the report
    Check {
        /// CSV, TSV or spreadsheet file
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Extra consistency rules (JSON), appended to the standard set
        #[arg(long, env = "ACCUCHECK_RULES")]
        rules: Option<PathBuf>,

        /// Drop findings with duplicate messages
        #[arg(long)]
        dedup: bool,
    },
    /// Review a ledger file and browse the report in the terminal
    View {
        file: PathBuf,

        #[arg(long, env = "ACCUCHECK_RULES")]
        rules: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accucheck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    info!(summarizer = config.summarizer_enabled(), "configuration loaded");

    match cli.command {
        Command::Check { file, json, rules, dedup } => {
            let report = run_review(&config, &file, rules.as_deref(), dedup)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::View { file, rules } => {
            let report = run_review(&config, &file, rules.as_deref(), false)?;
            run_ui_mode(report)?;
        }
    }

    Ok(())
}

fn run_review(config: &Config, file: &Path, rules: Option<&Path>, dedup: bool) -> Result<Report> {
    let summarizer = summarizer_from_config(config).context("Failed to set up summarizer")?;

    let mut engine = RuleEngine::standard();
    if let Some(path) = rules {
        engine.extend(RuleEngine::from_file(path)?);
    }

    Pipeline::new(summarizer.as_ref())
        .with_rules(engine)
        .dedup_findings(dedup)
        .review_path(file)
        .with_context(|| format!("Failed to review {}", file.display()))
}

fn print_report(report: &Report) {
    let overview = &report.overview;

    println!("🔍 Identify - Data Structure");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Rows:    {}", overview.row_count);
    println!("Columns: {}", overview.column_count);
    println!("Detected: {}", overview.headers.join(", "));
    for role in accucheck::Role::ALL {
        match overview.roles.get(role) {
            Some(col) => println!("✓ {}: {}", role, col.header),
            None => println!("✗ {}: not found", role),
        }
    }
    for advisory in &report.advisories {
        println!("⚠️  {}", advisory.message());
    }

    println!("\n📊 Measure - Totals by Classification");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if report.aggregate.is_empty() {
        println!("(no rows)");
    }
    for row in &report.aggregate {
        println!("{:<30} {:>18.2}", row.classification, row.total);
    }

    println!("\n⚠️  Analyze - Consistency Check");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if !report.checks_ran() {
        println!("⏭️  Consistency checks were not run.");
    } else if report.findings.is_empty() {
        println!("✅ No classification inconsistencies found.");
    }
    for finding in &report.findings {
        println!("[{}] {}", finding.rule_id, finding.message);
    }

    println!("\n🧠 Interpretation");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", report.interpretation());
    if let Some(commentary) = &report.commentary {
        println!("\n{}", commentary);
    }

    println!("\n✅ Recommendations");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for item in report.recommendations() {
        println!("- {}", item);
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(report: Report) -> Result<()> {
    let mut app = ui::App::new(report);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_report: Report) -> Result<()> {
    anyhow::bail!("TUI mode not available. Rebuild with: cargo build --features tui")
}
