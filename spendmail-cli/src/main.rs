use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use spendmail_core::sort_recent_first;
use spendmail_finance::{detect_subscriptions, monthly_spend, summarize};
use spendmail_ingest::{Analysis, TracingSink, scan_mailbox};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

mod config;
mod output;
mod source;
mod state;

use config::Config;
use output::{Format, SummaryFormat, SummaryReport};
use source::DumpSource;

#[derive(Parser, Debug)]
#[command(name = "spendmail", version, about = "Extract debit transactions from bank alert emails")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the extraction pipeline over message dumps and print debits
    Scan {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Show every analyzed message, including credits and unmatched alerts
        #[arg(long)]
        all: bool,
    },

    /// Detect subscriptions and print monthly/yearly totals
    Summary {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = SummaryFormat::Table)]
        format: SummaryFormat,
    },

    /// Print the provider search query built from config
    Query,

    /// Manage ~/.spendmail/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// JSON message dump: a file (one message or an array) or a directory of *.json
    #[arg(long, env = "SPENDMAIL_INPUT")]
    input: PathBuf,

    /// Ignore the sender allow-list from config
    #[arg(long)]
    any_sender: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let subscriber = Registry::default().with(env_filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).context("install tracing subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_tracing(&cfg.logging.filter)?;

    match cli.command {
        Command::Scan { input, format, all } => {
            let source = DumpSource::load(&input.input, input.any_sender)
                .with_context(|| format!("loading {}", input.input.display()))?;
            if all {
                let analyses = analyze_all(&cfg, &source);
                output::print_analyses(&analyses, format)?;
            } else {
                let mut txns = scan(&cfg, &source).await?;
                sort_recent_first(&mut txns);
                output::print_transactions(&txns, format)?;
            }
        }

        Command::Summary { input, format } => {
            let tz = cfg.timezone()?;
            let source = DumpSource::load(&input.input, input.any_sender)
                .with_context(|| format!("loading {}", input.input.display()))?;
            let txns = scan(&cfg, &source).await?;

            let subscriptions = detect_subscriptions(&txns);
            let months = monthly_spend(&txns, tz);
            let report = SummaryReport {
                subscriptions: &subscriptions,
                summary: summarize(&subscriptions),
                monthly_spend: &months,
            };
            output::print_summary(&report, format)?;
        }

        Command::Query => {
            println!("{}", cfg.mail_query().to_query_string());
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

async fn scan(cfg: &Config, source: &DumpSource) -> Result<Vec<spendmail_core::Transaction>> {
    let extractor = cfg.extractor(Arc::new(TracingSink));
    let report = scan_mailbox(source, &extractor, &cfg.mail_query(), Utc::now())
        .await
        .context("scanning alert messages")?;
    if report.failed > 0 {
        tracing::warn!(failed = report.failed, "some messages were skipped");
    }
    if report.auth_failed {
        tracing::warn!("re-authenticate with the mail provider; results are partial");
    }
    tracing::info!(
        scanned = report.scanned,
        emitted = report.transactions.len(),
        skipped = report.skipped,
        "scan finished"
    );
    Ok(report.transactions)
}

/// Analyze every message the query selects; per-message failures are logged
/// and skipped like in a normal scan.
fn analyze_all(cfg: &Config, source: &DumpSource) -> Vec<Analysis> {
    let extractor = cfg.extractor(Arc::new(TracingSink));
    let now = Utc::now();
    let mut out = Vec::new();
    for msg in source.matching(&cfg.mail_query()) {
        match extractor.analyze(msg, now) {
            Ok(a) => out.push(a),
            Err(e) => tracing::warn!(message_id = %msg.id, error = %e, "failed to process message"),
        }
    }
    out
}
