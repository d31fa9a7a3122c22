use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use spendmail_core::Currency;
use spendmail_ingest::{
    DescriptionCascade, DiagnosticSink, Extractor, ExtractorPolicy, MailQuery,
    description::DEFAULT_PLACEHOLDER, source::DEFAULT_MAX_RESULTS,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::state::{ensure_spendmail_home, spendmail_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mail: MailSection,
    pub extract: ExtractSection,
    pub display: DisplaySection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSection {
    /// Sender allow-list for alert emails
    pub senders: Vec<String>,
    pub keywords: Vec<String>,
    /// Provider recency window, e.g. "1m"
    pub newer_than: Option<String>,
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    pub placeholder_description: String,
    /// Only amounts in this currency are classified
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA zone used for monthly buckets
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directive; RUST_LOG wins when set
    pub filter: String,
}

impl Default for MailSection {
    fn default() -> Self {
        let q = MailQuery::default();
        Self {
            senders: q.senders,
            keywords: q.keywords,
            newer_than: q.newer_than,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            placeholder_description: DEFAULT_PLACEHOLDER.to_string(),
            currency: Currency::Inr,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn mail_query(&self) -> MailQuery {
        MailQuery {
            senders: self.mail.senders.clone(),
            keywords: self.mail.keywords.clone(),
            newer_than: self.mail.newer_than.clone(),
            max_results: self.mail.max_results,
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.display
            .timezone
            .parse::<Tz>()
            .map_err(|_| anyhow!("unknown timezone in config: {}", self.display.timezone))
    }

    pub fn extractor(&self, sink: Arc<dyn DiagnosticSink>) -> Extractor {
        Extractor::new(sink)
            .with_cascade(
                DescriptionCascade::default().with_placeholder(&self.extract.placeholder_description),
            )
            .with_policy(ExtractorPolicy {
                currency: self.extract.currency,
            })
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(spendmail_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_spendmail_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
