//! Mail-source boundary and batch scanning.
//!
//! The concrete provider client lives outside this crate; it only has to list
//! message ids for a [`MailQuery`] and fetch one message at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spendmail_core::Transaction;

use crate::diagnostics::Diagnostic;
use crate::error::FetchError;
use crate::message::RawMessage;
use crate::pipeline::Extractor;

pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Server-side filter for alert emails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailQuery {
    /// Sender allow-list
    pub senders: Vec<String>,
    /// At least one must appear in the message
    pub keywords: Vec<String>,
    /// Recency window in provider syntax (`1m`, `7d`, ...)
    pub newer_than: Option<String>,
    pub max_results: usize,
}

impl Default for MailQuery {
    fn default() -> Self {
        Self {
            senders: vec![
                "alerts@hdfcbank.net".to_string(),
                "HDFCBankAlerts@hdfcbank.com".to_string(),
            ],
            keywords: vec!["Rs".to_string(), "INR".to_string()],
            newer_than: Some("1m".to_string()),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl MailQuery {
    /// Render as a provider search string, e.g.
    /// `from:(a@x OR b@y) (Rs OR INR) newer_than:1m`
    pub fn to_query_string(&self) -> String {
        let mut clauses = Vec::new();
        if !self.senders.is_empty() {
            clauses.push(format!("from:({})", self.senders.join(" OR ")));
        }
        if !self.keywords.is_empty() {
            clauses.push(format!("({})", self.keywords.join(" OR ")));
        }
        if let Some(window) = self.newer_than.as_deref().filter(|w| !w.is_empty()) {
            clauses.push(format!("newer_than:{window}"));
        }
        clauses.join(" ")
    }
}

/// Listing and fetching capability supplied by the mail collaborator
#[allow(async_fn_in_trait)]
pub trait MailSource {
    /// Ids matching `query`, newest first, at most `query.max_results`
    async fn list_message_ids(&self, query: &MailQuery) -> Result<Vec<String>, FetchError>;

    /// Full payload (headers and part tree) for one id
    async fn fetch_message(&self, id: &str) -> Result<RawMessage, FetchError>;
}

/// Outcome of scanning a mailbox
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub transactions: Vec<Transaction>,
    /// Ids returned by the listing (after the cap)
    pub scanned: usize,
    /// Messages that failed to fetch or parse
    pub failed: usize,
    /// Messages processed without producing a debit (no amount, other
    /// currency, credit or unknown direction)
    pub skipped: usize,
    /// A per-message fetch was rejected for missing or expired credentials
    pub auth_failed: bool,
}

/// List, fetch and extract. Only a listing failure aborts the batch; every
/// per-message failure is counted and skipped.
pub async fn scan_mailbox<S: MailSource>(
    source: &S,
    extractor: &Extractor,
    query: &MailQuery,
    now: DateTime<Utc>,
) -> Result<BatchReport, FetchError> {
    let mut ids = source.list_message_ids(query).await?;
    ids.truncate(query.max_results);
    tracing::info!(count = ids.len(), query = %query.to_query_string(), "listed alert messages");

    let sink = extractor.sink();
    let mut report = BatchReport {
        scanned: ids.len(),
        ..Default::default()
    };

    for id in &ids {
        let msg = match source.fetch_message(id).await {
            Ok(msg) => msg,
            Err(e) => {
                report.failed += 1;
                report.auth_failed |= e.is_auth_failure();
                sink.record(id, &Diagnostic::MessageFailed { error: e.to_string() });
                continue;
            }
        };
        match extractor.extract_one(&msg, now) {
            Ok(Some(txn)) => report.transactions.push(txn),
            Ok(None) => report.skipped += 1,
            Err(e) => {
                report.failed += 1;
                sink.record(id, &Diagnostic::MessageFailed { error: e.to_string() });
            }
        }
    }

    sink.record(
        "",
        &Diagnostic::BatchFinished {
            scanned: report.scanned,
            emitted: report.transactions.len(),
            failed: report.failed,
        },
    );
    if report.auth_failed {
        tracing::warn!(failed = report.failed, "mail source rejected credentials during the scan");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_string() {
        assert_eq!(
            MailQuery::default().to_query_string(),
            "from:(alerts@hdfcbank.net OR HDFCBankAlerts@hdfcbank.com) (Rs OR INR) newer_than:1m"
        );
    }

    #[test]
    fn test_query_omits_empty_clauses() {
        let q = MailQuery {
            senders: vec![],
            keywords: vec!["debited".to_string()],
            newer_than: None,
            max_results: 10,
        };
        assert_eq!(q.to_query_string(), "(debited)");
    }
}
