//! Injected diagnostic sink for the extraction pipeline.
//!
//! The pipeline never logs directly; it reports [`Diagnostic`] events to a
//! [`DiagnosticSink`]. [`TracingSink`] forwards them to `tracing`.

use spendmail_core::{AmountMatch, TransactionType};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Start of a message, with a short body preview
    BodySnippet { subject: String, snippet: String },
    AmountDetected(AmountMatch),
    NoAmount,
    /// Amount found, but not in the currency being classified
    CurrencySkipped(AmountMatch),
    DescriptionExtracted { rule: &'static str, description: String },
    DescriptionFallback { placeholder: String },
    Classified(TransactionType),
    Emitted,
    SkippedNonDebit(TransactionType),
    MessageFailed { error: String },
    BatchFinished { scanned: usize, emitted: usize, failed: usize },
}

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, message_id: &str, event: &Diagnostic);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _message_id: &str, _event: &Diagnostic) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, message_id: &str, event: &Diagnostic) {
        match event {
            Diagnostic::BodySnippet { subject, snippet } => {
                tracing::debug!(message_id, subject = %subject, snippet = %snippet, "processing alert");
            }
            Diagnostic::AmountDetected(m) => {
                tracing::debug!(message_id, amount = m.amount, currency = %m.currency, "amount detected");
            }
            Diagnostic::NoAmount => {
                tracing::debug!(message_id, "no amount found");
            }
            Diagnostic::CurrencySkipped(m) => {
                tracing::debug!(message_id, amount = m.amount, currency = %m.currency, "amount not in classified currency");
            }
            Diagnostic::DescriptionExtracted { rule, description } => {
                tracing::debug!(message_id, rule, description = %description, "description extracted");
            }
            Diagnostic::DescriptionFallback { placeholder } => {
                tracing::debug!(message_id, placeholder = %placeholder, "no description pattern matched");
            }
            Diagnostic::Classified(kind) => {
                tracing::debug!(message_id, direction = %kind, "classified");
            }
            Diagnostic::Emitted => {
                tracing::debug!(message_id, "debit transaction emitted");
            }
            Diagnostic::SkippedNonDebit(kind) => {
                tracing::debug!(message_id, direction = %kind, "skipping non-debit alert");
            }
            Diagnostic::MessageFailed { error } => {
                tracing::warn!(message_id, error = %error, "failed to process message");
            }
            Diagnostic::BatchFinished { scanned, emitted, failed } => {
                tracing::info!(scanned, emitted, failed, "finished processing alerts");
            }
        }
    }
}

/// Collects events in memory, in order
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(String, Diagnostic)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Diagnostic)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events recorded for one message
    pub fn for_message(&self, message_id: &str) -> Vec<Diagnostic> {
        self.events()
            .into_iter()
            .filter(|(id, _)| id == message_id)
            .map(|(_, e)| e)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, message_id: &str, event: &Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push((message_id.to_string(), event.clone()));
        }
    }
}

/// First `max_chars` characters of `body` on one line
pub fn snippet(body: &str, max_chars: usize) -> String {
    let flat: String = body.chars().take(max_chars).collect();
    flat.replace(['\r', '\n'], " ")
}
