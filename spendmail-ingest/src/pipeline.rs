//! The per-message extraction pipeline: body → amount → description/direction.
//!
//! Only debit-classified alerts in the policy currency become
//! [`Transaction`]s. Everything else is reported to the diagnostic sink and
//! dropped.

use chrono::{DateTime, Utc};
use spendmail_core::{AmountMatch, Currency, Transaction, TransactionType};
use std::sync::Arc;

use crate::amount::extract_amount;
use crate::body::extract_body;
use crate::classify::DirectionClassifier;
use crate::description::{DescriptionCascade, ExtractedDescription};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink, snippet};
use crate::error::Result;
use crate::message::RawMessage;

const SNIPPET_CHARS: usize = 300;

/// Which amounts are classified into transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorPolicy {
    pub currency: Currency,
}

impl Default for ExtractorPolicy {
    fn default() -> Self {
        Self {
            currency: Currency::Inr,
        }
    }
}

/// Description and direction for an amount-bearing alert
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: TransactionType,
    pub description: ExtractedDescription,
}

/// Everything the pipeline learned about one message, before the debit filter
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub message_id: String,
    pub subject: String,
    pub sent_at: DateTime<Utc>,
    pub amount: Option<AmountMatch>,
    /// Set only when the amount is in the policy currency
    pub classification: Option<Classification>,
}

impl Analysis {
    /// The record this analysis would emit, if any
    pub fn transaction(&self) -> Option<Transaction> {
        let amount = self.amount?;
        let class = self.classification.as_ref()?;
        if class.kind != TransactionType::Debit {
            return None;
        }
        Some(Transaction::debit(
            self.message_id.clone(),
            amount.amount,
            amount.currency,
            class.description.text.clone(),
            self.sent_at,
        ))
    }
}

pub struct Extractor {
    cascade: DescriptionCascade,
    classifier: DirectionClassifier,
    policy: ExtractorPolicy,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl Extractor {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            cascade: DescriptionCascade::default(),
            classifier: DirectionClassifier::default(),
            policy: ExtractorPolicy::default(),
            sink,
        }
    }

    pub fn with_cascade(mut self, cascade: DescriptionCascade) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn with_classifier(mut self, classifier: DirectionClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_policy(mut self, policy: ExtractorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    /// Run all stages on one message without applying the debit filter.
    ///
    /// `now` stands in for the sent date when the message carries none.
    pub fn analyze(&self, msg: &RawMessage, now: DateTime<Utc>) -> Result<Analysis> {
        let id = msg.id.as_str();
        let body = extract_body(msg.payload.as_ref())?;
        let subject = msg.subject().to_string();
        self.sink.record(
            id,
            &Diagnostic::BodySnippet {
                subject: subject.clone(),
                snippet: snippet(&body, SNIPPET_CHARS),
            },
        );

        let mut analysis = Analysis {
            message_id: msg.id.clone(),
            subject,
            sent_at: msg.sent_at(now),
            amount: None,
            classification: None,
        };

        let Some(amount) = extract_amount(&body) else {
            self.sink.record(id, &Diagnostic::NoAmount);
            return Ok(analysis);
        };
        analysis.amount = Some(amount);
        if amount.currency != self.policy.currency {
            self.sink.record(id, &Diagnostic::CurrencySkipped(amount));
            return Ok(analysis);
        }
        self.sink.record(id, &Diagnostic::AmountDetected(amount));

        let description = self.cascade.extract(&body);
        match description.rule {
            Some(rule) => self.sink.record(
                id,
                &Diagnostic::DescriptionExtracted {
                    rule,
                    description: description.text.clone(),
                },
            ),
            None => self.sink.record(
                id,
                &Diagnostic::DescriptionFallback {
                    placeholder: description.text.clone(),
                },
            ),
        }

        let kind = self.classifier.classify(&body);
        self.sink.record(id, &Diagnostic::Classified(kind));

        analysis.classification = Some(Classification { kind, description });
        Ok(analysis)
    }

    /// Zero or one debit transaction for `msg`.
    pub fn extract_one(&self, msg: &RawMessage, now: DateTime<Utc>) -> Result<Option<Transaction>> {
        let analysis = self.analyze(msg, now)?;
        let txn = analysis.transaction();
        match (&txn, &analysis.classification) {
            (Some(_), _) => self.sink.record(&msg.id, &Diagnostic::Emitted),
            (None, Some(class)) => self
                .sink
                .record(&msg.id, &Diagnostic::SkippedNonDebit(class.kind)),
            (None, None) => {}
        }
        Ok(txn)
    }

    /// Process a fetched batch. Failing messages are reported and skipped.
    pub fn extract_transactions(&self, messages: &[RawMessage], now: DateTime<Utc>) -> Vec<Transaction> {
        let mut out = Vec::new();
        let mut failed = 0;
        for msg in messages {
            match self.extract_one(msg, now) {
                Ok(Some(txn)) => out.push(txn),
                Ok(None) => {}
                Err(e) => {
                    failed += 1;
                    self.sink
                        .record(&msg.id, &Diagnostic::MessageFailed { error: e.to_string() });
                }
            }
        }
        self.sink.record(
            "",
            &Diagnostic::BatchFinished {
                scanned: messages.len(),
                emitted: out.len(),
                failed,
            },
        );
        out
    }
}
