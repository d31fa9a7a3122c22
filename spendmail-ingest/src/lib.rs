//! spendmail-ingest: turn raw bank-alert emails into typed debit transactions.
//!
//! Stages: [`body`] flattens the part tree, [`amount`] finds the first amount,
//! [`description`] and [`classify`] label it. [`pipeline::Extractor`] composes
//! them; [`source`] drives a batch from a mail collaborator.

pub mod amount;
pub mod body;
pub mod classify;
pub mod description;
pub mod diagnostics;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod source;

pub use amount::extract_amount;
pub use body::extract_body;
pub use classify::{DirectionClassifier, DirectionRule, classify_direction};
pub use description::{DescriptionCascade, DescriptionRule, ExtractedDescription, normalize_description};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, NullSink, TracingSink};
pub use error::{FetchError, IngestError};
pub use message::{MessagePart, RawMessage};
pub use pipeline::{Analysis, Classification, Extractor, ExtractorPolicy};
pub use source::{BatchReport, MailQuery, MailSource, scan_mailbox};
