//! Transaction record types emitted by the alert extraction pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies the amount extractor recognizes, in priority order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Currency {
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// First monetary value found in an alert body
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmountMatch {
    /// Always non-negative; direction comes from classification
    pub amount: f64,
    pub currency: Currency,
}

/// Direction of money movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    #[serde(rename = "debit")]
    Debit,
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "unknown")]
    Unknown,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Debit => "debit",
            TransactionType::Credit => "credit",
            TransactionType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction extracted from one alert email
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Identifier of the source message
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub currency: Currency,
    /// Merchant, payee or placeholder text
    pub description: String,
    /// Sent date of the alert
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Create a debit transaction
    pub fn debit(
        id: impl Into<String>,
        amount: f64,
        currency: Currency,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: TransactionType::Debit,
            amount,
            currency,
            description: description.into(),
            date,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.kind == TransactionType::Debit
    }
}

/// Order transactions most-recent-first (presentation order)
pub fn sort_recent_first(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}
