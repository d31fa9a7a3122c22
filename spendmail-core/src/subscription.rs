//! Recurring-charge records and their aggregate summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transaction::Currency;

/// How often a subscription bills
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BillingInterval {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "yearly")]
    Yearly,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Monthly => "monthly",
            BillingInterval::Yearly => "yearly",
        }
    }
}

/// A recurring charge attributed to a known service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub name: String,
    pub amount: f64,
    pub currency: Currency,
    pub interval: BillingInterval,
    pub logo: Option<String>,
    /// Date of the most recent charge seen
    pub last_charged: DateTime<Utc>,
    /// Id of the transaction the amount came from
    pub source_id: String,
}

/// Aggregate totals over a set of subscriptions
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub monthly_total: f64,
    pub yearly_total: f64,
    pub yearly_monthly_equivalent: f64,
    /// Monthly spend with yearly plans spread over twelve months
    pub total_monthly: f64,
}
