//! Aggregate math over subscriptions and debit transactions.
//!
//! Nothing here is stored; summaries are recomputed from the record set on
//! every call.

use chrono::{Datelike, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use spendmail_core::{BillingInterval, Subscription, SubscriptionSummary, Transaction};
use std::collections::BTreeMap;

/// Monthly, yearly and blended-monthly totals
pub fn summarize(subs: &[Subscription]) -> SubscriptionSummary {
    let total_for = |interval: BillingInterval| -> f64 {
        subs.iter()
            .filter(|s| s.interval == interval)
            .map(|s| s.amount)
            .sum()
    };

    let monthly_total = total_for(BillingInterval::Monthly);
    let yearly_total = total_for(BillingInterval::Yearly);
    let yearly_monthly_equivalent = yearly_total / 12.0;

    SubscriptionSummary {
        monthly_total,
        yearly_total,
        yearly_monthly_equivalent,
        total_monthly: monthly_total + yearly_monthly_equivalent,
    }
}

/// Debit spend for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpend {
    /// `YYYY-MM` in the display time zone
    pub month: String,
    pub total: f64,
    pub count: usize,
}

/// Bucket debit transactions by calendar month in `tz`, oldest first
pub fn monthly_spend(txns: &[Transaction], tz: Tz) -> Vec<MonthlySpend> {
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for txn in txns.iter().filter(|t| t.is_debit()) {
        let local = tz.from_utc_datetime(&txn.date.naive_utc());
        let entry = buckets.entry((local.year(), local.month())).or_insert((0.0, 0));
        entry.0 += txn.amount;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), (total, count))| MonthlySpend {
            month: format!("{year:04}-{month:02}"),
            total,
            count,
        })
        .collect()
}
