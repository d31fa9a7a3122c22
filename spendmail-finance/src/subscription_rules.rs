//! Deterministic subscription detection over debit transactions.
//!
//! A fixed catalog of known services; the first entry with a pattern found in
//! the lower-cased description wins.

use spendmail_core::{BillingInterval, Subscription, Transaction};
use std::collections::HashMap;

/// A known recurring service
#[derive(Debug, Clone, PartialEq)]
pub struct ServicePattern {
    pub name: &'static str,
    /// Lower-case substrings
    pub patterns: &'static [&'static str],
    pub logo: &'static str,
    pub interval: BillingInterval,
}

impl ServicePattern {
    pub fn matches(&self, description: &str) -> bool {
        let desc = description.to_lowercase();
        self.patterns.iter().any(|p| desc.contains(p))
    }
}

pub const CATALOG: &[ServicePattern] = &[
    ServicePattern {
        name: "Netflix",
        patterns: &["netflix", "netflix.com"],
        logo: "https://logo.clearbit.com/netflix.com",
        interval: BillingInterval::Monthly,
    },
    ServicePattern {
        name: "Spotify",
        patterns: &["spotify", "spotify.com"],
        logo: "https://logo.clearbit.com/spotify.com",
        interval: BillingInterval::Monthly,
    },
    ServicePattern {
        name: "Amazon Prime",
        patterns: &["amazon prime", "prime membership"],
        logo: "https://logo.clearbit.com/amazon.com",
        interval: BillingInterval::Yearly,
    },
    ServicePattern {
        name: "Disney+",
        patterns: &["disney+", "disneyplus"],
        logo: "https://logo.clearbit.com/disney.com",
        interval: BillingInterval::Monthly,
    },
    ServicePattern {
        name: "YouTube Premium",
        patterns: &["youtube premium", "youtube subscription", "your premium benefits", "youtubegoogle"],
        logo: "https://logo.clearbit.com/youtube.com",
        interval: BillingInterval::Monthly,
    },
    ServicePattern {
        name: "Apple Music",
        patterns: &["apple music"],
        logo: "https://logo.clearbit.com/apple.com",
        interval: BillingInterval::Monthly,
    },
    ServicePattern {
        name: "HBO Max",
        patterns: &["hbo max", "hbomax"],
        logo: "https://logo.clearbit.com/hbo.com",
        interval: BillingInterval::Monthly,
    },
    ServicePattern {
        name: "Xbox Game Pass",
        patterns: &["xbox game pass", "game pass ultimate"],
        logo: "https://logo.clearbit.com/xbox.com",
        interval: BillingInterval::Monthly,
    },
];

/// Catalog entry for a description, if any
pub fn match_service(description: &str) -> Option<&'static ServicePattern> {
    CATALOG.iter().find(|s| s.matches(description))
}

/// One subscription per matched service, priced from its most recent debit.
/// Output follows catalog order.
pub fn detect_subscriptions(txns: &[Transaction]) -> Vec<Subscription> {
    let mut latest: HashMap<&'static str, (&ServicePattern, &Transaction)> = HashMap::new();

    for txn in txns.iter().filter(|t| t.is_debit()) {
        let Some(service) = match_service(&txn.description) else {
            continue;
        };
        latest
            .entry(service.name)
            .and_modify(|(_, seen)| {
                if txn.date > seen.date {
                    *seen = txn;
                }
            })
            .or_insert((service, txn));
    }

    CATALOG
        .iter()
        .filter_map(|s| latest.get(s.name))
        .map(|(service, txn)| Subscription {
            name: service.name.to_string(),
            amount: txn.amount,
            currency: txn.currency,
            interval: service.interval,
            logo: Some(service.logo.to_string()),
            last_charged: txn.date,
            source_id: txn.id.clone(),
        })
        .collect()
}
