//! spendmail-finance: subscription detection and spend summaries over extracted transactions

pub mod subscription_rules;
pub mod summary;

pub use subscription_rules::{CATALOG, ServicePattern, detect_subscriptions, match_service};
pub use summary::{MonthlySpend, monthly_spend, summarize};
