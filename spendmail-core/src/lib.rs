//! spendmail-core: Core record types shared by the extraction pipeline and finance summaries

pub mod subscription;
pub mod transaction;

pub use subscription::{BillingInterval, Subscription, SubscriptionSummary};
pub use transaction::{AmountMatch, Currency, Transaction, TransactionType, sort_recent_first};
