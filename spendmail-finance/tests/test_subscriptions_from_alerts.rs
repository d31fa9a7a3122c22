use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{TimeZone, Utc};
use spendmail_core::BillingInterval;
use spendmail_finance::{detect_subscriptions, monthly_spend, summarize};
use spendmail_ingest::{Extractor, MessagePart, NullSink, RawMessage};
use std::sync::Arc;

fn alert(id: &str, date: &str, text: &str) -> RawMessage {
    let payload = MessagePart::leaf("text/plain", URL_SAFE_NO_PAD.encode(text))
        .with_header("Subject", "Alert : Update on your HDFC Bank Credit Card")
        .with_header("Date", date);
    RawMessage::new(id, payload)
}

/// End-to-end: alert emails → debit transactions → subscriptions → summary.
#[test]
fn test_summary_from_alert_batch() {
    let batch = vec![
        alert(
            "a1",
            "Mon, 06 May 2024 08:00:00 +0530",
            "Thank you for using your HDFC Bank Credit Card ending 4321 for Rs. 199.00 at NETFLIX COM on 06-05-2024 07:59:10.",
        ),
        alert(
            "a2",
            "Tue, 07 May 2024 08:00:00 +0530",
            "Thank you for using your HDFC Bank Credit Card ending 4321 for Rs. 119.00 at SPOTIFY INDIA on 07-05-2024 07:59:10.",
        ),
        alert(
            "a3",
            "Wed, 08 May 2024 08:00:00 +0530",
            "Thank you for using your HDFC Bank Credit Card ending 4321 for Rs. 1,499.00 at AMAZON PRIME MEMBERSHIP on 08-05-2024 07:59:10.",
        ),
        alert(
            "a4",
            "Thu, 09 May 2024 08:00:00 +0530",
            "Rs.1,499.00 credited to your card ending 4321. Info: AMAZON PRIME refund",
        ),
        alert(
            "a5",
            "Sat, 01 Jun 2024 09:00:00 +0530",
            "Rs.300.00 spent at ZOMATO on 01-06-24 Avl Bal Rs.9,000.00",
        ),
    ];

    let extractor = Extractor::new(Arc::new(NullSink));
    let now = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
    let txns = extractor.extract_transactions(&batch, now);
    assert_eq!(txns.len(), 4, "credit alert must be dropped");

    let subs = detect_subscriptions(&txns);
    let names: Vec<_> = subs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Netflix", "Spotify", "Amazon Prime"]);
    assert_eq!(subs[2].interval, BillingInterval::Yearly);

    let summary = summarize(&subs);
    assert_eq!(summary.monthly_total, 318.0);
    assert_eq!(summary.yearly_total, 1499.0);
    assert!((summary.yearly_monthly_equivalent - 1499.0 / 12.0).abs() < 1e-9);
    assert!((summary.total_monthly - (318.0 + 1499.0 / 12.0)).abs() < 1e-9);

    let wire = serde_json::to_value(summary).unwrap();
    assert_eq!(wire["monthlyTotal"], 318.0);
    assert_eq!(wire["yearlyTotal"], 1499.0);
    assert!(wire.get("yearlyMonthlyEquivalent").is_some());
    assert!(wire.get("totalMonthly").is_some());
    assert!(wire.get("monthly_total").is_none());

    let sub = serde_json::to_value(&subs[2]).unwrap();
    assert_eq!(sub["interval"], "yearly");
    assert_eq!(sub["currency"], "INR");

    let months = monthly_spend(&txns, chrono_tz::Asia::Kolkata);
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].month, "2024-05");
    assert_eq!(months[0].count, 3);
    assert_eq!(months[1].month, "2024-06");
    assert_eq!(months[1].total, 300.0);
}
