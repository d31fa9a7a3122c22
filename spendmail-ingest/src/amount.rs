//! Amount/currency extraction.
//!
//! Rupee notations are tried before dollar notations; the first hit of the
//! highest-priority notation wins regardless of position in the body.
//!
//! A spaced `Rs`/`INR` must start a word. Glued to the preceding word,
//! `Rs`/`Rs.` counts only when the digits follow immediately (`forRs.500`).

use regex::Regex;
use spendmail_core::{AmountMatch, Currency};
use std::sync::OnceLock;

fn inr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:₹\s*|\b(?:Rs\.?|INR)\s*|Rs\.?)(\d+(?:,\d+)*(?:\.\d{1,2})?)")
            .expect("invalid inr regex")
    })
}

fn usd_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\s*(\d+(?:,\d+)*(?:\.\d{1,2})?)").expect("invalid usd regex"))
}

fn parse_amount(raw: &str) -> Option<f64> {
    let amount: f64 = raw.replace(',', "").parse().ok()?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn first_match(re: &Regex, text: &str, currency: Currency) -> Option<AmountMatch> {
    let caps = re.captures(text)?;
    let amount = parse_amount(caps.get(1)?.as_str())?;
    Some(AmountMatch { amount, currency })
}

/// Find the first monetary amount in `text`, or `None` to skip the message.
pub fn extract_amount(text: &str) -> Option<AmountMatch> {
    first_match(inr_re(), text, Currency::Inr).or_else(|| first_match(usd_re(), text, Currency::Usd))
}
