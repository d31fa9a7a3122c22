//! Direction classification by keyword over the lower-cased body.
//!
//! Rules are checked in order; a credit keyword anywhere beats any debit
//! keyword.

use regex::Regex;
use spendmail_core::TransactionType;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
enum Matcher {
    Keyword(&'static str),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, lower: &str) -> bool {
        match self {
            Matcher::Keyword(k) => lower.contains(k),
            Matcher::Pattern(re) => re.is_match(lower),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectionRule {
    pub direction: TransactionType,
    matchers: Vec<Matcher>,
}

impl DirectionRule {
    /// Any of `keywords` (lower-case) selects `direction`
    pub fn keywords(direction: TransactionType, keywords: &[&'static str]) -> Self {
        Self {
            direction,
            matchers: keywords.iter().copied().map(Matcher::Keyword).collect(),
        }
    }

    /// Add a regex alternative, matched against the lower-cased body
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.matchers.push(Matcher::Pattern(Regex::new(pattern)?));
        Ok(self)
    }

    fn matches(&self, lower: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(lower))
    }
}

#[derive(Debug, Clone)]
pub struct DirectionClassifier {
    rules: Vec<DirectionRule>,
}

impl Default for DirectionClassifier {
    fn default() -> Self {
        let credit = DirectionRule::keywords(TransactionType::Credit, &["credited"]);
        let debit = DirectionRule::keywords(
            TransactionType::Debit,
            &["debited", "spent", "purchase", "upi txn"],
        )
        .with_pattern(r"using your .*card.* for")
        .expect("invalid card usage regex");
        Self::new(vec![credit, debit])
    }
}

impl DirectionClassifier {
    pub fn new(rules: Vec<DirectionRule>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, body: &str) -> TransactionType {
        let lower = body.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.matches(&lower))
            .map(|r| r.direction)
            .unwrap_or(TransactionType::Unknown)
    }
}

/// Classify with the default rule set
pub fn classify_direction(body: &str) -> TransactionType {
    static DEFAULT: OnceLock<DirectionClassifier> = OnceLock::new();
    DEFAULT.get_or_init(DirectionClassifier::default).classify(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_wins_over_debit() {
        let body = "Rs.500 debited from a/c 1234 and credited to a/c 5678";
        assert_eq!(classify_direction(body), TransactionType::Credit);
    }

    #[test]
    fn test_debit_keywords() {
        assert_eq!(classify_direction("Rs.500 DEBITED"), TransactionType::Debit);
        assert_eq!(classify_direction("Rs.500 spent at X"), TransactionType::Debit);
        assert_eq!(classify_direction("purchase of Rs.10"), TransactionType::Debit);
        assert_eq!(classify_direction("You have done a UPI txn"), TransactionType::Debit);
        assert_eq!(
            classify_direction("Thank you for using your HDFC Bank Credit Card ending 1234 for Rs 99"),
            TransactionType::Debit
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify_direction("Your OTP is Rs.0"), TransactionType::Unknown);
        assert_eq!(classify_direction(""), TransactionType::Unknown);
    }

    #[test]
    fn test_custom_rules() {
        let classifier = DirectionClassifier::new(vec![DirectionRule::keywords(
            TransactionType::Debit,
            &["withdrawn"],
        )]);
        assert_eq!(classifier.classify("Rs.100 WITHDRAWN at ATM"), TransactionType::Debit);
        assert_eq!(classifier.classify("Rs.100 debited"), TransactionType::Unknown);
    }
}
