//! Description cascade: an ordered list of capture rules tried against the
//! alert body. The first rule whose capture survives normalization wins.
//!
//! Rule order is data. Bank-specific patterns are added by building a
//! [`DescriptionCascade`] from a custom rule list.

use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_PLACEHOLDER: &str = "Bank Transaction";

/// One named pattern; capture group 1 is the description.
#[derive(Debug, Clone)]
pub struct DescriptionRule {
    pub name: &'static str,
    pattern: Regex,
}

impl DescriptionRule {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
        })
    }

    fn capture<'t>(&self, body: &'t str) -> Option<&'t str> {
        self.pattern.captures(body)?.get(1).map(|m| m.as_str())
    }
}

/// Result of running the cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDescription {
    /// Name of the matching rule, `None` when the placeholder was used
    pub rule: Option<&'static str>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct DescriptionCascade {
    rules: Vec<DescriptionRule>,
    placeholder: String,
}

const DATE_CLAUSE: &str = r"\s+on\s+\d{1,2}[-/](?:\d{1,2}|[A-Za-z]{3})[-/]\d{2,4}";

fn default_rules() -> Vec<DescriptionRule> {
    let specs: [(&'static str, String); 4] = [
        (
            "card_spend",
            format!(
                r"(?i)Rs\.\s*\d+(?:,\d+)*\.?\d*\s*(?:at|spent\s*at|purchase\s*at)\s+(.*?)(?:{DATE_CLAUSE}|Avl\s+Bal|\.\s|Ref\.No)"
            ),
        ),
        (
            "upi_payee",
            r"(?i)UPI.*txn.*of Rs\.?\s*\d+.*(?:to|payee)\s+([^(\[{\n\r@]+)".to_string(),
        ),
        (
            "debited_to",
            r"(?i)debited\s+from.*?\s*to\s+([^\n\r.]+)".to_string(),
        ),
        ("info_field", r"(?i)Info:\s*([^\n\r]+)".to_string()),
    ];
    specs
        .into_iter()
        .map(|(name, pattern)| DescriptionRule::new(name, &pattern).expect("invalid description rule"))
        .collect()
}

impl Default for DescriptionCascade {
    fn default() -> Self {
        Self::new(default_rules(), DEFAULT_PLACEHOLDER)
    }
}

impl DescriptionCascade {
    pub fn new(rules: Vec<DescriptionRule>, placeholder: impl Into<String>) -> Self {
        Self {
            rules,
            placeholder: placeholder.into(),
        }
    }

    /// Keep the rules, replace the fallback text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &DescriptionRule> {
        self.rules.iter()
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Run the rules in order. Never fails; falls back to the placeholder.
    pub fn extract(&self, body: &str) -> ExtractedDescription {
        for rule in &self.rules {
            let Some(raw) = rule.capture(body) else {
                continue;
            };
            let text = normalize_description(raw);
            if !text.is_empty() {
                return ExtractedDescription {
                    rule: Some(rule.name),
                    text,
                };
            }
        }
        ExtractedDescription {
            rule: None,
            text: self.placeholder.clone(),
        }
    }
}

struct Normalizers {
    vpa_prefix: Regex,
    email: Regex,
    trailing_date: Regex,
    trailing_ref: Regex,
    ws: Regex,
}

fn normalizers() -> &'static Normalizers {
    static N: OnceLock<Normalizers> = OnceLock::new();
    N.get_or_init(|| Normalizers {
        vpa_prefix: Regex::new(r"(?i)^VPA\s+").expect("invalid vpa regex"),
        email: Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").expect("invalid email regex"),
        trailing_date: Regex::new(&format!(r"(?i){DATE_CLAUSE}$")).expect("invalid date regex"),
        trailing_ref: Regex::new(r"(?i)\s+Ref\.No.*$").expect("invalid ref regex"),
        ws: Regex::new(r"\s+").expect("invalid ws regex"),
    })
}

fn normalize_once(desc: &str) -> String {
    let n = normalizers();
    let s = desc.trim();
    let s = n.vpa_prefix.replace(s, "");
    let s = n.email.replace_all(&s, "");
    let s = n.trailing_date.replace(&s, "");
    let s = n.trailing_ref.replace(&s, "");
    let s = s.strip_suffix('.').unwrap_or(&*s);
    n.ws.replace_all(s, " ").trim().to_string()
}

/// Clean a captured description. Repeats until stable, so applying it to its
/// own output is a no-op.
pub fn normalize_description(desc: &str) -> String {
    let mut current = normalize_once(desc);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
