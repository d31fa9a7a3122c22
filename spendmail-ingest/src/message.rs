//! Raw mail payloads as returned by the provider (`format=full` message JSON).
//!
//! The part tree is deserialized as-is and classified on demand through
//! [`MessagePart::view`], which tags every node as a text leaf, a container,
//! or something the body extractor ignores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NO_SUBJECT: &str = "[No Subject]";

/// One message from the mail collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub id: String,
    pub thread_id: Option<String>,
    /// Receive time in epoch milliseconds, as a decimal string
    pub internal_date: Option<String>,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
}

/// A node of the MIME part tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    pub part_id: Option<String>,
    #[serde(default)]
    pub mime_type: String,
    pub filename: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default)]
    pub size: u64,
    /// Base64 (usually URL-safe) encoded content
    pub data: Option<String>,
    pub attachment_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Plain,
    Html,
}

/// Tagged view over a part: leaf with data, container with children, or neither
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartView<'a> {
    Text { kind: TextKind, data: &'a str },
    Container(&'a [MessagePart]),
    Opaque,
}

impl MessagePart {
    /// A leaf part carrying already-encoded data
    pub fn leaf(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        let data = data.into();
        Self {
            mime_type: mime_type.into(),
            body: Some(PartBody {
                size: data.len() as u64,
                data: Some(data),
                attachment_id: None,
            }),
            ..Default::default()
        }
    }

    /// A container part (multipart/*)
    pub fn multipart(mime_type: impl Into<String>, parts: Vec<MessagePart>) -> Self {
        Self {
            mime_type: mime_type.into(),
            parts,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    fn data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }

    fn text_kind(&self) -> Option<TextKind> {
        if self.mime_type.eq_ignore_ascii_case("text/plain") {
            Some(TextKind::Plain)
        } else if self.mime_type.eq_ignore_ascii_case("text/html") {
            Some(TextKind::Html)
        } else {
            None
        }
    }

    /// Classify this node. A text part with data is a leaf even if it also has
    /// children; a text part without data falls through to its children.
    pub fn view(&self) -> PartView<'_> {
        if let (Some(kind), Some(data)) = (self.text_kind(), self.data()) {
            return PartView::Text { kind, data };
        }
        if !self.parts.is_empty() {
            return PartView::Container(&self.parts);
        }
        PartView::Opaque
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

impl RawMessage {
    pub fn new(id: impl Into<String>, payload: MessagePart) -> Self {
        Self {
            id: id.into(),
            payload: Some(payload),
            ..Default::default()
        }
    }

    /// Top-level header value, if the payload and header exist
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.as_ref().and_then(|p| p.header(name))
    }

    pub fn subject(&self) -> &str {
        self.header("subject")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_SUBJECT)
    }

    pub fn sender(&self) -> Option<&str> {
        self.header("from")
    }

    /// Sent time: `Date` header, then `internalDate`, then `now`.
    pub fn sent_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.header("date")
            .and_then(parse_date_header)
            .or_else(|| {
                self.internal_date
                    .as_deref()
                    .and_then(|ms| ms.trim().parse::<i64>().ok())
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
            })
            .unwrap_or(now)
    }
}

/// Parse an RFC 2822 `Date` header, tolerating a trailing `(ZONE)` comment.
pub fn parse_date_header(raw: &str) -> Option<DateTime<Utc>> {
    let mut s = raw.trim();
    if s.ends_with(')') {
        if let Some(idx) = s.rfind('(') {
            s = s[..idx].trim_end();
        }
    }
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_deserializes_provider_json() {
        let json = r#"{
            "id": "18f0a1b2c3",
            "threadId": "18f0a1b2c3",
            "internalDate": "1715488200000",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    {"name": "Subject", "value": "You have done a UPI txn"},
                    {"name": "Date", "value": "Sun, 12 May 2024 10:00:00 +0530 (IST)"}
                ],
                "body": {"size": 0},
                "parts": [
                    {"partId": "0", "mimeType": "text/plain", "body": {"size": 5, "data": "aGVsbG8"}}
                ]
            }
        }"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "18f0a1b2c3");
        assert_eq!(msg.subject(), "You have done a UPI txn");

        let payload = msg.payload.as_ref().unwrap();
        match payload.view() {
            PartView::Container(children) => assert_eq!(children.len(), 1),
            other => panic!("expected container, got {:?}", other),
        }
        assert_eq!(
            payload.parts[0].view(),
            PartView::Text { kind: TextKind::Plain, data: "aGVsbG8" }
        );
    }

    #[test]
    fn test_view_text_without_data_falls_through() {
        let empty_leaf = MessagePart::leaf("text/plain", "");
        assert_eq!(empty_leaf.view(), PartView::Opaque);

        let mut html_shell = MessagePart::multipart("text/html", vec![MessagePart::leaf("text/plain", "eA")]);
        html_shell.body = Some(PartBody::default());
        assert!(matches!(html_shell.view(), PartView::Container(_)));

        let image = MessagePart::leaf("image/png", "iVBORw0KGgo");
        assert_eq!(image.view(), PartView::Opaque);
    }

    #[test]
    fn test_subject_placeholder() {
        let msg = RawMessage::new("m1", MessagePart::leaf("text/plain", "eA"));
        assert_eq!(msg.subject(), NO_SUBJECT);

        let bare = RawMessage::default();
        assert_eq!(bare.subject(), NO_SUBJECT);
        assert_eq!(bare.sender(), None);
    }

    #[test]
    fn test_sent_at_prefers_date_header() {
        let payload = MessagePart::leaf("text/plain", "eA")
            .with_header("DATE", "Sun, 12 May 2024 10:00:00 +0530 (IST)");
        let mut msg = RawMessage::new("m1", payload);
        msg.internal_date = Some("1000".to_string());

        let expected = Utc.with_ymd_and_hms(2024, 5, 12, 4, 30, 0).unwrap();
        assert_eq!(msg.sent_at(now()), expected);
    }

    #[test]
    fn test_sent_at_falls_back_to_internal_date_then_now() {
        let payload = MessagePart::leaf("text/plain", "eA").with_header("Date", "not a date");
        let mut msg = RawMessage::new("m1", payload);
        msg.internal_date = Some("1715488200000".to_string());
        assert_eq!(
            msg.sent_at(now()),
            Utc.with_ymd_and_hms(2024, 5, 12, 4, 30, 0).unwrap()
        );

        msg.internal_date = None;
        assert_eq!(msg.sent_at(now()), now());
    }
}
