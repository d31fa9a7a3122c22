//! Message body extraction: flatten a part tree into one plain-text body.
//!
//! Plain parts are decoded as-is; HTML parts are decoded and reduced to text by
//! replacing tags with spaces. Every fragment ends with a newline, in
//! traversal (document) order.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{IngestError, Result};
use crate::message::{MessagePart, PartView, TextKind};

/// Nesting bound for part trees
pub const MAX_PART_DEPTH: usize = 50;

// Accepts padded or unpadded input and non-canonical trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"))
}

fn ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("invalid ws regex"))
}

/// Decode base64 in either the standard or URL-safe alphabet.
pub fn decode_part_data(data: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    LENIENT.decode(normalized)
}

/// Strip markup from decoded HTML and collapse whitespace.
pub fn html_to_text(html: &str) -> String {
    let stripped = tag_re().replace_all(html, " ");
    let decoded = decode_entities(&stripped);
    ws_re().replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn decode_text(kind: TextKind, mime_type: &str, data: &str) -> Result<String> {
    let bytes = decode_part_data(data).map_err(|source| IngestError::Decode {
        mime_type: mime_type.to_string(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(match kind {
        TextKind::Plain => text.into_owned(),
        TextKind::Html => html_to_text(&text),
    })
}

/// Accumulate the text of every plain/HTML part under `root`.
///
/// An absent root yields an empty body. Nodes nested deeper than
/// [`MAX_PART_DEPTH`] fail the whole message.
pub fn extract_body(root: Option<&MessagePart>) -> Result<String> {
    let mut out = String::new();
    let Some(root) = root else {
        return Ok(out);
    };

    let mut stack: Vec<(&MessagePart, usize)> = vec![(root, 1)];
    while let Some((part, depth)) = stack.pop() {
        if depth > MAX_PART_DEPTH {
            return Err(IngestError::PartTreeTooDeep {
                limit: MAX_PART_DEPTH,
            });
        }
        match part.view() {
            PartView::Text { kind, data } => {
                out.push_str(&decode_text(kind, &part.mime_type, data)?);
                out.push('\n');
            }
            PartView::Container(children) => {
                // Reverse so the first child is popped first.
                stack.extend(children.iter().rev().map(|c| (c, depth + 1)));
            }
            PartView::Opaque => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

    fn plain(text: &str) -> MessagePart {
        MessagePart::leaf("text/plain", URL_SAFE_NO_PAD.encode(text))
    }

    fn html(text: &str) -> MessagePart {
        MessagePart::leaf("text/html", URL_SAFE_NO_PAD.encode(text))
    }

    #[test]
    fn test_absent_root_is_empty() {
        assert_eq!(extract_body(None).unwrap(), "");
    }

    #[test]
    fn test_plain_part_is_newline_terminated() {
        let body = extract_body(Some(&plain("Rs.500 spent at AMAZON"))).unwrap();
        assert_eq!(body, "Rs.500 spent at AMAZON\n");
    }

    #[test]
    fn test_html_part_is_stripped_and_collapsed() {
        let part = html("<html><body><p>Dear Customer,</p>\n\n<b>Rs.1,200.00</b>&nbsp;debited</body></html>");
        let body = extract_body(Some(&part)).unwrap();
        assert_eq!(body, "Dear Customer, Rs.1,200.00 debited\n");
    }

    #[test]
    fn test_nested_parts_keep_document_order() {
        let tree = MessagePart::multipart(
            "multipart/mixed",
            vec![
                MessagePart::multipart("multipart/alternative", vec![plain("first"), html("<i>second</i>")]),
                MessagePart::leaf("application/pdf", STANDARD.encode("%PDF")),
                plain("third"),
            ],
        );
        assert_eq!(extract_body(Some(&tree)).unwrap(), "first\nsecond\nthird\n");
    }

    #[test]
    fn test_empty_iff_no_text_data() {
        let no_text = MessagePart::multipart(
            "multipart/mixed",
            vec![
                MessagePart::leaf("image/png", STANDARD.encode([0u8, 1, 2])),
                MessagePart::leaf("text/plain", ""),
                MessagePart::multipart("multipart/related", vec![]),
            ],
        );
        assert!(extract_body(Some(&no_text)).unwrap().is_empty());

        // Text data that decodes to nothing still contributes its newline.
        let blank_html = MessagePart::multipart("multipart/mixed", vec![html("<br/>")]);
        assert_eq!(extract_body(Some(&blank_html)).unwrap(), "\n");
    }

    #[test]
    fn test_accepts_padded_standard_alphabet() {
        let part = MessagePart::leaf("text/plain", STANDARD.encode("a?b>c"));
        assert_eq!(extract_body(Some(&part)).unwrap(), "a?b>c\n");
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let part = MessagePart::leaf("text/plain", "not*base64!");
        let err = extract_body(Some(&part)).unwrap_err();
        assert!(matches!(err, IngestError::Decode { .. }));
    }

    #[test]
    fn test_depth_bound() {
        let mut tree = plain("deep");
        for _ in 0..MAX_PART_DEPTH {
            tree = MessagePart::multipart("multipart/mixed", vec![tree]);
        }
        let err = extract_body(Some(&tree)).unwrap_err();
        assert!(matches!(err, IngestError::PartTreeTooDeep { limit: MAX_PART_DEPTH }));

        let mut shallow = plain("ok");
        for _ in 0..MAX_PART_DEPTH - 1 {
            shallow = MessagePart::multipart("multipart/mixed", vec![shallow]);
        }
        assert_eq!(extract_body(Some(&shallow)).unwrap(), "ok\n");
    }
}
