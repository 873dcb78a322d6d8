use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use engine_logging::engine_trace;
use mailparse::{MailHeaderMap, ParsedMail};

use crate::address::{parse_mailbox, Mailbox};
use crate::charset::{CharsetError, CharsetRegistry};
use crate::encoded_word::decode_header_value;

const SENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shapes seen in the wild that the RFC 2822 parser rejects.
const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M %z",
    "%a %b %d %H:%M:%S %Y %z",
];

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("failed to read message: {0}")]
    Io(#[from] io::Error),
    #[error("not a valid message: {0}")]
    Parse(#[from] mailparse::MailParseError),
    #[error("message has no header fields")]
    NoHeaders,
    #[error("failed to decode html body: {0}")]
    Charset(#[from] CharsetError),
}

/// Normalized header view of one message plus its first HTML body part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub subject: String,
    pub from: Mailbox,
    pub to: Mailbox,
    /// `YYYY-MM-DD HH:MM:SS` in the message's own offset, or empty.
    pub sent_date: String,
    pub originating_ip: String,
    /// Raw text of the first `text/html` part; empty when there is none.
    pub html: String,
}

#[derive(Debug, Clone, Default)]
pub struct EnvelopeDecoder {
    registry: CharsetRegistry,
}

impl EnvelopeDecoder {
    pub fn new(registry: CharsetRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CharsetRegistry {
        &self.registry
    }

    pub fn decode_path(&self, path: &Path) -> Result<Envelope, EnvelopeError> {
        let file = File::open(path)?;
        self.decode_reader(BufReader::new(file))
    }

    pub fn decode_reader<R: Read>(&self, mut reader: R) -> Result<Envelope, EnvelopeError> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        self.decode_bytes(&raw)
    }

    pub fn decode_bytes(&self, raw: &[u8]) -> Result<Envelope, EnvelopeError> {
        let mail = mailparse::parse_mail(raw)?;
        if mail.headers.is_empty() {
            return Err(EnvelopeError::NoHeaders);
        }

        let subject = decode_header_value(&self.header_text(&mail, "Subject"), &self.registry)
            .trim()
            .to_string();
        let from = parse_mailbox(&self.header_text(&mail, "From"), &self.registry);
        let to = parse_mailbox(&self.header_text(&mail, "To"), &self.registry);
        let sent_date = parse_sent_date(&self.header_text(&mail, "Date"));
        let originating_ip = normalize_originating_ip(&self.header_text(&mail, "X-Originating-IP"));
        let html = self.html_body(&mail)?;

        engine_trace!(
            "decoded envelope subject_len={} html_len={} dated={}",
            subject.len(),
            html.len(),
            !sent_date.is_empty()
        );

        Ok(Envelope {
            subject,
            from,
            to,
            sent_date,
            originating_ip,
            html,
        })
    }

    /// Unfolded raw value of the first header named `name`, or empty.
    ///
    /// Raw 8-bit values that are not UTF-8 are decoded with the charset the
    /// message declares at its top level.
    fn header_text(&self, mail: &ParsedMail<'_>, name: &str) -> String {
        let Some(header) = mail.headers.get_first_header(name) else {
            return String::new();
        };
        let bytes = header.get_value_raw();
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => self
                .registry
                .decode(&mail.ctype.charset, bytes)
                .map(|text| text.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        };
        unfold(&text).trim().to_string()
    }

    fn html_body(&self, mail: &ParsedMail<'_>) -> Result<String, EnvelopeError> {
        let Some(part) = find_html_part(mail) else {
            return Ok(String::new());
        };
        let bytes = part.get_body_raw()?;
        let text = self.registry.decode(&part.ctype.charset, &bytes)?;
        Ok(text.into_owned())
    }
}

/// First `text/html` part in declaration order, depth first.
fn find_html_part<'m, 'a>(part: &'m ParsedMail<'a>) -> Option<&'m ParsedMail<'a>> {
    if part.ctype.mimetype.to_ascii_lowercase().starts_with("text/html") {
        return Some(part);
    }
    part.subparts.iter().find_map(|sub| find_html_part(sub))
}

fn unfold(value: &str) -> String {
    value.replace(['\r', '\n'], "")
}

/// Formats the Date header as `YYYY-MM-DD HH:MM:SS`; empty when it cannot be parsed.
pub fn parse_sent_date(raw: &str) -> String {
    // Drop a trailing zone comment such as "(KST)" and collapse runs of spaces.
    let without_comment = raw.split('(').next().unwrap_or_default();
    let cleaned = without_comment.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return String::new();
    }

    parse_known_shapes(&cleaned)
        .or_else(|| unknown_zone_as_unspecified(&cleaned).and_then(|s| parse_known_shapes(&s)))
        .map(|dt| dt.format(SENT_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_known_shapes(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(value).ok().or_else(|| {
        FALLBACK_DATE_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(value, format).ok())
    })
}

/// Replaces a trailing alphabetic zone such as `KST` with `-0000`, keeping the wall-clock time.
fn unknown_zone_as_unspecified(value: &str) -> Option<String> {
    let (head, zone) = value.rsplit_once(' ')?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(format!("{head} -0000"))
}

/// Strips brackets and puts each comma separated entry on its own line.
pub fn normalize_originating_ip(raw: &str) -> String {
    raw.replace(['[', ']'], "")
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
