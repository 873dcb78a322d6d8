use std::fs;
use std::sync::Once;

use base64::Engine as _;
use emlsift_engine::{CharsetError, CharsetRegistry, EnvelopeDecoder, EnvelopeError, Mailbox};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn decoder() -> EnvelopeDecoder {
    EnvelopeDecoder::new(CharsetRegistry::new())
}

#[test]
fn multipart_message_yields_headers_and_base64_html_part() {
    init_logging();
    let html = r#"<p><a href="https://news.example.org/a">read</a></p>"#;
    let encoded = base64::engine::general_purpose::STANDARD.encode(html);
    let raw = format!(
        "From: \"Jane Doe\" <jane@example.com>\r\n\
         To: Team <team@example.com>\r\n\
         Subject: Weekly\r\n digest\r\n\
         Date: Tue, 26 Mar 2024 15:30:15 +0900\r\n\
         X-Originating-IP: [203.0.113.5]\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
         \r\n\
         --b1\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         plain text http://plain.example/ignored\r\n\
         --b1\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Transfer-Encoding: base64\r\n\
         \r\n\
         {encoded}\r\n\
         --b1--\r\n"
    );

    let envelope = decoder().decode_bytes(raw.as_bytes()).unwrap();

    assert_eq!(envelope.subject, "Weekly digest");
    assert_eq!(
        envelope.from,
        Mailbox {
            name: "Jane Doe".into(),
            address: "jane@example.com".into()
        }
    );
    assert_eq!(envelope.to.address, "team@example.com");
    assert_eq!(envelope.sent_date, "2024-03-26 15:30:15");
    assert_eq!(envelope.originating_ip, "203.0.113.5");
    assert_eq!(envelope.html.trim(), html);
}

#[test]
fn quoted_printable_html_is_transfer_decoded() {
    init_logging();
    let raw = "Subject: qp\r\n\
               Content-Type: text/html; charset=us-ascii\r\n\
               Content-Transfer-Encoding: quoted-printable\r\n\
               \r\n\
               <a href=3D\"http://qp.example/x\">x</a>=\r\n\
               <b>tail</b>\r\n";

    let envelope = decoder().decode_bytes(raw.as_bytes()).unwrap();
    assert_eq!(
        envelope.html.trim(),
        r#"<a href="http://qp.example/x">x</a><b>tail</b>"#
    );
}

#[test]
fn korean_legacy_body_and_header_go_through_registry() {
    init_logging();
    // "안녕" in EUC-KR.
    let annyeong: &[u8] = &[0xbe, 0xc8, 0xb3, 0xe7];
    let mut raw = Vec::new();
    raw.extend_from_slice(b"Subject: =?ks_c_5601-1987?B?vsiz5w==?=\r\n");
    raw.extend_from_slice(b"Content-Type: text/html; charset=\"EUC-KR\"\r\n");
    raw.extend_from_slice(b"Content-Transfer-Encoding: 8bit\r\n\r\n<p>");
    raw.extend_from_slice(annyeong);
    raw.extend_from_slice(b"</p>\r\n");

    let envelope = decoder().decode_bytes(&raw).unwrap();
    assert_eq!(envelope.subject, "안녕");
    assert_eq!(envelope.html.trim(), "<p>안녕</p>");
}

#[test]
fn raw_eight_bit_header_uses_declared_message_charset() {
    init_logging();
    let mut raw = Vec::new();
    raw.extend_from_slice(b"Subject: ");
    raw.extend_from_slice(&[0xbe, 0xc8, 0xb3, 0xe7]);
    raw.extend_from_slice(b"\r\nContent-Type: text/html; charset=euc-kr\r\n\r\n<p>x</p>\r\n");

    let envelope = decoder().decode_bytes(&raw).unwrap();
    assert_eq!(envelope.subject, "안녕");
}

#[test]
fn missing_date_and_addresses_leave_fields_empty() {
    init_logging();
    let raw = "Subject: no date\r\nContent-Type: text/plain\r\n\r\nhello\r\n";

    let envelope = decoder().decode_bytes(raw.as_bytes()).unwrap();
    assert_eq!(envelope.sent_date, "");
    assert_eq!(envelope.from, Mailbox::default());
    assert_eq!(envelope.to, Mailbox::default());
    assert_eq!(envelope.originating_ip, "");
    assert_eq!(envelope.html, "");
}

#[test]
fn unparseable_date_is_empty_not_an_error() {
    init_logging();
    let raw = "Subject: s\r\nDate: sometime last week\r\n\r\nbody\r\n";
    let envelope = decoder().decode_bytes(raw.as_bytes()).unwrap();
    assert_eq!(envelope.sent_date, "");
}

#[test]
fn unknown_body_charset_fails_the_file() {
    init_logging();
    let raw = "Subject: s\r\nContent-Type: text/html; charset=x-no-such-charset\r\n\r\n<p>x</p>\r\n";

    let err = decoder().decode_bytes(raw.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        EnvelopeError::Charset(CharsetError::UnknownLabel(ref label)) if label == "x-no-such-charset"
    ));
}

#[test]
fn empty_file_is_a_structural_failure() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("empty.eml");
    fs::write(&path, b"").unwrap();

    assert!(decoder().decode_path(&path).is_err());
}

#[test]
fn missing_file_is_an_io_failure() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let err = decoder().decode_path(&temp.path().join("gone.eml")).unwrap_err();
    assert!(matches!(err, EnvelopeError::Io(_)));
}

#[test]
fn multiple_originating_ips_are_split_per_line() {
    init_logging();
    let raw = "Subject: s\r\nX-Originating-IP: [203.0.113.5], [198.51.100.7]\r\n\r\nbody\r\n";
    let envelope = decoder().decode_bytes(raw.as_bytes()).unwrap();
    assert_eq!(envelope.originating_ip, "203.0.113.5\n198.51.100.7");
}
