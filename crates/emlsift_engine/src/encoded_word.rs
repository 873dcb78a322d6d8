//! RFC 2047 encoded-word decoding for header values.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use regex::Regex;

use crate::charset::CharsetRegistry;

static ENCODED_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"=\?([^?\s]+)\?([bBqQ])\?([^?\s]*)\?=").expect("ENCODED_WORD_RE regex")
});

// Mail agents routinely drop base64 padding inside encoded words.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes every encoded word in `value` through `registry`.
///
/// Whitespace between two adjacent encoded words is dropped. Words with an
/// unknown charset or a broken payload are kept verbatim.
pub fn decode_header_value(value: &str, registry: &CharsetRegistry) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_end = 0;
    let mut previous_was_word = false;

    for caps in ENCODED_WORD_RE.captures_iter(value) {
        let Some(whole) = caps.get(0) else { continue };
        let gap = &value[last_end..whole.start()];
        if !(previous_was_word && gap.trim().is_empty()) {
            out.push_str(gap);
        }

        match decode_word(&caps[1], &caps[2], &caps[3], registry) {
            Some(text) => {
                out.push_str(&text);
                previous_was_word = true;
            }
            None => {
                out.push_str(whole.as_str());
                previous_was_word = false;
            }
        }
        last_end = whole.end();
    }
    out.push_str(&value[last_end..]);
    out
}

fn decode_word(charset: &str, encoding: &str, payload: &str, registry: &CharsetRegistry) -> Option<String> {
    // RFC 2231 language suffix: `utf-8*en`.
    let label = charset.split('*').next().unwrap_or(charset);
    let bytes = match encoding {
        "B" | "b" => LENIENT_BASE64.decode(payload).ok()?,
        _ => decode_q(payload),
    };
    registry
        .decode(label, &bytes)
        .ok()
        .map(|text| text.into_owned())
}

fn decode_q(payload: &str) -> Vec<u8> {
    let raw = payload.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'_' => out.push(b' '),
            b'=' => match (raw.get(i + 1), raw.get(i + 2)) {
                (Some(&hi), Some(&lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    out.push((hex_value(hi) << 4) | hex_value(lo));
                    i += 2;
                }
                _ => out.push(b'='),
            },
            other => out.push(other),
        }
        i += 1;
    }
    out
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: &str) -> String {
        decode_header_value(value, &CharsetRegistry::new())
    }

    #[test]
    fn plain_values_are_untouched() {
        assert_eq!(decode("Quarterly report"), "Quarterly report");
    }

    #[test]
    fn base64_and_q_words_decode() {
        assert_eq!(decode("=?UTF-8?B?7ZqM7J2Y?="), "회의");
        assert_eq!(decode("=?iso-8859-1?Q?caf=E9_au_lait?="), "café au lait");
    }

    #[test]
    fn adjacent_words_join_without_whitespace() {
        assert_eq!(decode("=?UTF-8?Q?Hello_?= \r\n =?UTF-8?Q?World?= !"), "Hello World !");
    }

    #[test]
    fn legacy_korean_word_goes_through_registry() {
        // "안녕" in EUC-KR.
        assert_eq!(decode("=?ks_c_5601-1987?B?vsiz5w==?="), "안녕");
    }

    #[test]
    fn unpadded_base64_is_accepted() {
        assert_eq!(decode("=?utf-8?b?aGk?="), "hi");
    }

    #[test]
    fn unknown_charset_keeps_word_verbatim() {
        assert_eq!(decode("Re: =?x-bogus?Q?abc?="), "Re: =?x-bogus?Q?abc?=");
    }
}
