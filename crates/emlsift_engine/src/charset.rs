use std::borrow::Cow;
use std::io::{self, Read};

use encoding_rs::Encoding;

#[derive(Debug, thiserror::Error)]
pub enum CharsetError {
    #[error("no decoder for charset label {0:?}")]
    UnknownLabel(String),
    #[error("failed to read encoded bytes: {0}")]
    Io(#[from] io::Error),
}

/// Byte-to-text strategy selected for a charset label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// EUC-KR and its KS_C_5601-1987 alias.
    Korean,
    /// Exact ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Latin2,
    Windows1252,
    Windows1251,
    Iso2022Jp,
    /// No transform; invalid UTF-8 is replaced.
    Ascii,
    /// GB18030, also used for its GB2312 subset.
    Gb18030,
    Big5,
    /// Anything else the WHATWG label resolver knows.
    Resolved(&'static Encoding),
}

const BUILTIN_LABELS: &[(&str, Charset)] = &[
    ("euc-kr", Charset::Korean),
    ("ks_c_5601-1987", Charset::Korean),
    ("iso-8859-1", Charset::Latin1),
    ("iso-8859-2", Charset::Latin2),
    ("windows-1252", Charset::Windows1252),
    ("windows-1251", Charset::Windows1251),
    ("iso-2022-jp", Charset::Iso2022Jp),
    ("ascii", Charset::Ascii),
    ("us-ascii", Charset::Ascii),
    ("gb2312", Charset::Gb18030),
    ("big5", Charset::Big5),
];

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
            other => other.encoding().map(Encoding::name).unwrap_or("UTF-8"),
        }
    }

    /// Decodes `bytes` into text; malformed sequences become U+FFFD.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Charset::Ascii => String::from_utf8_lossy(bytes),
            Charset::Latin1 => encoding_rs::mem::decode_latin1(bytes),
            other => match other.encoding() {
                Some(encoding) => encoding.decode_without_bom_handling(bytes).0,
                None => String::from_utf8_lossy(bytes),
            },
        }
    }

    fn encoding(&self) -> Option<&'static Encoding> {
        match self {
            Charset::Korean => Some(encoding_rs::EUC_KR),
            Charset::Latin2 => Some(encoding_rs::ISO_8859_2),
            Charset::Windows1252 => Some(encoding_rs::WINDOWS_1252),
            Charset::Windows1251 => Some(encoding_rs::WINDOWS_1251),
            Charset::Iso2022Jp => Some(encoding_rs::ISO_2022_JP),
            Charset::Gb18030 => Some(encoding_rs::GB18030),
            Charset::Big5 => Some(encoding_rs::BIG5),
            Charset::Resolved(encoding) => Some(encoding),
            Charset::Latin1 | Charset::Ascii => None,
        }
    }
}

/// Maps charset labels to decoders.
///
/// Lookup order: caller aliases, the built-in table, then the generic
/// WHATWG label resolver. Labels compare case-insensitively. The registry is
/// immutable once built and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct CharsetRegistry {
    aliases: Vec<(String, Charset)>,
}

impl CharsetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or overrides a label without touching the built-in table.
    pub fn with_alias(mut self, label: &str, charset: Charset) -> Self {
        self.aliases.push((label.trim().to_ascii_lowercase(), charset));
        self
    }

    pub fn resolve(&self, label: &str) -> Result<Charset, CharsetError> {
        let normalized = normalize_label(label);

        if let Some((_, charset)) = self.aliases.iter().rev().find(|(l, _)| *l == normalized) {
            return Ok(*charset);
        }
        if let Some((_, charset)) = BUILTIN_LABELS.iter().find(|(l, _)| *l == normalized) {
            return Ok(*charset);
        }
        Encoding::for_label(normalized.as_bytes())
            .map(Charset::Resolved)
            .ok_or_else(|| CharsetError::UnknownLabel(label.to_string()))
    }

    pub fn decode<'a>(&self, label: &str, bytes: &'a [u8]) -> Result<Cow<'a, str>, CharsetError> {
        Ok(self.resolve(label)?.decode(bytes))
    }

    /// Reads the whole stream and decodes it with the charset for `label`.
    pub fn decode_reader<R: Read>(&self, label: &str, mut reader: R) -> Result<String, CharsetError> {
        let charset = self.resolve(label)?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(charset.decode(&bytes).into_owned())
    }
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_matches(['"', '\''].as_ref())
        .to_ascii_lowercase()
}
