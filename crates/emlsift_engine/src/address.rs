#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use mailparse::{addrparse, MailAddr, SingleInfo};
use regex::Regex;

use crate::charset::CharsetRegistry;
use crate::encoded_word::decode_header_value;

/// Optional quoted or bare display name, then an optionally bracketed address.
static PERMISSIVE_MAILBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^(?:"?([^"]*)"?\s*)?<?([a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,})>?$"#)
        .expect("PERMISSIVE_MAILBOX_RE regex")
});

/// Display name and address of one mailbox; both may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mailbox {
    pub name: String,
    pub address: String,
}

/// Parses the first mailbox of an address header.
///
/// Tries a standards-compliant parse first, then a permissive pattern. When
/// both fail the name is empty and the address is the input with surrounding
/// spaces and double quotes removed. Never fails.
pub fn parse_mailbox(raw: &str, registry: &CharsetRegistry) -> Mailbox {
    let mut mailbox = parse_strict(raw)
        .or_else(|| parse_permissive(raw))
        .unwrap_or_else(|| Mailbox {
            name: String::new(),
            address: raw.trim_matches([' ', '"'].as_ref()).to_string(),
        });
    if mailbox.name.contains("=?") {
        mailbox.name = decode_header_value(&mailbox.name, registry);
    }
    mailbox
}

fn parse_strict(raw: &str) -> Option<Mailbox> {
    let list = addrparse(raw).ok()?;
    let first: SingleInfo = match list.iter().next()? {
        MailAddr::Single(info) => info.clone(),
        MailAddr::Group(group) => group.addrs.first()?.clone(),
    };
    if !is_plausible_address(&first.addr) {
        return None;
    }
    Some(Mailbox {
        name: first.display_name.unwrap_or_default().trim().to_string(),
        address: first.addr,
    })
}

fn parse_permissive(raw: &str) -> Option<Mailbox> {
    let caps = PERMISSIVE_MAILBOX_RE.captures(raw.trim())?;
    Some(Mailbox {
        name: caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        address: caps.get(2)?.as_str().trim().to_string(),
    })
}

fn is_plausible_address(addr: &str) -> bool {
    match addr.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !addr.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
