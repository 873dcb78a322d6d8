use serde::Serialize;

use crate::rename::canonical_filename;

/// Field values used to build an [`EmailRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub folder: String,
    pub subject: String,
    pub from_name: String,
    pub from_email: String,
    pub to_name: String,
    pub to_email: String,
    pub sent_date: String,
    pub originating_ip: String,
    pub urls: Vec<String>,
    pub url_domains: Vec<String>,
    pub original_file: String,
}

/// Metadata extracted from one message file.
///
/// Built once per successfully processed file and read-only afterwards.
/// Every string field is empty rather than missing when extraction fails
/// partially.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    folder: String,
    subject: String,
    from_name: String,
    from_email: String,
    to_name: String,
    to_email: String,
    sent_date: String,
    #[serde(rename = "originatingIP")]
    originating_ip: String,
    urls: Vec<String>,
    url_domains: Vec<String>,
    original_file: String,
}

impl EmailRecord {
    pub fn new(fields: RecordFields) -> Self {
        Self {
            folder: fields.folder,
            subject: fields.subject,
            from_name: fields.from_name,
            from_email: fields.from_email,
            to_name: fields.to_name,
            to_email: fields.to_email,
            sent_date: fields.sent_date,
            originating_ip: fields.originating_ip,
            urls: fields.urls,
            url_domains: fields.url_domains,
            original_file: fields.original_file,
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn from_name(&self) -> &str {
        &self.from_name
    }

    pub fn from_email(&self) -> &str {
        &self.from_email
    }

    pub fn to_name(&self) -> &str {
        &self.to_name
    }

    pub fn to_email(&self) -> &str {
        &self.to_email
    }

    /// `YYYY-MM-DD HH:MM:SS`, or empty when the Date header was missing or unparseable.
    pub fn sent_date(&self) -> &str {
        &self.sent_date
    }

    /// Newline separated when the header carried several comma separated values.
    pub fn originating_ip(&self) -> &str {
        &self.originating_ip
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn url_domains(&self) -> &[String] {
        &self.url_domains
    }

    pub fn original_file(&self) -> &str {
        &self.original_file
    }

    /// Canonical `<timestamp> <subject>.eml` name for rename and copy.
    pub fn rename_target(&self) -> String {
        canonical_filename(&self.sent_date, &self.subject)
    }
}
