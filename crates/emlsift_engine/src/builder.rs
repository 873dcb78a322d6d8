use std::path::Path;

use emlsift_core::{EmailRecord, RecordFields};

use crate::envelope::Envelope;
use crate::links::ExtractedLinks;

/// Combines the decoded envelope and extracted links of `path` into a record.
pub fn build_record(path: &Path, envelope: &Envelope, links: ExtractedLinks) -> EmailRecord {
    EmailRecord::new(RecordFields {
        folder: parent_folder_name(path),
        subject: envelope.subject.clone(),
        from_name: envelope.from.name.clone(),
        from_email: envelope.from.address.clone(),
        to_name: envelope.to.name.clone(),
        to_email: envelope.to.address.clone(),
        sent_date: envelope.sent_date.clone(),
        originating_ip: envelope.originating_ip.clone(),
        urls: links.urls,
        url_domains: links.domains,
        original_file: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    })
}

/// Name of the directory that directly contains `path`.
///
/// A bare file name lives in `.`; a file at the file-system root reports the root itself.
fn parent_folder_name(path: &Path) -> String {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => ".".to_string(),
        Some(parent) => parent
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| parent.display().to_string()),
        None => ".".to_string(),
    }
}
