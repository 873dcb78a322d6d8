//! Rendering of extracted records for stdout.

use std::io;

use emlsift_core::EmailRecord;

const CSV_HEADER: [&str; 11] = [
    "folder",
    "subject",
    "from_name",
    "from_email",
    "to_name",
    "to_email",
    "sent_date",
    "originating_ip",
    "urls",
    "url_domains",
    "original_file",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

pub trait OutputFormatter {
    fn format_records(&self, records: &[EmailRecord]) -> io::Result<String>;
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Csv => Box::new(CsvFormatter::new(true)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

/// One row per record; `urls` and `url_domains` are newline separated inside their cell.
pub struct CsvFormatter {
    include_header: bool,
}

impl CsvFormatter {
    pub fn new(include_header: bool) -> Self {
        Self { include_header }
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_records(&self, records: &[EmailRecord]) -> io::Result<String> {
        let mut output = String::new();
        if self.include_header {
            push_row(&mut output, CSV_HEADER);
        }
        for record in records {
            let urls = record.urls().join("\n");
            let domains = record.url_domains().join("\n");
            push_row(
                &mut output,
                [
                    record.folder(),
                    record.subject(),
                    record.from_name(),
                    record.from_email(),
                    record.to_name(),
                    record.to_email(),
                    record.sent_date(),
                    record.originating_ip(),
                    urls.as_str(),
                    domains.as_str(),
                    record.original_file(),
                ],
            );
        }
        Ok(output)
    }
}

fn push_row<'a>(output: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        push_field(output, field);
    }
    output.push('\n');
}

fn push_field(output: &mut String, field: &str) {
    if !needs_quotes(field) {
        output.push_str(field);
        return;
    }
    output.push('"');
    output.push_str(&field.replace('"', "\"\""));
    output.push('"');
}

fn needs_quotes(field: &str) -> bool {
    if field.is_empty() {
        return false;
    }
    if field.contains([',', '"', '\r', '\n']) {
        return true;
    }
    field.starts_with(char::is_whitespace)
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_records(&self, records: &[EmailRecord]) -> io::Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(records).map_err(io::Error::other)?
        } else {
            serde_json::to_string(records).map_err(io::Error::other)?
        };
        Ok(format!("{json}\n"))
    }
}
