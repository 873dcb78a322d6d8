//! Emlsift engine: message decoding, link extraction, side effects and the
//! worker pool that runs them over a batch of files.
mod address;
mod builder;
mod charset;
mod dispatch;
mod encoded_word;
mod engine;
mod envelope;
mod links;
mod persist;
mod pipeline;
mod types;

pub use address::{parse_mailbox, Mailbox};
pub use builder::build_record;
pub use charset::{Charset, CharsetError, CharsetRegistry};
pub use dispatch::{DispatchReport, SideEffectDispatcher, SideEffectError};
pub use encoded_word::decode_header_value;
pub use engine::BatchOrchestrator;
pub use envelope::{
    normalize_originating_ip, parse_sent_date, Envelope, EnvelopeDecoder, EnvelopeError,
};
pub use links::{url_domains, DocumentError, ExtractedLinks, LinkExtractor, LinkSource};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{FilePipeline, ProcessedFile};
pub use types::{default_workers, BatchError, BatchReport, BatchSettings, SkippedFile, Stage};
