use std::path::Path;

use emlsift_core::EmailRecord;
use engine_logging::engine_trace;

use crate::builder::build_record;
use crate::dispatch::SideEffectDispatcher;
use crate::envelope::{EnvelopeDecoder, EnvelopeError};
use crate::links::LinkExtractor;
use crate::types::Stage;

/// Result of one successful pipeline run.
#[derive(Debug)]
pub struct ProcessedFile {
    pub record: EmailRecord,
    pub side_effect_failures: usize,
}

/// decode → extract → build → side effects, for a single file.
///
/// Holds only read-only configuration, so one instance is shared by all workers.
#[derive(Debug, Clone)]
pub struct FilePipeline {
    decoder: EnvelopeDecoder,
    links: LinkExtractor,
    dispatcher: SideEffectDispatcher,
}

impl FilePipeline {
    pub fn new(decoder: EnvelopeDecoder, links: LinkExtractor, dispatcher: SideEffectDispatcher) -> Self {
        Self {
            decoder,
            links,
            dispatcher,
        }
    }

    pub fn run(&self, path: &Path) -> Result<ProcessedFile, EnvelopeError> {
        engine_trace!("{}: {}", path.display(), Stage::Decoding);
        let envelope = self.decoder.decode_path(path)?;

        engine_trace!("{}: {}", path.display(), Stage::ExtractingLinks);
        let links = self.links.extract(&envelope.html);

        engine_trace!("{}: {}", path.display(), Stage::Building);
        let record = build_record(path, &envelope, links);

        let mut side_effect_failures = 0;
        if !self.dispatcher.is_empty() {
            engine_trace!("{}: {}", path.display(), Stage::SideEffects);
            side_effect_failures = self
                .dispatcher
                .dispatch(path, &record, &envelope.html)
                .failures
                .len();
        }

        Ok(ProcessedFile {
            record,
            side_effect_failures,
        })
    }
}
