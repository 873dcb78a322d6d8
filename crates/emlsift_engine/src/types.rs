use std::fmt;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread;

use emlsift_core::{BatchSummary, EmailRecord, SideEffectOptions};

/// Per-file pipeline stages, strictly sequential within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decoding,
    ExtractingLinks,
    Building,
    SideEffects,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Decoding => write!(f, "decoding"),
            Stage::ExtractingLinks => write!(f, "extracting links"),
            Stage::Building => write!(f, "building record"),
            Stage::SideEffects => write!(f, "side effects"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub input_root: PathBuf,
    pub workers: NonZeroUsize,
    pub side_effects: SideEffectOptions,
    /// Sort records by input position instead of completion order.
    pub preserve_input_order: bool,
}

impl BatchSettings {
    pub fn new(input_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            workers: default_workers(),
            side_effects: SideEffectOptions::default(),
            preserve_input_order: true,
        }
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_side_effects(mut self, side_effects: SideEffectOptions) -> Self {
        self.side_effects = side_effects;
        self
    }

    pub fn with_preserve_input_order(mut self, preserve: bool) -> Self {
        self.preserve_input_order = preserve;
        self
    }
}

/// The host's available parallelism, or one worker when it cannot be queried.
pub fn default_workers() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// A candidate that produced no record, with the warning logged for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub records: Vec<EmailRecord>,
    pub summary: BatchSummary,
    /// In the order the failures were reported.
    pub skipped: Vec<SkippedFile>,
    pub side_effect_failures: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}
