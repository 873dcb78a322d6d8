use crate::BatchPhase;

/// Counts reported when a batch ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub phase: BatchPhase,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pending: usize,
}
