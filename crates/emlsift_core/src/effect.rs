use std::path::PathBuf;

use crate::JobId;

/// Actions the batch state machine asks its driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Push one candidate path onto the work queue.
    Enqueue { job_id: JobId, path: PathBuf },
    /// No more work will be enqueued; workers exit once the queue is empty.
    CloseQueue,
    /// A file was skipped; the driver reports it as a warning.
    ReportFailure {
        job_id: JobId,
        path: PathBuf,
        reason: String,
    },
}
