use std::path::PathBuf;

use crate::{EmailRecord, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Candidate enumeration finished; paths are in input order.
    PathsCollected(Vec<PathBuf>),
    /// Every path has been handed to the work queue.
    QueueClosed,
    /// A worker finished a file's pipeline.
    FileSucceeded { job_id: JobId, record: EmailRecord },
    /// A worker gave up on a file.
    FileFailed { job_id: JobId, reason: String },
    /// All workers have exited and the result channel is closed.
    WorkersJoined,
}
