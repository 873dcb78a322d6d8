use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::summary::BatchSummary;
use crate::EmailRecord;

/// Position of a path in the candidate list.
pub type JobId = usize;

/// Lifecycle of one batch: `Collecting → Dispatching → Draining → Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    Collecting,
    Dispatching,
    Draining,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct JobEntry {
    path: PathBuf,
    status: JobStatus,
}

/// Aggregation state owned by the single consumer that drains results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchState {
    phase: BatchPhase,
    jobs: BTreeMap<JobId, JobEntry>,
    arrivals: Vec<(JobId, EmailRecord)>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn job_status(&self, job_id: JobId) -> Option<JobStatus> {
        self.jobs.get(&job_id).map(|job| job.status)
    }

    pub fn job_path(&self, job_id: JobId) -> Option<&PathBuf> {
        self.jobs.get(&job_id).map(|job| &job.path)
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            phase: self.phase,
            total: self.jobs.len(),
            ..Default::default()
        };
        for job in self.jobs.values() {
            match job.status {
                JobStatus::Queued => summary.pending += 1,
                JobStatus::Succeeded => summary.succeeded += 1,
                JobStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Records in the order workers delivered them.
    pub fn records_in_arrival_order(&self) -> impl Iterator<Item = &EmailRecord> {
        self.arrivals.iter().map(|(_, record)| record)
    }

    /// Consumes the state. With `preserve_input_order` records are sorted by
    /// job id, otherwise they keep their arrival order.
    pub fn into_records(self, preserve_input_order: bool) -> Vec<EmailRecord> {
        let mut arrivals = self.arrivals;
        if preserve_input_order {
            arrivals.sort_by_key(|(job_id, _)| *job_id);
        }
        arrivals.into_iter().map(|(_, record)| record).collect()
    }

    pub(crate) fn begin_dispatch(&mut self, paths: Vec<PathBuf>) -> Vec<(JobId, PathBuf)> {
        self.phase = BatchPhase::Dispatching;
        paths
            .into_iter()
            .enumerate()
            .map(|(job_id, path)| {
                self.jobs.insert(
                    job_id,
                    JobEntry {
                        path: path.clone(),
                        status: JobStatus::Queued,
                    },
                );
                (job_id, path)
            })
            .collect()
    }

    pub(crate) fn start_draining(&mut self) {
        self.phase = BatchPhase::Draining;
    }

    /// Returns false when the job is unknown or already settled.
    pub(crate) fn apply_success(&mut self, job_id: JobId, record: EmailRecord) -> bool {
        match self.jobs.get_mut(&job_id) {
            Some(job) if job.status == JobStatus::Queued => {
                job.status = JobStatus::Succeeded;
                self.arrivals.push((job_id, record));
                true
            }
            _ => false,
        }
    }

    /// Returns the failed path, or `None` when the job is unknown or already settled.
    pub(crate) fn apply_failure(&mut self, job_id: JobId) -> Option<PathBuf> {
        match self.jobs.get_mut(&job_id) {
            Some(job) if job.status == JobStatus::Queued => {
                job.status = JobStatus::Failed;
                Some(job.path.clone())
            }
            _ => None,
        }
    }

    /// Moves to `Done`; jobs no worker reported on are failed and returned.
    pub(crate) fn finish(&mut self) -> Vec<(JobId, PathBuf)> {
        self.phase = BatchPhase::Done;
        self.jobs
            .iter_mut()
            .filter(|(_, job)| job.status == JobStatus::Queued)
            .map(|(job_id, job)| {
                job.status = JobStatus::Failed;
                (*job_id, job.path.clone())
            })
            .collect()
    }
}
