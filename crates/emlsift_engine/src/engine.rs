use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use emlsift_core::{update, BatchState, Effect, JobId, Msg};
use engine_logging::{engine_debug, engine_error, engine_file_warn, engine_info, engine_warn};

use crate::dispatch::SideEffectDispatcher;
use crate::envelope::EnvelopeDecoder;
use crate::links::LinkExtractor;
use crate::pipeline::FilePipeline;
use crate::types::{BatchError, BatchReport, BatchSettings, SkippedFile};

struct Job {
    job_id: JobId,
    path: PathBuf,
}

struct WorkerEvent {
    msg: Msg,
    side_effect_failures: usize,
}

type JobQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Fans candidate paths out to a fixed pool of worker threads and drains
/// their results on the calling thread.
pub struct BatchOrchestrator {
    settings: BatchSettings,
    pipeline: Arc<FilePipeline>,
}

impl BatchOrchestrator {
    pub fn new(settings: BatchSettings) -> Self {
        let dispatcher = SideEffectDispatcher::new(settings.input_root.clone(), &settings.side_effects);
        let pipeline = FilePipeline::new(EnvelopeDecoder::default(), LinkExtractor::new(), dispatcher);
        Self::with_pipeline(settings, pipeline)
    }

    pub fn with_pipeline(settings: BatchSettings, pipeline: FilePipeline) -> Self {
        Self {
            settings,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Runs every path through the pipeline. Per-file failures are logged and
    /// counted; only a failure to start the worker pool is an error.
    pub fn run(&self, paths: Vec<PathBuf>) -> Result<BatchReport, BatchError> {
        let total = paths.len();
        let worker_count = self.settings.workers.get();
        engine_info!("batch started: {} files, {} workers", total, worker_count);

        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();
        let queue: JobQueue = Arc::new(Mutex::new(job_rx));

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let events = event_tx.clone();
            let pipeline = Arc::clone(&self.pipeline);
            let spawned = thread::Builder::new()
                .name(format!("emlsift-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, &queue, &events, &pipeline));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    drop(job_tx);
                    join_workers(handles);
                    return Err(BatchError::Spawn(err));
                }
            }
        }
        // Workers hold the only remaining senders; the drain ends when they all exit.
        drop(event_tx);

        let mut job_tx = Some(job_tx);
        let mut skipped = Vec::new();
        let mut state = drive(
            BatchState::new(),
            Msg::PathsCollected(paths),
            &mut job_tx,
            &mut skipped,
        );

        let mut side_effect_failures = 0;
        for event in event_rx {
            side_effect_failures += event.side_effect_failures;
            state = drive(state, event.msg, &mut job_tx, &mut skipped);
        }
        join_workers(handles);
        let state = drive(state, Msg::WorkersJoined, &mut job_tx, &mut skipped);

        let summary = state.summary();
        let records = state.into_records(self.settings.preserve_input_order);
        engine_info!(
            "batch finished: {} succeeded, {} failed, {} side effect failures",
            summary.succeeded,
            summary.failed,
            side_effect_failures
        );

        Ok(BatchReport {
            records,
            summary,
            skipped,
            side_effect_failures,
        })
    }
}

/// Feeds `msg` through the state machine and performs every effect it asks for,
/// including follow-up messages those effects produce.
fn drive(
    mut state: BatchState,
    msg: Msg,
    job_tx: &mut Option<mpsc::Sender<Job>>,
    skipped: &mut Vec<SkippedFile>,
) -> BatchState {
    let mut pending = VecDeque::from([msg]);
    while let Some(msg) = pending.pop_front() {
        let (next, effects) = update(state, msg);
        state = next;
        for effect in effects {
            match effect {
                Effect::Enqueue { job_id, path } => {
                    let Some(tx) = job_tx.as_ref() else {
                        engine_warn!("job {} enqueued after the queue closed", job_id);
                        continue;
                    };
                    if tx.send(Job { job_id, path }).is_err() {
                        engine_warn!("no worker left to take job {}", job_id);
                    }
                }
                Effect::CloseQueue => {
                    job_tx.take();
                    pending.push_back(Msg::QueueClosed);
                }
                Effect::ReportFailure { path, reason, .. } => {
                    engine_file_warn!(&path, "skipped: {}", reason);
                    skipped.push(SkippedFile { path, reason });
                }
            }
        }
    }
    state
}

fn worker_loop(
    worker_id: usize,
    queue: &JobQueue,
    events: &mpsc::Sender<WorkerEvent>,
    pipeline: &FilePipeline,
) {
    engine_debug!("worker {} started", worker_id);
    while let Some(Job { job_id, path }) = next_job(queue) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(&path)));
        let event = match outcome {
            Ok(Ok(processed)) => WorkerEvent {
                msg: Msg::FileSucceeded {
                    job_id,
                    record: processed.record,
                },
                side_effect_failures: processed.side_effect_failures,
            },
            Ok(Err(err)) => WorkerEvent {
                msg: Msg::FileFailed {
                    job_id,
                    reason: err.to_string(),
                },
                side_effect_failures: 0,
            },
            Err(payload) => WorkerEvent {
                msg: Msg::FileFailed {
                    job_id,
                    reason: format!("pipeline panicked: {}", panic_message(payload.as_ref())),
                },
                side_effect_failures: 0,
            },
        };
        if events.send(event).is_err() {
            break;
        }
    }
    engine_debug!("worker {} exiting", worker_id);
}

/// Blocks for the next job; `None` once the queue is closed and empty.
fn next_job(queue: &JobQueue) -> Option<Job> {
    let receiver = match queue.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    receiver.recv().ok()
}

fn join_workers(handles: Vec<thread::JoinHandle<()>>) {
    for handle in handles {
        let name = handle.thread().name().unwrap_or("worker").to_string();
        if handle.join().is_err() {
            engine_error!("{} terminated abnormally", name);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "unknown panic"
    }
}
