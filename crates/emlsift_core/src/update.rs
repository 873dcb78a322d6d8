use crate::{BatchPhase, BatchState, Effect, Msg};

const ABANDONED_REASON: &str = "worker exited before reporting a result";

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase are ignored.
pub fn update(mut state: BatchState, msg: Msg) -> (BatchState, Vec<Effect>) {
    let effects = match msg {
        Msg::PathsCollected(paths) => {
            if state.phase() != BatchPhase::Collecting {
                return (state, Vec::new());
            }
            let enqueued = state.begin_dispatch(paths);
            let mut effects = Vec::with_capacity(enqueued.len() + 1);
            for (job_id, path) in enqueued {
                effects.push(Effect::Enqueue { job_id, path });
            }
            effects.push(Effect::CloseQueue);
            effects
        }
        Msg::QueueClosed => {
            if state.phase() == BatchPhase::Dispatching {
                state.start_draining();
            }
            Vec::new()
        }
        Msg::FileSucceeded { job_id, record } => {
            if is_accepting_results(state.phase()) {
                state.apply_success(job_id, record);
            }
            Vec::new()
        }
        Msg::FileFailed { job_id, reason } => {
            if !is_accepting_results(state.phase()) {
                return (state, Vec::new());
            }
            match state.apply_failure(job_id) {
                Some(path) => vec![Effect::ReportFailure {
                    job_id,
                    path,
                    reason,
                }],
                None => Vec::new(),
            }
        }
        Msg::WorkersJoined => {
            if state.phase() != BatchPhase::Draining {
                return (state, Vec::new());
            }
            state
                .finish()
                .into_iter()
                .map(|(job_id, path)| Effect::ReportFailure {
                    job_id,
                    path,
                    reason: ABANDONED_REASON.to_string(),
                })
                .collect()
        }
    };

    (state, effects)
}

fn is_accepting_results(phase: BatchPhase) -> bool {
    matches!(phase, BatchPhase::Dispatching | BatchPhase::Draining)
}
