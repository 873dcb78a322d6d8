//! Emlsift core: pure record model, rename derivation and batch state machine.
mod effect;
mod msg;
mod plan;
mod record;
mod rename;
mod state;
mod summary;
mod update;

pub use effect::Effect;
pub use msg::Msg;
pub use plan::{plan_side_effects, CollisionPolicy, SideEffect, SideEffectOptions};
pub use record::{EmailRecord, RecordFields};
pub use rename::{canonical_filename, sanitize_filename, suffixed_filename, timestamp_token};
pub use state::{BatchPhase, BatchState, JobId, JobStatus};
pub use summary::BatchSummary;
pub use update::update;
