//! Background sync: pass composition, scheduling, and mutual exclusion.

mod model;
mod orchestrator;
mod pass;

pub use model::*;
pub use orchestrator::SyncOrchestrator;
pub use pass::DefaultSyncPass;
