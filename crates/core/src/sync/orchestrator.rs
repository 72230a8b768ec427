//! Connectivity-driven sync scheduling with at-most-one-pass semantics.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;

use super::{
    reconnect_jitter, PassOutcome, SyncEventSinkTrait, SyncPassTrait, SyncTrigger,
    PERIODIC_SYNC_INTERVAL_SECS,
};

/// The pass machinery shared between the orchestrator and its spawned
/// schedule tasks. Cloning shares the same permit, so the mutual exclusion
/// holds across every holder.
#[derive(Clone)]
struct PassRunner {
    pass: Arc<dyn SyncPassTrait>,
    events: Arc<dyn SyncEventSinkTrait>,
    permit: Arc<Semaphore>,
}

impl PassRunner {
    async fn trigger(&self, trigger: SyncTrigger) -> PassOutcome {
        let permit = match self.permit.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                debug!("Sync pass already in flight; dropping {:?} trigger", trigger);
                return PassOutcome::Skipped;
            }
        };

        let report = self.pass.run(trigger).await;
        if report.has_upload_activity() {
            self.events.sync_completed(&report);
        }
        drop(permit);
        PassOutcome::Completed(report)
    }
}

/// Reacts to connectivity edges and timers, and guarantees at most one sync
/// pass in flight process-wide.
///
/// The guard is an explicit single-permit semaphore handed in at
/// construction, not a module-level flag, so tests can supply their own
/// permit and assert the mutual exclusion deterministically. It only
/// protects one running process; cross-device safety rests on the remote
/// upsert key.
pub struct SyncOrchestrator {
    runner: PassRunner,
    online: Mutex<bool>,
    schedule_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncOrchestrator {
    pub fn new(
        pass: Arc<dyn SyncPassTrait>,
        events: Arc<dyn SyncEventSinkTrait>,
        pass_permit: Arc<Semaphore>,
    ) -> Self {
        Self {
            runner: PassRunner {
                pass,
                events,
                permit: pass_permit,
            },
            online: Mutex::new(false),
            schedule_task: Mutex::new(None),
        }
    }

    /// Feed a connectivity transition. Edge-triggered: repeating the current
    /// state is a no-op.
    ///
    /// Going online schedules one jittered pass and arms the repeating
    /// timer; going offline cancels the schedule. A pass already running is
    /// never cancelled; only the schedule is.
    pub async fn handle_connectivity(&self, online: bool) {
        {
            let mut state = self.online.lock().await;
            if *state == online {
                return;
            }
            *state = online;
        }

        if online {
            let runner = self.runner.clone();
            let jitter = reconnect_jitter();
            debug!(
                "Connectivity regained; first sync in {:?}, then every {}s",
                jitter, PERIODIC_SYNC_INTERVAL_SECS
            );
            let handle = tokio::spawn(async move {
                tokio::time::sleep(jitter).await;
                let kicked = runner.clone();
                // Passes run detached from the schedule so cancelling the
                // schedule never cancels a pass mid-flight.
                tokio::spawn(async move {
                    kicked.trigger(SyncTrigger::ConnectivityRegained).await;
                });

                let mut ticker =
                    tokio::time::interval(Duration::from_secs(PERIODIC_SYNC_INTERVAL_SECS));
                // An interval's first tick completes immediately.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let periodic = runner.clone();
                    tokio::spawn(async move {
                        periodic.trigger(SyncTrigger::Periodic).await;
                    });
                }
            });
            let mut guard = self.schedule_task.lock().await;
            if let Some(previous) = guard.replace(handle) {
                previous.abort();
            }
        } else {
            debug!("Connectivity lost; cancelling the sync schedule");
            let mut guard = self.schedule_task.lock().await;
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }

    /// Try to run a pass now. If one is already in flight the trigger is
    /// dropped entirely; at-most-one-concurrent-pass is the contract, not
    /// at-least-one-guaranteed.
    pub async fn trigger(&self, trigger: SyncTrigger) -> PassOutcome {
        self.runner.trigger(trigger).await
    }
}
