//! One-cycle-at-a-time execution with trigger coalescing.
//!
//! Generation cycles are triggered by external file-change events. Two
//! cycles must never run concurrently: interleaved writes to the same
//! staging files would corrupt output. This is a serialization invariant,
//! not a transactional one; there is no rollback.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

use crate::context::GenContext;
use crate::error::Result;
use crate::generate::{CycleReport, Orchestrator};

/// Serializes generation cycles and coalesces triggers that arrive while a
/// cycle is in flight.
///
/// Every caller of [`trigger`] marks work as pending, then waits for the run
/// lock. Whoever holds the lock drains the pending flag in a loop, so any
/// number of triggers that pile up during a cycle collapse into exactly one
/// follow-up cycle.
///
/// [`trigger`]: CycleRunner::trigger
pub struct CycleRunner {
    orchestrator: Orchestrator,
    running: Mutex<()>,
    pending: AtomicBool,
}

impl CycleRunner {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            running: Mutex::new(()),
            pending: AtomicBool::new(false),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Request a generation cycle for `ctx`.
    ///
    /// Returns the report of the cycle this call ran, or `None` when the
    /// trigger was coalesced into a cycle another caller already ran.
    ///
    /// # Errors
    ///
    /// A failing cycle surfaces its error to this caller; the runner itself
    /// performs no retries.
    pub async fn trigger(&self, ctx: &GenContext) -> Result<Option<CycleReport>> {
        self.pending.store(true, Ordering::SeqCst);

        let _running = self.running.lock().await;
        let mut report = None;
        while self.pending.swap(false, Ordering::SeqCst) {
            report = Some(self.orchestrator.run_cycle(ctx).await?);
        }
        if report.is_none() {
            debug!("trigger coalesced into an already-completed cycle");
        }
        Ok(report)
    }
}
