//! The tick scheduler — drives periodic evaluation at a fixed cadence.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Progress update
//!   2. Production accrual
//!   3. UI update (host-registered)
//!   — slow batch, at most once per SLOW_BATCH_INTERVAL_MS —
//!   4. Stats
//!   5. Playtime
//!   6. Autosave check
//!
//! RULES:
//!   - Tasks execute in registration order, every eligible tick.
//!   - A failing task is reported and never stops the scheduler or
//!     skips its siblings in the same tick.
//!   - The host's repeating timer is the only thing that calls
//!     on_timer(); the core itself never blocks or spawns.

use crate::error::GameResult;
use crate::persistence::PersistenceManager;
use crate::state::{AuxState, GameState};
use crate::types::{DurationMs, TimestampMs};

pub const SLOW_BATCH_INTERVAL_MS: DurationMs = 1_000;

/// Everything a task may touch during one tick. Borrowed fresh from the
/// engine on every pass, so no task can hold state across ticks except
/// its own fields.
pub struct TickContext<'a> {
    pub state: &'a mut GameState,
    pub aux: &'a mut AuxState,
    pub persistence: &'a mut PersistenceManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Runs on every tick.
    EveryTick,
    /// Runs only when the slow batch fires (≥ SLOW_BATCH_INTERVAL_MS
    /// since the previous batch, plus the initial paint).
    SlowBatch,
}

/// The contract every scheduled task fulfills.
pub trait TickTask: Send {
    /// Stable name, used in failure reports.
    fn name(&self) -> &'static str;

    fn cadence(&self) -> Cadence {
        Cadence::EveryTick
    }

    fn run(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>) -> GameResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stopped,
    Running,
}

pub struct TickScheduler {
    tasks: Vec<Box<dyn TickTask>>,
    phase: Phase,
    last_slow_batch_ms: TimestampMs,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            phase: Phase::Stopped,
            last_slow_batch_ms: 0,
        }
    }

    /// Register a task. Call in the documented execution order.
    pub fn register(&mut self, task: Box<dyn TickTask>) {
        self.tasks.push(task);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Begin (or restart) the run. Any prior run is cancelled, then every
    /// registered task executes once synchronously — the initial paint —
    /// before the host's repeating timer takes over.
    pub fn start(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>) {
        if self.phase == Phase::Running {
            log::debug!("scheduler restarted, cancelling prior run");
        }
        self.phase = Phase::Running;
        self.last_slow_batch_ms = now_ms;
        self.run_pass(now_ms, ctx, true);
    }

    /// One tick, invoked by the host's repeating timer. No-op while
    /// stopped, so a timer that outlives stop() is harmless.
    pub fn on_timer(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>) {
        if self.phase != Phase::Running {
            return;
        }
        let slow_due =
            now_ms.saturating_sub(self.last_slow_batch_ms) >= SLOW_BATCH_INTERVAL_MS as i64;
        self.run_pass(now_ms, ctx, slow_due);
        if slow_due {
            self.last_slow_batch_ms = now_ms;
        }
    }

    /// Idempotent. Never leaves a tick half-finished because it only
    /// flips the phase between passes.
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }

    fn run_pass(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>, include_slow: bool) {
        for task in &mut self.tasks {
            if task.cadence() == Cadence::SlowBatch && !include_slow {
                continue;
            }
            // Task isolation: report and keep going.
            if let Err(err) = task.run(now_ms, ctx) {
                log::error!("task '{}' failed, continuing tick: {err}", task.name());
            }
        }
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}
