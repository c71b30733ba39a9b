//! Built-in scheduler tasks around the production accrual: progress
//! tracking on the fast path, stats/playtime/autosave on the slow batch.
//! Execution order is documented in scheduler.rs.

use crate::error::GameResult;
use crate::scheduler::{Cadence, TickContext, TickTask};
use crate::types::TimestampMs;

/// First in the tick order: refresh progress toward the next drink so
/// the UI task that follows reads a current value.
pub struct ProgressTask;

impl TickTask for ProgressTask {
    fn name(&self) -> &'static str {
        "progress_update"
    }

    fn run(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>) -> GameResult<()> {
        let state = &mut *ctx.state;
        let elapsed = now_ms.saturating_sub(state.last_drink_ms).max(0) as u64;
        // Progress stays inside [0, interval); a due drink is the
        // accrual task's call, not ours.
        state.drink_progress_ms = elapsed.min(state.drink_interval_ms - 1);
        Ok(())
    }
}

/// Slow batch: periodic stats report.
pub struct StatsTask;

impl TickTask for StatsTask {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn cadence(&self) -> Cadence {
        Cadence::SlowBatch
    }

    fn run(&mut self, _now_ms: TimestampMs, ctx: &mut TickContext<'_>) -> GameResult<()> {
        log::debug!(
            "stats: sips={} spd={} lifetime={} clicks={} level={}",
            ctx.state.currency,
            ctx.state.production_rate_per_drink,
            ctx.state.total_sips_earned,
            ctx.aux.total_clicks,
            ctx.aux.level
        );
        Ok(())
    }
}

/// Slow batch: accumulate wall-clock playtime between batches.
pub struct PlaytimeTask {
    last_seen_ms: Option<TimestampMs>,
}

impl PlaytimeTask {
    pub fn new() -> Self {
        Self { last_seen_ms: None }
    }
}

impl Default for PlaytimeTask {
    fn default() -> Self {
        Self::new()
    }
}

impl TickTask for PlaytimeTask {
    fn name(&self) -> &'static str {
        "playtime"
    }

    fn cadence(&self) -> Cadence {
        Cadence::SlowBatch
    }

    fn run(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>) -> GameResult<()> {
        if let Some(prev) = self.last_seen_ms {
            ctx.aux.total_play_time_ms += now_ms.saturating_sub(prev).max(0) as u64;
        }
        self.last_seen_ms = Some(now_ms);
        Ok(())
    }
}

/// Slow batch: save when the autosave interval has elapsed since the
/// last successful persist. A failed save leaves `last_persist_ms`
/// alone, so the next batch simply tries again.
pub struct AutosaveTask;

impl TickTask for AutosaveTask {
    fn name(&self) -> &'static str {
        "autosave_check"
    }

    fn cadence(&self) -> Cadence {
        Cadence::SlowBatch
    }

    fn run(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>) -> GameResult<()> {
        let options = &ctx.aux.options;
        if !options.autosave_enabled {
            return Ok(());
        }
        let due = now_ms.saturating_sub(ctx.state.last_persist_ms)
            >= options.autosave_interval_ms as i64;
        if due {
            ctx.persistence.save(ctx.state, ctx.aux, now_ms);
        }
        Ok(())
    }
}
