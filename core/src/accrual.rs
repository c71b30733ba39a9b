//! Production accrual — decides whether a drink is due and grants it.

use crate::error::GameResult;
use crate::quantity::Quantity;
use crate::scheduler::{TickContext, TickTask};
use crate::state::GameState;
use crate::types::TimestampMs;

#[derive(Debug, Clone, PartialEq)]
pub struct AccrualOutcome {
    pub drink_completed: bool,
    pub sips_earned: Quantity,
}

/// Grant at most one drink if the interval has fully elapsed.
///
/// Below the interval this is a strict no-op: the state, including
/// `last_drink_ms`, is returned untouched. On a due tick the progress
/// resets to zero — any elapsed time beyond one interval is dropped,
/// not carried forward. Live ticking grants one drink per tick no
/// matter how late the tick arrives; multi-interval gaps are the
/// offline reconciler's job, exclusively.
pub fn accrue(state: &mut GameState, now_ms: TimestampMs) -> AccrualOutcome {
    let elapsed = now_ms.saturating_sub(state.last_drink_ms);
    if elapsed < state.drink_interval_ms as i64 {
        return AccrualOutcome {
            drink_completed: false,
            sips_earned: Quantity::ZERO,
        };
    }

    let earned = state.production_rate_per_drink;
    state.currency = state.currency.add(&earned);
    state.total_sips_earned = state.total_sips_earned.add(&earned);
    state.last_drink_ms = now_ms;
    state.drink_progress_ms = 0;

    AccrualOutcome {
        drink_completed: true,
        sips_earned: earned,
    }
}

/// Scheduler wrapper around `accrue`. Second in the execution order.
pub struct DrinkTask;

impl TickTask for DrinkTask {
    fn name(&self) -> &'static str {
        "production_accrual"
    }

    fn run(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>) -> GameResult<()> {
        let outcome = accrue(ctx.state, now_ms);
        if outcome.drink_completed {
            log::debug!(
                "drink complete: +{} sips, total {}",
                outcome.sips_earned,
                ctx.state.currency
            );
        }
        Ok(())
    }
}
