//! Offline reconciliation — one-time catch-up credit for wall-clock
//! time that passed while the simulation was not ticking.
//!
//! `reconcile` is a pure function: safe to call any number of times
//! with the same inputs, it always returns the same result and touches
//! nothing. `apply` is the single mutation step; it consumes the result
//! by value so one computed credit cannot be applied twice, and it
//! re-stamps the persist baseline so an immediate re-reconcile earns
//! nothing.

use crate::config::OfflineConfig;
use crate::quantity::Quantity;
use crate::state::{GameState, MIN_DRINK_INTERVAL_MS};
use crate::types::{DurationMs, TimestampMs};

#[derive(Debug, Clone, PartialEq)]
pub struct OfflineResult {
    /// Raw absence, uncapped.
    pub time_away_ms: DurationMs,
    /// Absence actually credited, after the cap.
    pub capped_time_ms: DurationMs,
    /// Whole drinks that fit into the credited absence.
    pub drinks_processed: u64,
    pub sips_earned: Quantity,
    pub was_applied: bool,
}

impl OfflineResult {
    fn not_applied(time_away_ms: DurationMs, capped_time_ms: DurationMs) -> Self {
        Self {
            time_away_ms,
            capped_time_ms,
            drinks_processed: 0,
            sips_earned: Quantity::ZERO,
            was_applied: false,
        }
    }
}

/// Compute the catch-up credit for an absence.
pub fn reconcile(
    last_persist_ms: TimestampMs,
    now_ms: TimestampMs,
    drink_interval_ms: DurationMs,
    production_rate_per_drink: &Quantity,
    config: &OfflineConfig,
) -> OfflineResult {
    let time_away = now_ms.saturating_sub(last_persist_ms).max(0) as DurationMs;
    let capped_time = time_away.min(config.max_away_ms);

    if time_away < config.min_away_ms {
        return OfflineResult::not_applied(time_away, capped_time);
    }

    let interval = drink_interval_ms.max(MIN_DRINK_INTERVAL_MS);
    let drinks = capped_time / interval;
    if drinks == 0 {
        return OfflineResult::not_applied(time_away, capped_time);
    }

    let efficiency = config.efficiency;
    let efficiency = if efficiency.is_finite() && efficiency > 0.0 && efficiency <= 1.0 {
        efficiency
    } else {
        log::warn!("offline efficiency {efficiency} outside (0, 1], using 1.0");
        1.0
    };

    let sips_earned = production_rate_per_drink
        .mul(&Quantity::from_f64(efficiency))
        .mul(&Quantity::from(drinks));

    OfflineResult {
        time_away_ms: time_away,
        capped_time_ms: capped_time,
        drinks_processed: drinks,
        sips_earned,
        was_applied: true,
    }
}

/// Apply a computed credit to live state. At most once per result —
/// the move enforces it. A not-applied result is a no-op.
pub fn apply(state: &mut GameState, result: OfflineResult, now_ms: TimestampMs) {
    if !result.was_applied {
        return;
    }
    state.currency = state.currency.add(&result.sips_earned);
    state.total_sips_earned = state.total_sips_earned.add(&result.sips_earned);
    // Re-anchor the baseline: reconciling again at the same instant now
    // falls under the minimum-away threshold.
    state.last_persist_ms = now_ms;
    log::info!(
        "offline catch-up applied: {} drinks over {}ms away ({}ms credited), +{} sips",
        result.drinks_processed,
        result.time_away_ms,
        result.capped_time_ms,
        result.sips_earned
    );
}
