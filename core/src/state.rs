//! Live game state — the single mutable value the whole core revolves
//! around.
//!
//! RULES:
//!   - GameState is owned by the engine and passed by reference into
//!     every task. No component reaches into ambient global scope.
//!   - Durability lives only in the SaveRecord; GameState is discarded
//!     at process end.
//!   - The economy/input layer may mutate currency and the production
//!     rate between ticks; the core tolerates that.

use crate::config::CoreConfig;
use crate::quantity::Quantity;
use crate::types::{DurationMs, TimestampMs};
use serde::{Deserialize, Serialize};

/// Floor for the drink interval. A record claiming a non-positive or
/// sub-floor interval is clamped here and reported, never trusted.
pub const MIN_DRINK_INTERVAL_MS: DurationMs = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Spendable sips.
    pub currency: Quantity,
    /// Sips granted per completed drink (SPD).
    pub production_rate_per_drink: Quantity,
    /// Wall-clock spacing between drinks. Always > 0.
    pub drink_interval_ms: DurationMs,
    /// When the last drink completed. Never ahead of the clock.
    pub last_drink_ms: TimestampMs,
    /// Progress toward the next drink, in [0, drink_interval_ms).
    pub drink_progress_ms: DurationMs,
    /// Lifetime sips earned. Only ever grows.
    pub total_sips_earned: Quantity,
    /// When the state last reached the store. Baseline for offline
    /// catch-up.
    pub last_persist_ms: TimestampMs,
}

impl GameState {
    /// Fresh-game defaults: nothing earned, first drink due immediately,
    /// no offline credit owed.
    pub fn fresh(config: &CoreConfig, now_ms: TimestampMs) -> Self {
        let drink_interval_ms = config.drink_interval_ms.max(MIN_DRINK_INTERVAL_MS);
        Self {
            currency: Quantity::ZERO,
            production_rate_per_drink: Quantity::from_f64(config.base_spd),
            drink_interval_ms,
            last_drink_ms: now_ms - drink_interval_ms as i64,
            drink_progress_ms: 0,
            total_sips_earned: Quantity::ZERO,
            last_persist_ms: now_ms,
        }
    }

    /// Re-establish the invariants after loading untrusted data.
    /// Violations are repaired in place and reported, never fatal.
    pub fn clamp_invariants(&mut self, now_ms: TimestampMs) {
        if self.drink_interval_ms < MIN_DRINK_INTERVAL_MS {
            log::warn!(
                "drink interval {}ms below floor, clamping to {}ms",
                self.drink_interval_ms,
                MIN_DRINK_INTERVAL_MS
            );
            self.drink_interval_ms = MIN_DRINK_INTERVAL_MS;
        }
        if self.last_drink_ms > now_ms {
            log::warn!(
                "last drink timestamp {} is in the future, clamping to now",
                self.last_drink_ms
            );
            self.last_drink_ms = now_ms;
        }
        if self.last_persist_ms > now_ms {
            log::warn!(
                "last persist timestamp {} is in the future, clamping to now",
                self.last_persist_ms
            );
            self.last_persist_ms = now_ms;
        }
        if self.drink_progress_ms >= self.drink_interval_ms {
            self.drink_progress_ms = self.drink_interval_ms - 1;
        }
    }
}

/// Persisted user options. Unknown keys in a stored options block are
/// ignored and missing keys take these defaults, so old cores read new
/// saves and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    pub autosave_enabled: bool,
    pub autosave_interval_ms: DurationMs,
    pub offline_summary: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            autosave_enabled: true,
            autosave_interval_ms: 30_000,
            offline_summary: true,
        }
    }
}

/// Gameplay data owned by the economy layer but persisted by this core:
/// purchase counts, upgrade counts, per-source rates, and bookkeeping
/// totals.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxState {
    pub straws: u64,
    pub cups: u64,
    pub wider_straws: u64,
    pub better_cups: u64,
    pub suctions: u64,
    pub faster_drinks: u64,
    /// SPD contributed by each straw.
    pub straw_spd: Quantity,
    /// SPD contributed by each cup.
    pub cup_spd: Quantity,
    pub total_play_time_ms: DurationMs,
    pub total_clicks: u64,
    pub level: u64,
    pub options: GameOptions,
}

impl Default for AuxState {
    fn default() -> Self {
        Self {
            straws: 0,
            cups: 0,
            wider_straws: 0,
            better_cups: 0,
            suctions: 0,
            faster_drinks: 0,
            straw_spd: Quantity::from_f64(0.6),
            cup_spd: Quantity::from_f64(1.2),
            total_play_time_ms: 0,
            total_clicks: 0,
            level: 1,
            options: GameOptions::default(),
        }
    }
}

impl AuxState {
    /// Derive the full production rate from owned sources. The economy
    /// layer calls this after a purchase and writes the result back to
    /// `GameState::production_rate_per_drink`.
    pub fn recompute_spd(&self, base: &Quantity) -> Quantity {
        base.add(&self.straw_spd.mul(&Quantity::from(self.straws)))
            .add(&self.cup_spd.mul(&Quantity::from(self.cups)))
    }
}
