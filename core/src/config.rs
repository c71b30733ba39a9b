//! Core configuration — compiled-in defaults, optionally overridden by
//! a JSON file supplied by the host.

use crate::error::GameResult;
use crate::types::DurationMs;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    /// Wall-clock spacing between drinks for a fresh game.
    pub drink_interval_ms: DurationMs,
    /// SPD before any purchases.
    pub base_spd: f64,
    pub offline: OfflineConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            drink_interval_ms: 5_000,
            base_spd: 1.0,
            offline: OfflineConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfflineConfig {
    /// Longest absence eligible for catch-up credit.
    pub max_away_ms: DurationMs,
    /// Absences shorter than this earn nothing.
    pub min_away_ms: DurationMs,
    /// Fraction of live production earned while away, in (0, 1].
    pub efficiency: f64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            max_away_ms: 8 * 60 * 60 * 1000,
            min_away_ms: 60 * 1000,
            efficiency: 0.5,
        }
    }
}

impl CoreConfig {
    pub fn load_from_path(path: &Path) -> GameResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        let mut config: CoreConfig = serde_json::from_str(&raw)?;
        config.sanitize();
        Ok(config)
    }

    /// Pull out-of-range values back into their documented domains.
    /// Reported and repaired, never fatal.
    pub fn sanitize(&mut self) {
        if self.drink_interval_ms == 0 {
            log::warn!("drinkIntervalMs must be positive, using default");
            self.drink_interval_ms = CoreConfig::default().drink_interval_ms;
        }
        if !self.base_spd.is_finite() || self.base_spd < 0.0 {
            log::warn!("baseSpd {} out of range, using default", self.base_spd);
            self.base_spd = CoreConfig::default().base_spd;
        }
        let eff = self.offline.efficiency;
        if !eff.is_finite() || eff <= 0.0 || eff > 1.0 {
            log::warn!("offline efficiency {eff} outside (0, 1], clamping to 1.0");
            self.offline.efficiency = 1.0;
        }
    }
}
