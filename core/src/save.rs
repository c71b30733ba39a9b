//! The versioned save record and its repair pass.
//!
//! RULES:
//!   - One schema-validation pass per record. Every load path consumes
//!     the same repaired record plus the same diagnostic list; nobody
//!     re-implements per-field fallbacks inline.
//!   - One corrupt field never invalidates the record. Each field is
//!     read independently and falls back to its documented default.
//!   - Only structural failures (not JSON, not an object, version from
//!     the future) reject the record as a whole.
//!
//! Wire shape: currency-like fields as canonical Quantity strings,
//! counts and timestamps as plain numbers, progress as a percentage,
//! options as a nested object with its own defaults.

use crate::config::CoreConfig;
use crate::error::{GameError, GameResult};
use crate::quantity::Quantity;
use crate::state::{AuxState, GameOptions, GameState, MIN_DRINK_INTERVAL_MS};
use crate::types::{DurationMs, TimestampMs};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub version: u32,
    pub sips: Quantity,
    pub straws: u64,
    pub cups: u64,
    pub wider_straws: u64,
    pub better_cups: u64,
    pub suctions: u64,
    pub faster_drinks: u64,
    pub total_sips_earned: Quantity,
    pub spd: Quantity,
    #[serde(rename = "strawSPD")]
    pub straw_spd: Quantity,
    #[serde(rename = "cupSPD")]
    pub cup_spd: Quantity,
    /// Drink interval, ms.
    pub drink_rate: DurationMs,
    /// Epoch ms.
    pub last_drink_time: TimestampMs,
    /// Percent, 0–100.
    pub drink_progress: f64,
    /// Epoch ms.
    pub last_save_time: TimestampMs,
    /// Lifetime playtime, ms.
    pub total_play_time: DurationMs,
    pub total_clicks: u64,
    pub level: u64,
    pub options: GameOptions,
}

/// One repaired field: which one and why.
#[derive(Debug, Clone)]
pub struct FieldRepair {
    pub field: &'static str,
    pub reason: String,
}

impl SaveRecord {
    /// The record a brand-new game would save: everything zeroed, first
    /// drink due immediately.
    pub fn defaults(config: &CoreConfig, now_ms: TimestampMs) -> Self {
        let state = GameState::fresh(config, now_ms);
        let aux = AuxState::default();
        Self::from_state(&state, &aux, now_ms)
    }

    /// Snapshot live state into the wire shape.
    pub fn from_state(state: &GameState, aux: &AuxState, now_ms: TimestampMs) -> Self {
        let progress_pct =
            (state.drink_progress_ms as f64 / state.drink_interval_ms as f64) * 100.0;
        Self {
            version: SAVE_VERSION,
            sips: state.currency,
            straws: aux.straws,
            cups: aux.cups,
            wider_straws: aux.wider_straws,
            better_cups: aux.better_cups,
            suctions: aux.suctions,
            faster_drinks: aux.faster_drinks,
            total_sips_earned: state.total_sips_earned,
            spd: state.production_rate_per_drink,
            straw_spd: aux.straw_spd,
            cup_spd: aux.cup_spd,
            drink_rate: state.drink_interval_ms,
            last_drink_time: state.last_drink_ms,
            drink_progress: progress_pct,
            last_save_time: now_ms,
            total_play_time: aux.total_play_time_ms,
            total_clicks: aux.total_clicks,
            level: aux.level,
            options: aux.options.clone(),
        }
    }

    /// Rebuild live state from a (repaired) record. Invariants are
    /// re-clamped as the final guard.
    pub fn into_state(self, now_ms: TimestampMs) -> (GameState, AuxState) {
        let interval = self.drink_rate.max(MIN_DRINK_INTERVAL_MS);
        let progress_ms = ((self.drink_progress / 100.0) * interval as f64) as u64;
        let mut state = GameState {
            currency: self.sips,
            production_rate_per_drink: self.spd,
            drink_interval_ms: interval,
            last_drink_ms: self.last_drink_time,
            drink_progress_ms: progress_ms.min(interval - 1),
            total_sips_earned: self.total_sips_earned,
            last_persist_ms: self.last_save_time,
        };
        state.clamp_invariants(now_ms);
        let aux = AuxState {
            straws: self.straws,
            cups: self.cups,
            wider_straws: self.wider_straws,
            better_cups: self.better_cups,
            suctions: self.suctions,
            faster_drinks: self.faster_drinks,
            straw_spd: self.straw_spd,
            cup_spd: self.cup_spd,
            total_play_time_ms: self.total_play_time,
            total_clicks: self.total_clicks,
            level: self.level,
            options: self.options,
        };
        (state, aux)
    }
}

/// Parse and repair a raw save blob.
///
/// Returns the repaired record plus a diagnostic entry per repaired
/// field, or a `Schema` error when the blob cannot be trusted at all.
pub fn validate_record(
    raw: &str,
    now_ms: TimestampMs,
    defaults: &SaveRecord,
) -> GameResult<(SaveRecord, Vec<FieldRepair>)> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| GameError::Schema(format!("not valid JSON: {e}")))?;
    let map = value
        .as_object()
        .ok_or_else(|| GameError::Schema("not a JSON object".to_string()))?;

    // Records written before the version field count as version 1.
    let version = match map.get("version") {
        None => 1,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| GameError::Schema("version is not a number".to_string()))?,
    };
    if version > SAVE_VERSION as u64 {
        return Err(GameError::Schema(format!("unsupported version {version}")));
    }

    let mut r = FieldReader::new(map);
    let drink_rate = {
        let v = r.count("drinkRate", defaults.drink_rate);
        if v < MIN_DRINK_INTERVAL_MS {
            r.repair("drinkRate", format!("interval {v}ms below floor"));
            MIN_DRINK_INTERVAL_MS
        } else {
            v
        }
    };
    let record = SaveRecord {
        version: version as u32,
        sips: r.quantity("sips", defaults.sips),
        straws: r.count("straws", defaults.straws),
        cups: r.count("cups", defaults.cups),
        wider_straws: r.count("widerStraws", defaults.wider_straws),
        better_cups: r.count("betterCups", defaults.better_cups),
        suctions: r.count("suctions", defaults.suctions),
        faster_drinks: r.count("fasterDrinks", defaults.faster_drinks),
        total_sips_earned: r.quantity("totalSipsEarned", defaults.total_sips_earned),
        spd: r.quantity("spd", defaults.spd),
        straw_spd: r.quantity("strawSPD", defaults.straw_spd),
        cup_spd: r.quantity("cupSPD", defaults.cup_spd),
        drink_rate,
        last_drink_time: r.timestamp("lastDrinkTime", defaults.last_drink_time, now_ms),
        drink_progress: r.percent("drinkProgress", defaults.drink_progress),
        last_save_time: r.timestamp("lastSaveTime", defaults.last_save_time, now_ms),
        total_play_time: r.count("totalPlayTime", defaults.total_play_time),
        total_clicks: r.count("totalClicks", defaults.total_clicks),
        level: r.count("level", defaults.level),
        options: r.options("options"),
    };
    Ok((record, r.into_repairs()))
}

/// Per-field reads over the raw JSON map, each with its own fallback.
struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    repairs: Vec<FieldRepair>,
}

impl<'a> FieldReader<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            repairs: Vec::new(),
        }
    }

    fn into_repairs(self) -> Vec<FieldRepair> {
        self.repairs
    }

    fn repair(&mut self, field: &'static str, reason: String) {
        self.repairs.push(FieldRepair { field, reason });
    }

    /// Currency-like field: canonical string preferred, plain numbers
    /// tolerated for legacy records. Missing defaults silently.
    fn quantity(&mut self, field: &'static str, default: Quantity) -> Quantity {
        match self.map.get(field) {
            None => default,
            Some(Value::String(s)) => match Quantity::parse(s) {
                Ok(q) => q,
                Err(e) => {
                    self.repair(field, e.to_string());
                    default
                }
            },
            Some(Value::Number(n)) => match Quantity::parse(&n.to_string()) {
                Ok(q) => q,
                Err(e) => {
                    self.repair(field, e.to_string());
                    default
                }
            },
            Some(other) => {
                self.repair(field, format!("expected a number, got {other}"));
                default
            }
        }
    }

    /// Non-negative integer. Negative values clamp to zero, fractions
    /// round down.
    fn count(&mut self, field: &'static str, default: u64) -> u64 {
        match self.map.get(field) {
            None => default,
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_u64() {
                    v
                } else if let Some(f) = n.as_f64() {
                    if f < 0.0 {
                        self.repair(field, format!("negative value {f} clamped to zero"));
                        0
                    } else {
                        f.floor() as u64
                    }
                } else {
                    self.repair(field, "unreadable number".to_string());
                    default
                }
            }
            Some(other) => {
                self.repair(field, format!("expected a number, got {other}"));
                default
            }
        }
    }

    /// Epoch-ms timestamp, clamped to ≤ now.
    fn timestamp(
        &mut self,
        field: &'static str,
        default: TimestampMs,
        now_ms: TimestampMs,
    ) -> TimestampMs {
        let v = match self.map.get(field) {
            None => default,
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    v
                } else if let Some(f) = n.as_f64() {
                    f as i64
                } else {
                    self.repair(field, "unreadable number".to_string());
                    default
                }
            }
            Some(other) => {
                self.repair(field, format!("expected a number, got {other}"));
                default
            }
        };
        if v > now_ms {
            self.repair(field, format!("timestamp {v} is in the future"));
            now_ms
        } else {
            v
        }
    }

    /// Percentage, clamped into [0, 100].
    fn percent(&mut self, field: &'static str, default: f64) -> f64 {
        match self.map.get(field) {
            None => default,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) if f.is_finite() => f.clamp(0.0, 100.0),
                _ => {
                    self.repair(field, "unreadable number".to_string());
                    default
                }
            },
            Some(other) => {
                self.repair(field, format!("expected a number, got {other}"));
                default
            }
        }
    }

    /// Options block: unknown keys ignored, missing keys defaulted by
    /// serde. A non-object block defaults wholesale.
    fn options(&mut self, field: &'static str) -> GameOptions {
        match self.map.get(field) {
            None => GameOptions::default(),
            Some(v @ Value::Object(_)) => match serde_json::from_value(v.clone()) {
                Ok(options) => options,
                Err(e) => {
                    self.repair(field, format!("unreadable options: {e}"));
                    GameOptions::default()
                }
            },
            Some(other) => {
                self.repair(field, format!("expected an object, got {other}"));
                GameOptions::default()
            }
        }
    }
}
