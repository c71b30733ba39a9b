//! The persistence manager — the only component that reads or writes
//! the save slot.

use crate::config::CoreConfig;
use crate::save::{validate_record, SaveRecord};
use crate::state::{AuxState, GameState};
use crate::store::SaveStore;
use crate::types::TimestampMs;

pub const SAVE_KEY: &str = "soda_sipper_save";

pub struct PersistenceManager {
    store: Box<dyn SaveStore>,
    config: CoreConfig,
}

impl PersistenceManager {
    pub fn new(store: Box<dyn SaveStore>, config: CoreConfig) -> Self {
        Self { store, config }
    }

    /// Snapshot and write. Never fails the caller: a store or
    /// serialization failure is reported and in-memory state is left
    /// exactly as it was — the stale persist baseline makes the next
    /// autosave check retry.
    pub fn save(
        &mut self,
        state: &mut GameState,
        aux: &AuxState,
        now_ms: TimestampMs,
    ) -> SaveRecord {
        let record = SaveRecord::from_state(state, aux, now_ms);
        match serde_json::to_string(&record) {
            Ok(json) => match self.store.set(SAVE_KEY, &json) {
                Ok(()) => {
                    state.last_persist_ms = now_ms;
                    log::debug!("state saved at {now_ms}");
                }
                Err(err) => {
                    log::error!("save failed, in-memory state retained: {err}");
                }
            },
            Err(err) => {
                log::error!("save serialization failed: {err}");
            }
        }
        record
    }

    /// Load and repair. Malformed fields default individually; an
    /// absent record, unreadable store, or rejected schema degrades to
    /// a fresh game rather than refusing to start.
    pub fn load(&mut self, now_ms: TimestampMs) -> (GameState, AuxState) {
        let raw = match self.store.get(SAVE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("no save record, starting fresh");
                return self.fresh(now_ms);
            }
            Err(err) => {
                log::warn!("store read failed, starting fresh: {err}");
                return self.fresh(now_ms);
            }
        };

        let defaults = SaveRecord::defaults(&self.config, now_ms);
        match validate_record(&raw, now_ms, &defaults) {
            Ok((record, repairs)) => {
                for repair in &repairs {
                    log::warn!("save field '{}' repaired: {}", repair.field, repair.reason);
                }
                record.into_state(now_ms)
            }
            Err(err) => {
                log::warn!("save record discarded ({err}), starting fresh");
                self.fresh(now_ms)
            }
        }
    }

    fn fresh(&self, now_ms: TimestampMs) -> (GameState, AuxState) {
        (GameState::fresh(&self.config, now_ms), AuxState::default())
    }
}
