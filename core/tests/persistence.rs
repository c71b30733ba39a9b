//! Save/load: round-trips, field-level repair, graceful degradation.

use sipper_core::config::CoreConfig;
use sipper_core::persistence::{PersistenceManager, SAVE_KEY};
use sipper_core::quantity::Quantity;
use sipper_core::state::{AuxState, GameState, MIN_DRINK_INTERVAL_MS};
use sipper_core::store::{FailingStore, MemoryStore, SaveStore};

const T0: i64 = 1_700_000_000_000;

fn manager_with(store: Box<dyn SaveStore>) -> PersistenceManager {
    PersistenceManager::new(store, CoreConfig::default())
}

fn populated_state(now: i64) -> (GameState, AuxState) {
    let mut state = GameState::fresh(&CoreConfig::default(), now);
    state.currency = Quantity::parse("1.5e400").unwrap();
    state.production_rate_per_drink = Quantity::parse("2.5e2").unwrap();
    state.total_sips_earned = Quantity::parse("9.99e412").unwrap();
    state.last_drink_ms = now - 1_200;
    state.drink_progress_ms = 2_500; // half of the 5000ms interval
    let mut aux = AuxState::default();
    aux.straws = 42;
    aux.cups = 7;
    aux.wider_straws = 3;
    aux.suctions = 12;
    aux.total_clicks = 991;
    aux.level = 5;
    aux.total_play_time_ms = 123_456;
    aux.options.autosave_interval_ms = 10_000;
    (state, aux)
}

#[test]
fn save_then_load_round_trips_every_field() {
    let mut manager = manager_with(Box::new(MemoryStore::new()));
    let (mut state, aux) = populated_state(T0);

    manager.save(&mut state, &aux, T0);
    let (loaded_state, loaded_aux) = manager.load(T0 + 1);

    // Quantity fields compare by canonical string.
    assert_eq!(
        loaded_state.currency.to_canonical_string(),
        state.currency.to_canonical_string()
    );
    assert_eq!(
        loaded_state.total_sips_earned.to_canonical_string(),
        state.total_sips_earned.to_canonical_string()
    );
    assert_eq!(loaded_state, state);
    assert_eq!(loaded_aux, aux);
}

#[test]
fn successful_save_advances_the_persist_baseline() {
    let mut manager = manager_with(Box::new(MemoryStore::new()));
    let (mut state, aux) = populated_state(T0);
    state.last_persist_ms = T0 - 60_000;

    manager.save(&mut state, &aux, T0);
    assert_eq!(state.last_persist_ms, T0);
}

#[test]
fn failed_save_reports_and_leaves_state_alone() {
    let mut manager = manager_with(Box::new(FailingStore));
    let (mut state, aux) = populated_state(T0);
    state.last_persist_ms = T0 - 60_000;
    let before = state.clone();

    // Never throws; the record is still produced.
    let record = manager.save(&mut state, &aux, T0);
    assert_eq!(record.sips.to_canonical_string(), "1.5e400");
    assert_eq!(state, before, "a failed save must not move the baseline");
}

#[test]
fn absent_record_starts_fresh_and_due_immediately() {
    let mut manager = manager_with(Box::new(MemoryStore::new()));
    let (state, aux) = manager.load(T0);

    assert_eq!(state.currency, Quantity::ZERO);
    assert_eq!(state.production_rate_per_drink, Quantity::from(1u64));
    assert_eq!(
        state.last_drink_ms,
        T0 - state.drink_interval_ms as i64,
        "fresh game owes its first drink immediately"
    );
    assert_eq!(aux, AuxState::default());
}

#[test]
fn unreadable_store_degrades_to_fresh() {
    let mut manager = manager_with(Box::new(FailingStore));
    let (state, _aux) = manager.load(T0);
    assert_eq!(state.currency, Quantity::ZERO);
}

fn load_raw(raw: &str, now: i64) -> (GameState, AuxState) {
    let mut store = MemoryStore::new();
    store.set(SAVE_KEY, raw).unwrap();
    manager_with(Box::new(store)).load(now)
}

#[test]
fn one_malformed_field_defaults_alone() {
    let raw = format!(
        r#"{{"version":1,"sips":"banana","straws":42,"cups":7,
            "spd":"2.5e2","lastDrinkTime":{},"lastSaveTime":{},"drinkRate":5000}}"#,
        T0 - 1_000,
        T0 - 500
    );
    let (state, aux) = load_raw(&raw, T0);

    assert_eq!(state.currency, Quantity::ZERO, "corrupt sips falls back to default");
    assert_eq!(aux.straws, 42, "healthy siblings are preserved");
    assert_eq!(aux.cups, 7);
    assert_eq!(state.production_rate_per_drink.to_canonical_string(), "2.5e2");
    assert_eq!(state.last_drink_ms, T0 - 1_000);
}

#[test]
fn non_object_record_is_discarded_wholesale() {
    let (state, _) = load_raw("[1,2,3]", T0);
    assert_eq!(state.currency, Quantity::ZERO);

    let (state, _) = load_raw("not json at all", T0);
    assert_eq!(state.currency, Quantity::ZERO);
}

#[test]
fn future_version_is_discarded_wholesale() {
    let raw = format!(r#"{{"version":99,"sips":"1e10","lastSaveTime":{T0}}}"#);
    let (state, _) = load_raw(&raw, T0 + 1);
    assert_eq!(
        state.currency,
        Quantity::ZERO,
        "no partial trust in a schema from the future"
    );
}

#[test]
fn missing_version_reads_as_legacy_record() {
    let raw = format!(r#"{{"sips":"1e10","lastDrinkTime":{},"lastSaveTime":{}}}"#, T0 - 100, T0 - 100);
    let (state, _) = load_raw(&raw, T0);
    assert_eq!(state.currency.to_canonical_string(), "1.0e10");
}

#[test]
fn timestamps_clamp_to_now() {
    let future = T0 + 86_400_000;
    let raw = format!(
        r#"{{"version":1,"sips":"5e0","lastDrinkTime":{future},"lastSaveTime":{future}}}"#
    );
    let (state, _) = load_raw(&raw, T0);
    assert!(state.last_drink_ms <= T0);
    assert!(state.last_persist_ms <= T0);
}

#[test]
fn negative_values_clamp_to_zero() {
    let raw = format!(
        r#"{{"version":1,"sips":"-50","straws":-5,"lastSaveTime":{}}}"#,
        T0 - 1_000
    );
    let (state, aux) = load_raw(&raw, T0);
    assert_eq!(state.currency, Quantity::ZERO);
    assert_eq!(aux.straws, 0);
}

#[test]
fn non_positive_interval_clamps_to_the_floor() {
    let raw = format!(
        r#"{{"version":1,"drinkRate":0,"lastSaveTime":{}}}"#,
        T0 - 1_000
    );
    let (state, _) = load_raw(&raw, T0);
    assert_eq!(state.drink_interval_ms, MIN_DRINK_INTERVAL_MS);
}

#[test]
fn legacy_plain_number_quantities_are_tolerated() {
    let raw = format!(
        r#"{{"version":1,"sips":12345,"spd":2.5,"lastSaveTime":{}}}"#,
        T0 - 1_000
    );
    let (state, _) = load_raw(&raw, T0);
    assert_eq!(state.currency, Quantity::from(12_345u64));
    assert_eq!(state.production_rate_per_drink.to_canonical_string(), "2.5e0");
}

#[test]
fn options_evolve_forward() {
    let raw = format!(
        r#"{{"version":1,"lastSaveTime":{},
            "options":{{"autosaveEnabled":false,"someFutureKnob":true}}}}"#,
        T0 - 1_000
    );
    let (_, aux) = load_raw(&raw, T0);
    assert!(!aux.options.autosave_enabled, "known key honored");
    assert_eq!(
        aux.options.autosave_interval_ms, 30_000,
        "missing key takes its default"
    );
    // someFutureKnob was ignored without invalidating the block.
}

#[test]
fn wire_names_match_the_schema() {
    let mut manager = manager_with(Box::new(MemoryStore::new()));
    let (mut state, aux) = populated_state(T0);
    let record = manager.save(&mut state, &aux, T0);

    let json = serde_json::to_value(&record).unwrap();
    let obj = json.as_object().unwrap();
    for key in [
        "version", "sips", "straws", "cups", "widerStraws", "betterCups", "suctions",
        "fasterDrinks", "totalSipsEarned", "spd", "strawSPD", "cupSPD", "drinkRate",
        "lastDrinkTime", "drinkProgress", "lastSaveTime", "totalPlayTime", "totalClicks",
        "level", "options",
    ] {
        assert!(obj.contains_key(key), "missing wire field {key}");
    }
    assert!(obj["sips"].is_string(), "currency-like fields are canonical strings");
    assert!(obj["drinkRate"].is_number());
}
