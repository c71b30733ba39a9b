//! Production accrual rules: one drink per due tick, strict no-op below
//! the interval, remainder intentionally dropped.

use sipper_core::accrual::accrue;
use sipper_core::config::CoreConfig;
use sipper_core::quantity::Quantity;
use sipper_core::state::GameState;

const T0: i64 = 1_700_000_000_000;

fn state_with_rate_10(now: i64) -> GameState {
    let mut state = GameState::fresh(&CoreConfig::default(), now);
    state.production_rate_per_drink = Quantity::from(10u64);
    state
}

#[test]
fn below_interval_is_a_strict_noop() {
    let mut state = state_with_rate_10(T0);
    state.last_drink_ms = T0;
    let before = state.clone();

    let now = T0 + state.drink_interval_ms as i64 - 1;
    let outcome = accrue(&mut state, now);

    assert!(!outcome.drink_completed);
    assert_eq!(outcome.sips_earned, Quantity::ZERO);
    assert_eq!(
        state, before,
        "a not-yet-due tick must leave every field untouched, last_drink_ms included"
    );
}

#[test]
fn due_drink_grants_the_rate_once() {
    // fresh() backdates the last drink by one interval: due immediately.
    let mut state = state_with_rate_10(T0);

    let outcome = accrue(&mut state, T0);

    assert!(outcome.drink_completed);
    assert_eq!(outcome.sips_earned, Quantity::from(10u64));
    assert_eq!(state.currency, Quantity::from(10u64));
    assert_eq!(state.total_sips_earned, Quantity::from(10u64));
    assert_eq!(state.last_drink_ms, T0);
    assert_eq!(state.drink_progress_ms, 0);
}

#[test]
fn many_elapsed_intervals_still_grant_one_drink() {
    let mut state = state_with_rate_10(T0);
    state.last_drink_ms = T0;

    // Ten full intervals late — still exactly one drink; long gaps are
    // the offline reconciler's territory.
    let now = T0 + 10 * state.drink_interval_ms as i64;
    let outcome = accrue(&mut state, now);

    assert!(outcome.drink_completed);
    assert_eq!(state.currency, Quantity::from(10u64));
    assert_eq!(state.last_drink_ms, now, "progress resets to zero on the due tick");

    // The remainder was dropped: the next drink needs a full interval.
    let outcome = accrue(&mut state, now + 1);
    assert!(!outcome.drink_completed);
    assert_eq!(state.currency, Quantity::from(10u64));
}

#[test]
fn lifetime_total_survives_spending() {
    let mut state = state_with_rate_10(T0);
    accrue(&mut state, T0);

    // The economy layer spends between ticks.
    state.currency = state.currency.saturating_sub(&Quantity::from(10u64));
    assert_eq!(state.currency, Quantity::ZERO);

    let t = T0 + state.drink_interval_ms as i64;
    accrue(&mut state, t);
    assert_eq!(state.currency, Quantity::from(10u64));
    assert_eq!(
        state.total_sips_earned,
        Quantity::from(20u64),
        "lifetime total only ever grows"
    );
}

#[test]
fn rate_change_between_ticks_applies_to_the_next_drink() {
    let mut state = state_with_rate_10(T0);
    accrue(&mut state, T0);

    // Purchase mid-session: the economy layer raises SPD.
    state.production_rate_per_drink = Quantity::from(250u64);

    let t = T0 + state.drink_interval_ms as i64;
    accrue(&mut state, t);
    assert_eq!(state.currency, Quantity::from(260u64));
}

#[test]
fn accrual_stays_exact_past_f64_range() {
    let mut state = state_with_rate_10(T0);
    state.currency = Quantity::parse("1e400").unwrap();
    state.total_sips_earned = Quantity::parse("1e400").unwrap();
    state.production_rate_per_drink = Quantity::parse("1e400").unwrap();

    accrue(&mut state, T0);

    assert_eq!(state.currency.to_canonical_string(), "2.0e400");
    assert_eq!(state.total_sips_earned.to_canonical_string(), "2.0e400");
}
