//! sip-runner: headless host for the Soda Sipper progression core.
//!
//! Usage:
//!   sip-runner --db sipper.db --ticks 100 --tick-ms 100
//!   sip-runner --db sipper.db --config core.json --dump-save

use anyhow::Result;
use sipper_core::{
    clock::SystemClock,
    config::CoreConfig,
    engine::GameEngine,
    error::GameResult,
    scheduler::{TickContext, TickTask},
    store::SqliteStore,
    types::TimestampMs,
};
use std::env;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Prints a status line roughly once a second. Stands in for the
/// rendering layer: it only reads state through the context it is
/// handed.
struct ConsoleUiTask {
    last_print_ms: TimestampMs,
}

impl TickTask for ConsoleUiTask {
    fn name(&self) -> &'static str {
        "console_ui"
    }

    fn run(&mut self, now_ms: TimestampMs, ctx: &mut TickContext<'_>) -> GameResult<()> {
        if now_ms - self.last_print_ms < 1_000 {
            return Ok(());
        }
        self.last_print_ms = now_ms;
        let state = &ctx.state;
        let pct = state.drink_progress_ms * 100 / state.drink_interval_ms;
        println!(
            "  sips={} spd={} next drink {pct:>3}%",
            state.currency, state.production_rate_per_drink
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks = parse_arg(&args, "--ticks", 50u64);
    let tick_ms = parse_arg(&args, "--tick-ms", 100u64);
    let dump_save = args.iter().any(|a| a == "--dump-save");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or("sipper.db");
    let config_path = args.windows(2).find(|w| w[0] == "--config").map(|w| w[1].as_str());

    println!("Soda Sipper — sip-runner");
    println!("  db:      {db}");
    println!("  ticks:   {ticks}");
    println!("  tick_ms: {tick_ms}");
    println!();

    let config = match config_path {
        Some(path) => CoreConfig::load_from_path(Path::new(path))?,
        None => CoreConfig::default(),
    };

    let store = SqliteStore::open(db)?;
    store.migrate()?;

    let mut engine = GameEngine::boot(config, Box::new(store), Box::new(SystemClock))?;

    if let Some(summary) = engine.take_offline_summary() {
        if summary.was_applied {
            println!(
                "Welcome back! {} drinks while away ({}s credited of {}s): +{} sips",
                summary.drinks_processed,
                summary.capped_time_ms / 1000,
                summary.time_away_ms / 1000,
                summary.sips_earned
            );
            println!();
        }
    }

    engine.register_ui_task(Box::new(ConsoleUiTask { last_print_ms: 0 }));
    engine.start();
    for _ in 0..ticks {
        thread::sleep(Duration::from_millis(tick_ms));
        engine.on_timer();
    }
    engine.stop();

    let record = engine.save_now();
    print_summary(&engine);

    if dump_save {
        println!();
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}

fn print_summary(engine: &GameEngine) {
    let state = engine.state();
    let aux = engine.aux();
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  sips:          {}", state.currency);
    println!("  lifetime sips: {}", state.total_sips_earned);
    println!("  spd:           {}", state.production_rate_per_drink);
    println!("  drink rate:    {}ms", state.drink_interval_ms);
    println!("  playtime:      {}ms", aux.total_play_time_ms);
    println!("  clicks:        {}", aux.total_clicks);
    println!("  level:         {}", aux.level);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
