//! The game engine — the one owner of live state.
//!
//! STARTUP ORDER (fixed, documented, never reordered):
//!   1. Load the persisted record (repairing as needed).
//!   2. Compute the offline catch-up.
//!   3. Apply it, once.
//!   4. Wire the task order and hand ticking to the host's timer.
//!
//! RULES:
//!   - GameState and AuxState live here and nowhere else. Tasks borrow
//!     them for one tick at a time; nothing reaches into ambient scope.
//!   - Required capabilities (store, clock) are constructor parameters.
//!     There is no "call if present" — a missing capability fails at
//!     construction, not silently at call time.
//!   - The economy/input layer mutates currency and the production rate
//!     between ticks through the accessors below; the tick loop
//!     tolerates that.

use crate::accrual::DrinkTask;
use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::error::GameResult;
use crate::offline::{self, OfflineResult};
use crate::persistence::PersistenceManager;
use crate::quantity::Quantity;
use crate::save::SaveRecord;
use crate::scheduler::{TickContext, TickScheduler, TickTask};
use crate::state::{AuxState, GameState};
use crate::store::SaveStore;
use crate::tasks::{AutosaveTask, PlaytimeTask, ProgressTask, StatsTask};

pub struct GameEngine {
    config: CoreConfig,
    clock: Box<dyn Clock>,
    state: GameState,
    aux: AuxState,
    scheduler: TickScheduler,
    persistence: PersistenceManager,
    ui_tasks: Vec<Box<dyn TickTask>>,
    tasks_wired: bool,
    offline_summary: Option<OfflineResult>,
}

impl GameEngine {
    /// Build a fully loaded engine: persisted state in, offline credit
    /// applied. Call `start()` to begin ticking.
    pub fn boot(
        mut config: CoreConfig,
        store: Box<dyn SaveStore>,
        clock: Box<dyn Clock>,
    ) -> GameResult<Self> {
        config.sanitize();
        let now = clock.now_ms();
        let mut persistence = PersistenceManager::new(store, config.clone());
        let (mut state, aux) = persistence.load(now);

        let result = offline::reconcile(
            state.last_persist_ms,
            now,
            state.drink_interval_ms,
            &state.production_rate_per_drink,
            &config.offline,
        );
        let summary = result.clone();
        offline::apply(&mut state, result, now);

        Ok(Self {
            config,
            clock,
            state,
            aux,
            scheduler: TickScheduler::new(),
            persistence,
            ui_tasks: Vec::new(),
            tasks_wired: false,
            offline_summary: Some(summary),
        })
    }

    /// Host-registered UI callback; runs after accrual and before the
    /// slow batch. Register before the first `start()`.
    pub fn register_ui_task(&mut self, task: Box<dyn TickTask>) {
        if self.tasks_wired {
            log::warn!("ui task '{}' registered after start, ignored", task.name());
            return;
        }
        self.ui_tasks.push(task);
    }

    fn wire_tasks(&mut self) {
        if self.tasks_wired {
            return;
        }
        self.scheduler.register(Box::new(ProgressTask));
        self.scheduler.register(Box::new(DrinkTask));
        for task in self.ui_tasks.drain(..) {
            self.scheduler.register(task);
        }
        self.scheduler.register(Box::new(StatsTask));
        self.scheduler.register(Box::new(PlaytimeTask::new()));
        self.scheduler.register(Box::new(AutosaveTask));
        self.tasks_wired = true;
    }

    /// Begin (or restart) ticking. Runs the initial synchronous pass;
    /// the host's repeating timer then drives `on_timer`.
    pub fn start(&mut self) {
        self.wire_tasks();
        let now = self.clock.now_ms();
        let mut ctx = TickContext {
            state: &mut self.state,
            aux: &mut self.aux,
            persistence: &mut self.persistence,
        };
        self.scheduler.start(now, &mut ctx);
    }

    /// One tick. Called by the host timer at its chosen cadence.
    pub fn on_timer(&mut self) {
        let now = self.clock.now_ms();
        let mut ctx = TickContext {
            state: &mut self.state,
            aux: &mut self.aux,
            persistence: &mut self.persistence,
        };
        self.scheduler.on_timer(now, &mut ctx);
    }

    /// Idempotent; a timer that fires after this is a no-op.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Immediate save, independent of the autosave cadence.
    pub fn save_now(&mut self) -> SaveRecord {
        let now = self.clock.now_ms();
        self.persistence.save(&mut self.state, &self.aux, now)
    }

    /// One-shot summary of the boot-time catch-up, for hosts that show
    /// a "welcome back" panel.
    pub fn take_offline_summary(&mut self) -> Option<OfflineResult> {
        self.offline_summary.take()
    }

    // ── Rendering-layer accessors ──────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn aux(&self) -> &AuxState {
        &self.aux
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    // ── Economy/input-layer mutation points ────────────────────────

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn aux_mut(&mut self) -> &mut AuxState {
        &mut self.aux
    }

    /// A manual click: immediate sips, counted for the record.
    pub fn record_click(&mut self, sips_per_click: &Quantity) {
        self.state.currency = self.state.currency.add(sips_per_click);
        self.state.total_sips_earned = self.state.total_sips_earned.add(sips_per_click);
        self.aux.total_clicks += 1;
    }

    pub fn set_production_rate(&mut self, spd: Quantity) {
        self.state.production_rate_per_drink = spd;
    }
}
