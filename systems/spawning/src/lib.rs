#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.
//!
//! The scheduler accumulates `TimeAdvanced` events and emits
//! `Command::SpawnEnemy` whenever the active strategy's cadence elapses.
//! Variant and lane selection draw from a seeded ChaCha stream, so two runs
//! with the same seed and tick script produce identical spawn sequences.

use std::{collections::VecDeque, time::Duration};

use hush_defence_board::Board;
use hush_defence_core::{CellCoord, Command, EnemyKind, EnemyView, Event, Viewport};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Steady-state pause between spawns.
const STEADY_COOLDOWN: Duration = Duration::from_millis(5_000);

/// Number of accelerated spawns a burst window grants.
const BURST_LENGTH: u32 = 3;

/// Every n-th spawn opens a burst window under the burst strategy.
const BURST_TRIGGER: u32 = 5;

/// Spawn cadence shapes the scheduler can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnStrategy {
    /// Scripted opening: one enemy of each variant, the next entering only
    /// once the field is empty again. Spawning stops when the script runs
    /// out.
    Intro,
    /// Fixed cooldown between spawns.
    Steady,
    /// Steady cadence that opens a short accelerated window on every
    /// [`BURST_TRIGGER`]-th spawn: the cooldown drops to a third for
    /// [`BURST_LENGTH`] spawns, then resets.
    Burst,
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    strategy: SpawnStrategy,
    cooldown: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided strategy and seed.
    #[must_use]
    pub const fn new(strategy: SpawnStrategy, rng_seed: u64) -> Self {
        Self {
            strategy,
            cooldown: STEADY_COOLDOWN,
            rng_seed,
        }
    }

    /// Overrides the steady cooldown, mainly for tests and tuning runs.
    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

/// Pure system that deterministically emits enemy spawn commands.
#[derive(Debug)]
pub struct Spawning {
    strategy: SpawnStrategy,
    base_cooldown: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
    intro_queue: VecDeque<EnemyKind>,
    spawn_count: u32,
    burst_remaining: u32,
    force_requested: bool,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let intro_queue = if config.strategy == SpawnStrategy::Intro {
            EnemyKind::ALL.into_iter().collect()
        } else {
            VecDeque::new()
        };
        Self {
            strategy: config.strategy,
            base_cooldown: config.cooldown,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            intro_queue,
            spawn_count: 0,
            burst_remaining: 0,
            force_requested: false,
        }
    }

    /// Requests one spawn that bypasses the cooldown on the next pass.
    pub fn request_spawn(&mut self) {
        self.force_requested = true;
    }

    /// Consumes events and immutable views to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        board: &Board,
        viewport: Viewport,
        out: &mut Vec<Command>,
    ) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        let forced = self.force_requested;
        self.force_requested = false;

        if self.strategy == SpawnStrategy::Intro {
            // The opening script ignores the clock entirely and the
            // scheduler goes quiet once it runs out.
            if enemies.is_empty() || forced {
                if let Some(kind) = self.intro_queue.pop_front() {
                    self.emit_spawn(Some(kind), board, viewport, out);
                }
            }
            return;
        }

        if forced {
            self.emit_spawn(None, board, viewport, out);
            // A forced spawn restarts the cooldown from scratch.
            self.accumulator = Duration::ZERO;
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let cooldown = self.current_cooldown();
        if cooldown.is_zero() {
            return;
        }
        while self.accumulator >= self.current_cooldown() {
            self.accumulator -= self.current_cooldown();
            self.emit_spawn(None, board, viewport, out);
        }
    }

    fn current_cooldown(&self) -> Duration {
        if self.burst_remaining > 0 {
            self.base_cooldown / 3
        } else {
            self.base_cooldown
        }
    }

    fn emit_spawn(
        &mut self,
        scripted_kind: Option<EnemyKind>,
        board: &Board,
        viewport: Viewport,
        out: &mut Vec<Command>,
    ) {
        let kind = scripted_kind.unwrap_or_else(|| self.select_kind());
        let lane = self.rng.gen_range(0..board.rows());
        let entry_cell = CellCoord::new(board.cols() - 1, lane);
        let y = board.cell_to_world(viewport, entry_cell).y;

        out.push(Command::SpawnEnemy {
            kind,
            lane,
            x: viewport.width(),
            y,
        });

        self.spawn_count += 1;
        if self.burst_remaining > 0 {
            self.burst_remaining -= 1;
        } else if self.strategy == SpawnStrategy::Burst && self.spawn_count % BURST_TRIGGER == 0 {
            self.burst_remaining = BURST_LENGTH;
        }
    }

    // Uniform index over the canonical variant list. Adding a variant to
    // `EnemyKind::ALL` keeps the draw uniform without touching this code.
    fn select_kind(&mut self) -> EnemyKind {
        let index = self.rng.gen_range(0..EnemyKind::ALL.len());
        EnemyKind::ALL[index]
    }
}
