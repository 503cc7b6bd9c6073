#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Hush Defence.
//!
//! The world owns every mutable fact of a session: the enemies on the field,
//! the shared noise meter, the game timer, the player avatar, and the item
//! slots. Adapters and systems mutate it exclusively through [`apply`] and
//! observe it through the [`query`] module and the emitted [`Event`] stream.
//! All deferred behavior (death sequences, the win grace window, item use and
//! cooldown windows) is countdown state advanced by `Command::Tick`; nothing
//! in this crate schedules callbacks.

use std::time::Duration;

use hush_defence_core::{
    Command, EnemyId, EnemyKind, Event, ItemKind, ItemState, WELCOME_BANNER, BOARD_END_X,
    ENEMY_MAX_SOUND_CONTRIBUTION,
};

/// Time a killed enemy stays on the field playing its death sequence.
const DEATH_SEQUENCE: Duration = Duration::from_millis(500);

/// Grace window between the timer finishing and victory being declared.
const WIN_TRANSITION_DELAY: Duration = Duration::from_millis(1_000);

/// Distance under which the player snaps onto its movement destination.
const PLAYER_ARRIVAL_THRESHOLD: f32 = 2.0;

/// Session tuning the world is created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rules {
    /// Noise meter cap. Reaching it loses the game.
    pub max_sound: u32,
    /// Total session length before the win grace window starts.
    pub timer_duration: Duration,
    /// Player walking speed in world units per second.
    pub player_speed: f32,
    /// Player starting X in world coordinates.
    pub player_start_x: f32,
    /// Player starting Y in world coordinates.
    pub player_start_y: f32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_sound: 100,
            timer_duration: Duration::from_secs(60),
            player_speed: 200.0,
            player_start_x: 150.0,
            player_start_y: 650.0,
        }
    }
}

#[derive(Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    lane: u32,
    x: f32,
    y: f32,
    spawn_x: f32,
    can_move: bool,
    // Remaining death-sequence time once killed. `None` means alive.
    dying: Option<Duration>,
    sound_contribution: u32,
    reached_player: bool,
}

#[derive(Debug)]
struct NoiseMeter {
    current: u32,
    max: u32,
    overwhelmed: bool,
}

impl NoiseMeter {
    const fn new(max: u32) -> Self {
        Self {
            current: 0,
            max,
            overwhelmed: false,
        }
    }

    // Additions stop once the meter overwhelms. The loss is terminal and a
    // louder field must not re-announce it.
    fn add(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if self.overwhelmed || amount == 0 {
            return;
        }
        let next = self.current.saturating_add(amount).min(self.max);
        let added = next - self.current;
        if added == 0 {
            return;
        }
        self.current = next;
        out_events.push(Event::SoundAdded {
            amount: added,
            current: self.current,
        });
        if self.current == self.max {
            self.overwhelmed = true;
            out_events.push(Event::Overwhelmed);
        }
    }

    fn reduce(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        let removed = amount.min(self.current);
        if removed == 0 {
            return;
        }
        self.current -= removed;
        out_events.push(Event::SoundReduced {
            amount: removed,
            current: self.current,
        });
    }
}

#[derive(Debug)]
struct GameTimer {
    elapsed: Duration,
    duration: Duration,
    paused: bool,
    finished: bool,
}

impl GameTimer {
    const fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
            paused: false,
            finished: false,
        }
    }

    // Returns true on the tick that crosses the finish line. `finished` is
    // monotonic; later ticks never report a second finish.
    fn advance(&mut self, dt: Duration) -> bool {
        if self.paused || self.finished {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.finished = true;
            return true;
        }
        false
    }

    fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }
}

#[derive(Debug)]
struct Player {
    x: f32,
    y: f32,
    speed: f32,
    target: Option<(f32, f32)>,
    equipped: Option<ItemKind>,
    blocked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ItemPhase {
    Ready,
    Using { elapsed: Duration },
    Cooldown { remaining: Duration },
}

#[derive(Debug)]
struct Item {
    kind: ItemKind,
    phase: ItemPhase,
}

impl Item {
    const fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            phase: ItemPhase::Ready,
        }
    }

    fn state(&self) -> ItemState {
        match self.phase {
            ItemPhase::Ready => ItemState::Ready,
            ItemPhase::Using { .. } => ItemState::Using,
            ItemPhase::Cooldown { .. } => ItemState::Cooldown,
        }
    }
}

/// Represents the authoritative Hush Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    rules: Rules,
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    noise: NoiseMeter,
    timer: GameTimer,
    win_countdown: Option<Duration>,
    won: bool,
    player: Player,
    items: [Item; 2],
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new world with the default session rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Creates a new world tuned by the provided rules.
    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            banner: WELCOME_BANNER,
            enemies: Vec::new(),
            next_enemy_id: 0,
            noise: NoiseMeter::new(rules.max_sound),
            timer: GameTimer::new(rules.timer_duration),
            win_countdown: None,
            won: false,
            player: Player {
                x: rules.player_start_x,
                y: rules.player_start_y,
                speed: rules.player_speed,
                target: None,
                equipped: None,
                blocked: false,
            },
            items: [Item::new(ItemKind::Broom), Item::new(ItemKind::Hose)],
            rules,
        }
    }

    /// Session rules the world was created with.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    // Slot order is fixed at construction: broom first, hose second.
    fn item(&self, kind: ItemKind) -> &Item {
        match kind {
            ItemKind::Broom => &self.items[0],
            ItemKind::Hose => &self.items[1],
        }
    }

    fn item_mut(&mut self, kind: ItemKind) -> &mut Item {
        match kind {
            ItemKind::Broom => &mut self.items[0],
            ItemKind::Hose => &mut self.items[1],
        }
    }

    fn any_item_in_use(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item.phase, ItemPhase::Using { .. }))
    }

    fn equip_gate_open(&self) -> bool {
        if self.any_item_in_use() {
            return false;
        }
        !self.items.iter().any(|item| {
            item.kind.blocks_items() && matches!(item.phase, ItemPhase::Cooldown { .. })
        })
    }

    fn start_death_sequence(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemy_mut(id) else {
            return;
        };
        if enemy.dying.is_some() {
            return;
        }
        enemy.dying = Some(DEATH_SEQUENCE);
        enemy.can_move = false;
        let credit = enemy.sound_contribution;
        enemy.sound_contribution = 0;
        out_events.push(Event::EnemyDying { enemy: id });
        self.noise.reduce(credit, out_events);
    }

    // Two-phase removal: mark finished countdowns first, drop after the scan.
    fn advance_death_sequences(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut removed: Vec<EnemyId> = Vec::new();
        for enemy in &mut self.enemies {
            if let Some(remaining) = enemy.dying {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    removed.push(enemy.id);
                } else {
                    enemy.dying = Some(remaining);
                }
            }
        }
        for id in removed {
            self.enemies.retain(|enemy| enemy.id != id);
            out_events.push(Event::EnemyRemoved { enemy: id });
        }
    }

    fn advance_player(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some((target_x, target_y)) = self.player.target else {
            return;
        };
        let dx = target_x - self.player.x;
        let dy = target_y - self.player.y;
        let distance = (dx * dx + dy * dy).sqrt();
        let step = self.player.speed * dt.as_secs_f32();
        if distance <= PLAYER_ARRIVAL_THRESHOLD || step >= distance {
            self.player.x = target_x;
            self.player.y = target_y;
            self.player.target = None;
            out_events.push(Event::PlayerArrived {
                x: target_x,
                y: target_y,
            });
        } else {
            self.player.x += dx / distance * step;
            self.player.y += dy / distance * step;
        }
    }

    fn advance_items(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut unblock = false;
        for item in &mut self.items {
            match item.phase {
                ItemPhase::Ready => {}
                ItemPhase::Using { elapsed } => {
                    let elapsed = elapsed.saturating_add(dt);
                    if elapsed >= item.kind.use_duration() {
                        item.phase = ItemPhase::Cooldown {
                            remaining: item.kind.cooldown(),
                        };
                        out_events.push(Event::ItemUseCompleted { kind: item.kind });
                        unblock = true;
                    } else {
                        item.phase = ItemPhase::Using { elapsed };
                    }
                }
                ItemPhase::Cooldown { remaining } => {
                    let remaining = remaining.saturating_sub(dt);
                    if remaining.is_zero() {
                        item.phase = ItemPhase::Ready;
                        out_events.push(Event::ItemCooldownComplete { kind: item.kind });
                    } else {
                        item.phase = ItemPhase::Cooldown { remaining };
                    }
                }
            }
        }

        if unblock {
            // Completing a use releases the avatar and drops the item from
            // the hand in the same frame.
            if let Some(kind) = self.player.equipped.take() {
                out_events.push(Event::ItemUnequipped { kind });
            }
            if self.player.blocked {
                self.player.blocked = false;
                out_events.push(Event::PlayerUnblocked);
            }
        }
    }

    fn advance_win_countdown(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(remaining) = self.win_countdown else {
            return;
        };
        let remaining = remaining.saturating_sub(dt);
        if remaining.is_zero() {
            self.win_countdown = None;
            if !self.won && !self.noise.overwhelmed {
                self.won = true;
                out_events.push(Event::GameWon);
            }
        } else {
            self.win_countdown = Some(remaining);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });

            let finished_now = world.timer.advance(dt);
            if finished_now {
                out_events.push(Event::TimerFinished);
                let survivors: Vec<EnemyId> =
                    world.enemies.iter().map(|enemy| enemy.id).collect();
                for id in survivors {
                    world.start_death_sequence(id, out_events);
                }
                world.win_countdown = Some(WIN_TRANSITION_DELAY);
            }

            world.advance_death_sequences(dt, out_events);
            world.advance_items(dt, out_events);
            if !world.player.blocked {
                world.advance_player(dt, out_events);
            }
            // The grace window starts counting on the frame after it was
            // armed; the finishing tick's remainder must not eat into it.
            if !finished_now {
                world.advance_win_countdown(dt, out_events);
            }
        }
        Command::SpawnEnemy { kind, lane, x, y } => {
            let id = EnemyId::new(world.next_enemy_id);
            world.next_enemy_id = world.next_enemy_id.wrapping_add(1);
            world.enemies.push(Enemy {
                id,
                kind,
                lane,
                x,
                y,
                spawn_x: x,
                can_move: true,
                dying: None,
                sound_contribution: 0,
                reached_player: false,
            });
            out_events.push(Event::EnemySpawned {
                enemy: id,
                kind,
                lane,
                x,
            });
        }
        Command::MoveEnemy { enemy, x } => {
            let Some(target) = world.enemy_mut(enemy) else {
                return;
            };
            if target.dying.is_some() || !target.can_move {
                return;
            }

            // Walking off the left edge ends the enemy's stay quietly. The
            // check precedes the house-line clamp so the two coexist.
            if x + target.kind.width() / 2.0 < 0.0 {
                let credit = target.sound_contribution;
                world.enemies.retain(|candidate| candidate.id != enemy);
                world.noise.reduce(credit, out_events);
                out_events.push(Event::EnemyDespawned { enemy });
                return;
            }

            let from_x = target.x;
            let to_x = x.max(BOARD_END_X);
            target.x = to_x;
            if to_x <= BOARD_END_X {
                target.can_move = false;
            }
            out_events.push(Event::EnemyAdvanced {
                enemy,
                from_x,
                to_x,
            });
        }
        Command::KillEnemies { enemies } => {
            for id in enemies {
                world.start_death_sequence(id, out_events);
            }
        }
        Command::RegisterEnemySound { enemy } => {
            let Some(target) = world.enemy_mut(enemy) else {
                return;
            };
            if target.dying.is_some() || target.sound_contribution != 0 {
                return;
            }
            target.sound_contribution = 1;
            world.noise.add(1, out_events);
        }
        Command::AdjustEnemySound {
            enemy,
            contribution,
        } => {
            let contribution = contribution.clamp(1, ENEMY_MAX_SOUND_CONTRIBUTION);
            let Some(target) = world.enemy_mut(enemy) else {
                return;
            };
            if target.dying.is_some() || target.sound_contribution == 0 {
                return;
            }
            let previous = target.sound_contribution;
            if contribution == previous {
                return;
            }
            target.sound_contribution = contribution;
            if contribution > previous {
                world.noise.add(contribution - previous, out_events);
            } else {
                world.noise.reduce(previous - contribution, out_events);
            }
        }
        Command::RecordEnemyContact { enemy } => {
            let Some(target) = world.enemy_mut(enemy) else {
                return;
            };
            if target.dying.is_some() || target.reached_player {
                return;
            }
            target.reached_player = true;
            out_events.push(Event::EnemyReachedPlayer { enemy });
        }
        Command::SetTimerPaused { paused } => {
            if world.timer.finished || world.timer.paused == paused {
                return;
            }
            world.timer.paused = paused;
            out_events.push(if paused {
                Event::TimerPaused
            } else {
                Event::TimerResumed
            });
        }
        Command::MovePlayerTo { x, y } => {
            if world.player.blocked {
                return;
            }
            world.player.target = Some((x, y));
        }
        Command::EquipItem { kind } => {
            if world.player.blocked || !world.equip_gate_open() {
                return;
            }
            if world.item(kind).state() != ItemState::Ready {
                return;
            }
            if world.player.equipped == Some(kind) {
                return;
            }
            if let Some(previous) = world.player.equipped.take() {
                out_events.push(Event::ItemUnequipped { kind: previous });
            }
            world.player.equipped = Some(kind);
            out_events.push(Event::ItemEquipped { kind });
        }
        Command::UseEquippedItem => {
            let Some(kind) = world.player.equipped else {
                return;
            };
            if world.item(kind).state() != ItemState::Ready {
                return;
            }
            world.item_mut(kind).phase = ItemPhase::Using {
                elapsed: Duration::ZERO,
            };
            world.player.target = None;
            world.player.blocked = true;
            out_events.push(Event::ItemUseStarted { kind });
            out_events.push(Event::PlayerBlocked);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use hush_defence_board::Board;
    use hush_defence_core::{
        CellCoord, EnemyId, EnemySnapshot, EnemyView, ItemKind, ItemState, PlayerSnapshot,
        Viewport,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only view of the enemies on the field.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                lane: enemy.lane,
                x: enemy.x,
                y: enemy.y,
                spawn_x: enemy.spawn_x,
                can_move: enemy.can_move,
                dying: enemy.dying.is_some(),
                sound_contribution: enemy.sound_contribution,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the player avatar.
    #[must_use]
    pub fn player_view(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            x: world.player.x,
            y: world.player.y,
            is_moving: world.player.target.is_some(),
            equipped: world.player.equipped,
            shielded: world.any_item_in_use(),
        }
    }

    /// Read-only snapshot of the game timer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TimerView {
        /// Simulated time consumed so far.
        pub elapsed: Duration,
        /// Total session length.
        pub duration: Duration,
        /// Time left before the timer finishes.
        pub remaining: Duration,
        /// Whether the timer is currently paused.
        pub paused: bool,
        /// Whether the timer ran out. Monotonic.
        pub finished: bool,
    }

    /// Captures a read-only view of the game timer.
    #[must_use]
    pub fn timer_view(world: &World) -> TimerView {
        TimerView {
            elapsed: world.timer.elapsed,
            duration: world.timer.duration,
            remaining: world.timer.remaining(),
            paused: world.timer.paused,
            finished: world.timer.finished,
        }
    }

    /// Read-only snapshot of the shared noise meter.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NoiseView {
        /// Current meter value.
        pub current: u32,
        /// Meter cap.
        pub max: u32,
        /// Whether the meter reached its cap. Terminal.
        pub overwhelmed: bool,
    }

    /// Captures a read-only view of the shared noise meter.
    #[must_use]
    pub fn noise_view(world: &World) -> NoiseView {
        NoiseView {
            current: world.noise.current,
            max: world.noise.max,
            overwhelmed: world.noise.overwhelmed,
        }
    }

    /// Read-only snapshot of a single item slot.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ItemView {
        /// Item the slot holds.
        pub kind: ItemKind,
        /// Current phase of the item's state machine.
        pub state: ItemState,
        /// Whether the player currently holds this item.
        pub equipped: bool,
    }

    /// Captures a read-only view of the named item slot.
    #[must_use]
    pub fn item_view(world: &World, kind: ItemKind) -> ItemView {
        ItemView {
            kind,
            state: world.item(kind).state(),
            equipped: world.player.equipped == Some(kind),
        }
    }

    /// Whether the world declared victory.
    #[must_use]
    pub fn game_won(world: &World) -> bool {
        world.won
    }

    /// Enemies whose center sits inside any of the provided cells.
    ///
    /// In-board addresses resolve through the board's own cell lookup, which
    /// respects perspective quads; addresses past the board edge fall back to
    /// the flat extrapolated rectangle, so an attack aimed past the edge
    /// still lands.
    #[must_use]
    pub fn enemies_in_cells(
        world: &World,
        board: &Board,
        viewport: Viewport,
        cells: &[CellCoord],
    ) -> Vec<EnemyId> {
        let in_board =
            |cell: &CellCoord| cell.column() < board.cols() && cell.row() < board.rows();
        let mut hits: Vec<EnemyId> = world
            .enemies
            .iter()
            .filter(|enemy| enemy.dying.is_none())
            .filter(|enemy| {
                cells.iter().any(|cell| {
                    if in_board(cell) {
                        board.world_to_cell(viewport, enemy.x, enemy.y) == Some(*cell)
                    } else {
                        board
                            .extrapolated_cell_rect(viewport, *cell)
                            .contains(enemy.x, enemy.y)
                    }
                })
            })
            .map(|enemy| enemy.id)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Enemies currently colliding with a stationary, unshielded player.
    ///
    /// An enemy collides when it shares the player's lane and stands in the
    /// player's column or the column the enemies approach through, one step
    /// toward the right edge. A walking player or one shielded by an in-use
    /// item is never collided with.
    #[must_use]
    pub fn colliding_enemies(world: &World, board: &Board, viewport: Viewport) -> Vec<EnemyId> {
        let player = player_view(world);
        if player.is_moving || player.shielded {
            return Vec::new();
        }
        let player_cell = board.world_to_nearest_cell(viewport, player.x, player.y);
        let mut hits: Vec<EnemyId> = world
            .enemies
            .iter()
            .filter(|enemy| enemy.dying.is_none())
            .filter(|enemy| {
                let cell = board.world_to_nearest_cell(viewport, enemy.x, enemy.y);
                cell.row() == player_cell.row()
                    && (cell.column() == player_cell.column()
                        || cell.column() == player_cell.column() + 1)
            })
            .map(|enemy| enemy.id)
            .collect();
        hits.sort_unstable();
        hits
    }
}
