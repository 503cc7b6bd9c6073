#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hush Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod channel;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Hush Defence.";

/// Maximum noise contribution a single enemy can load onto the meter.
///
/// Every enemy registers with a contribution of 1 on its first live frame and
/// climbs toward this value as it approaches the house.
pub const ENEMY_MAX_SOUND_CONTRIBUTION: u32 = 10;

/// World X coordinate of the house line where enemies stop advancing.
pub const BOARD_END_X: f32 = 270.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the field at the provided position.
    SpawnEnemy {
        /// Variant of the enemy to create.
        kind: EnemyKind,
        /// Board row the enemy will travel along.
        lane: u32,
        /// World X at which the enemy appears, normally the right viewport edge.
        x: f32,
        /// World Y of the lane the enemy travels along.
        y: f32,
    },
    /// Commits a single enemy's horizontal advance for this frame.
    MoveEnemy {
        /// Identifier of the enemy being moved.
        enemy: EnemyId,
        /// World X the enemy occupies after the move.
        x: f32,
    },
    /// Starts the death sequence for each listed enemy.
    KillEnemies {
        /// Identifiers of the enemies entering their death sequence.
        enemies: Vec<EnemyId>,
    },
    /// Registers a freshly spawned enemy's initial unit of noise.
    RegisterEnemySound {
        /// Identifier of the enemy announcing its presence.
        enemy: EnemyId,
    },
    /// Replaces an enemy's stored noise contribution with a new value.
    AdjustEnemySound {
        /// Identifier of the enemy whose contribution changed.
        enemy: EnemyId,
        /// New contribution in `1..=ENEMY_MAX_SOUND_CONTRIBUTION`.
        contribution: u32,
    },
    /// Records that an enemy stands in striking range of the player.
    RecordEnemyContact {
        /// Identifier of the enemy touching the player.
        enemy: EnemyId,
    },
    /// Pauses or resumes the game timer.
    SetTimerPaused {
        /// Whether the timer should stop accruing elapsed time.
        paused: bool,
    },
    /// Sends the player walking toward the provided world position.
    MovePlayerTo {
        /// Destination X in world coordinates.
        x: f32,
        /// Destination Y in world coordinates.
        y: f32,
    },
    /// Requests that the player equip the named item.
    EquipItem {
        /// Item the player should hold.
        kind: ItemKind,
    },
    /// Requests that the player start using whatever item is equipped.
    UseEquippedItem,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy by the world.
        enemy: EnemyId,
        /// Variant of the spawned enemy.
        kind: EnemyKind,
        /// Board row the enemy travels along.
        lane: u32,
        /// World X at which the enemy appeared.
        x: f32,
    },
    /// Confirms that an enemy advanced along its lane.
    EnemyAdvanced {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// World X the enemy occupied before the move.
        from_x: f32,
        /// World X the enemy occupies after the move.
        to_x: f32,
    },
    /// Announces that an enemy entered its death sequence.
    EnemyDying {
        /// Identifier of the dying enemy.
        enemy: EnemyId,
    },
    /// Confirms that a dead enemy left the field after its grace window.
    EnemyRemoved {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// Confirms that an enemy walked out of the visible bounds and left play.
    EnemyDespawned {
        /// Identifier of the despawned enemy.
        enemy: EnemyId,
    },
    /// Reports that noise was added to the shared meter.
    SoundAdded {
        /// Amount actually added after clamping at the cap.
        amount: u32,
        /// Meter value after the addition.
        current: u32,
    },
    /// Reports that noise was removed from the shared meter.
    SoundReduced {
        /// Amount actually removed after clamping at zero.
        amount: u32,
        /// Meter value after the reduction.
        current: u32,
    },
    /// Announces that the noise meter reached its cap. Fires exactly once.
    Overwhelmed,
    /// Announces that the game timer ran out. Fires exactly once.
    TimerFinished,
    /// Confirms that the game timer stopped accruing elapsed time.
    TimerPaused,
    /// Confirms that the game timer resumed accruing elapsed time.
    TimerResumed,
    /// Announces victory once the post-timer cleanup grace window elapsed.
    GameWon,
    /// Confirms that the player reached its movement destination.
    PlayerArrived {
        /// World X where the player stopped.
        x: f32,
        /// World Y where the player stopped.
        y: f32,
    },
    /// Announces that the player became unable to move or equip.
    PlayerBlocked,
    /// Announces that the player may move and equip again.
    PlayerUnblocked,
    /// Confirms that the player equipped an item.
    ItemEquipped {
        /// Item now held by the player.
        kind: ItemKind,
    },
    /// Confirms that the player released an item.
    ItemUnequipped {
        /// Item no longer held by the player.
        kind: ItemKind,
    },
    /// Announces that an item's use window opened.
    ItemUseStarted {
        /// Item being used.
        kind: ItemKind,
    },
    /// Announces that an item's use window closed and its effect applied.
    ItemUseCompleted {
        /// Item whose use completed.
        kind: ItemKind,
    },
    /// Announces that an item's cooldown expired and it is ready again.
    ItemCooldownComplete {
        /// Item that became ready.
        kind: ItemKind,
    },
    /// Reports that an enemy closed within striking range of the player.
    EnemyReachedPlayer {
        /// Identifier of the enemy touching the player.
        enemy: EnemyId,
    },
}

/// Unique identifier assigned to an enemy by the world.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Enemy variants that can enter the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Rattle-shaker. Fastest of the three.
    Cascabel,
    /// Drummer. Slow but relentless.
    Tambor,
    /// Devil dancer. Middle of the pack.
    Diablo,
}

impl EnemyKind {
    /// Canonical list of every variant.
    ///
    /// Random selection draws a uniform index over this slice, so adding a
    /// variant here automatically keeps the spawn distribution uniform.
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Cascabel, EnemyKind::Tambor, EnemyKind::Diablo];

    /// Horizontal advance per frame tick, in world units.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Cascabel => 1.0,
            Self::Tambor => 0.5,
            Self::Diablo => 0.8,
        }
    }

    /// Display width used as the hit-box proxy.
    #[must_use]
    pub const fn width(self) -> f32 {
        125.0
    }

    /// Display height used as the hit-box proxy.
    #[must_use]
    pub const fn height(self) -> f32 {
        150.0
    }
}

/// Items the player can equip and use against the enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Broom: short sweep covering the player's cell and the cell ahead.
    Broom,
    /// Hose: water jet covering the player's whole lane.
    Hose,
}

impl ItemKind {
    /// Duration the item remains in its "using" state once triggered.
    #[must_use]
    pub const fn use_duration(self) -> Duration {
        match self {
            Self::Broom => Duration::from_millis(1_500),
            Self::Hose => Duration::from_millis(2_500),
        }
    }

    /// Cooldown that follows each completed use.
    #[must_use]
    pub const fn cooldown(self) -> Duration {
        match self {
            Self::Broom => Duration::from_millis(2_000),
            Self::Hose => Duration::from_millis(8_000),
        }
    }

    /// Whether this item's cooldown blocks equipping any item meanwhile.
    #[must_use]
    pub const fn blocks_items(self) -> bool {
        match self {
            Self::Broom => false,
            Self::Hose => true,
        }
    }
}

/// Progression state of a single item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemState {
    /// The item may be equipped and used.
    Ready,
    /// The item's use window is open and its effect is active.
    Using,
    /// The item is recharging and cannot be used.
    Cooldown,
}

/// Location of a single board cell expressed as column and row coordinates.
///
/// Cell queries may carry addresses at or past the board edge; the boundary
/// extrapolation rules in the board crate decide whether such an address
/// still covers a world position.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Current size of the rendering surface in world units.
///
/// The viewport may resize between frames, so geometry is always re-derived
/// from a freshly supplied value rather than cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Creates a viewport descriptor from explicit dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width of the rendering surface.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the rendering surface.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Board row the enemy travels along.
    pub lane: u32,
    /// Current world X position.
    pub x: f32,
    /// Current world Y position.
    pub y: f32,
    /// World X captured when the enemy spawned.
    pub spawn_x: f32,
    /// Whether the movement pass may advance this enemy.
    pub can_move: bool,
    /// Whether the enemy is frozen inside its death sequence.
    pub dying: bool,
    /// Current additive load on the noise meter. Zero until registered.
    pub sound_contribution: u32,
}

/// Read-only snapshot describing all enemies on the field.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the field was empty when the view was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current world X position.
    pub x: f32,
    /// Current world Y position.
    pub y: f32,
    /// Whether the player is walking toward a destination.
    pub is_moving: bool,
    /// Item the player currently holds, if any.
    pub equipped: Option<ItemKind>,
    /// Whether an in-use item currently shields the player from collisions.
    pub shielded: bool,
}
