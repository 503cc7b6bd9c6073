#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy advance planning with same-lane overlap avoidance.
//!
//! Once per tick every movable enemy steps left by its variant speed. A step
//! is withheld when it would push the enemy into the back of a lane-mate, so
//! columns of enemies queue up behind the slowest walker instead of stacking
//! on one world position. The world clamps the committed step at the house
//! line; this system never moves an enemy past it either.

use hush_defence_core::{Command, EnemySnapshot, EnemyView, Event, BOARD_END_X};

/// Pure system that plans one horizontal step per enemy per tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement planner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes events and the enemy view to emit movement commands.
    ///
    /// Enemies are visited in id order, so older enemies move first and a
    /// freshly spawned follower can never leapfrog the walker ahead of it
    /// within a single tick.
    pub fn handle(&self, events: &[Event], enemies: &EnemyView, out: &mut Vec<Command>) {
        let ticked = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !ticked {
            return;
        }

        for enemy in enemies.iter() {
            if enemy.dying || !enemy.can_move {
                continue;
            }
            let tentative = (enemy.x - enemy.kind.speed()).max(BOARD_END_X);
            if tentative >= enemy.x {
                continue;
            }
            if blocked_by_lane_mate(enemy, enemies, tentative) {
                continue;
            }
            out.push(Command::MoveEnemy {
                enemy: enemy.id,
                x: tentative,
            });
        }
    }
}

// O(n^2) over the field; lanes hold a handful of enemies at a time.
fn blocked_by_lane_mate(mover: &EnemySnapshot, enemies: &EnemyView, tentative: f32) -> bool {
    let spacing = mover.kind.width() / 2.0;
    enemies.iter().any(|other| {
        if other.id == mover.id || other.lane != mover.lane || other.dying {
            return false;
        }
        let ahead = other.x < mover.x || (other.x == mover.x && other.id < mover.id);
        ahead && tentative - other.x < spacing
    })
}
