#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Noise accounting: reduces enemy approach progress into meter commands.
//!
//! Every live enemy loads the shared meter with a contribution between 1 and
//! [`ENEMY_MAX_SOUND_CONTRIBUTION`], proportional to how far it has walked
//! from its spawn point toward the house. This system recomputes the target
//! contribution for every enemy each tick and emits registration or
//! adjustment commands only when the stored value must change, so a quiet
//! field produces no command traffic at all.

use hush_defence_core::{
    Command, EnemySnapshot, EnemyView, Event, Viewport, BOARD_END_X,
    ENEMY_MAX_SOUND_CONTRIBUTION,
};

/// Pure system that keeps each enemy's noise contribution in step with its
/// approach progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct Noise;

impl Noise {
    /// Creates a new noise accounting system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes events and the enemy view to emit sound commands.
    pub fn handle(
        &self,
        events: &[Event],
        enemies: &EnemyView,
        viewport: Viewport,
        out: &mut Vec<Command>,
    ) {
        let ticked = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !ticked {
            return;
        }

        for enemy in enemies.iter() {
            if enemy.dying {
                continue;
            }
            if enemy.sound_contribution == 0 {
                // First live frame: announce presence with one unit.
                out.push(Command::RegisterEnemySound { enemy: enemy.id });
                continue;
            }
            let target = contribution_for(enemy, viewport);
            if target != enemy.sound_contribution {
                out.push(Command::AdjustEnemySound {
                    enemy: enemy.id,
                    contribution: target,
                });
            }
        }
    }
}

/// Maps an enemy's walked distance onto the `1..=10` contribution range.
///
/// Progress is the fraction of the spawn-to-house span already covered,
/// clamped to `0..=1`; the span divisor is floored at one world unit so a
/// degenerate viewport cannot divide by zero.
#[must_use]
pub fn contribution_for(enemy: &EnemySnapshot, viewport: Viewport) -> u32 {
    let span = (viewport.width() - BOARD_END_X).max(1.0);
    let progress = ((enemy.spawn_x - enemy.x) / span).clamp(0.0, 1.0);
    let scaled = (1.0 + progress * (ENEMY_MAX_SOUND_CONTRIBUTION - 1) as f32).round() as u32;
    scaled.clamp(1, ENEMY_MAX_SOUND_CONTRIBUTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hush_defence_core::{EnemyId, EnemyKind};
    use std::time::Duration;

    const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

    fn snapshot(id: u32, x: f32, contribution: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Tambor,
            lane: 0,
            x,
            y: 600.0,
            spawn_x: VIEWPORT.width(),
            can_move: true,
            dying: false,
            sound_contribution: contribution,
        }
    }

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(16),
        }]
    }

    fn commands(snapshots: Vec<EnemySnapshot>) -> Vec<Command> {
        let mut out = Vec::new();
        Noise::new().handle(&tick(), &EnemyView::from_snapshots(snapshots), VIEWPORT, &mut out);
        out
    }

    #[test]
    fn fresh_enemies_register_one_unit() {
        let out = commands(vec![snapshot(0, VIEWPORT.width(), 0)]);
        assert_eq!(
            out,
            vec![Command::RegisterEnemySound {
                enemy: EnemyId::new(0)
            }]
        );
    }

    #[test]
    fn contribution_spans_one_to_ten_across_the_approach() {
        let at_spawn = snapshot(0, VIEWPORT.width(), 1);
        assert_eq!(contribution_for(&at_spawn, VIEWPORT), 1);

        let at_house = snapshot(0, BOARD_END_X, 1);
        assert_eq!(contribution_for(&at_house, VIEWPORT), ENEMY_MAX_SOUND_CONTRIBUTION);

        let halfway = snapshot(0, (VIEWPORT.width() + BOARD_END_X) / 2.0, 1);
        let mid = contribution_for(&halfway, VIEWPORT);
        assert!((5..=6).contains(&mid), "midpoint maps near the middle: {mid}");
    }

    #[test]
    fn contribution_is_monotonic_along_the_approach() {
        let mut previous = 0;
        let steps = 50;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = VIEWPORT.width() - t * (VIEWPORT.width() - BOARD_END_X);
            let value = contribution_for(&snapshot(0, x, 1), VIEWPORT);
            assert!(value >= previous, "contribution dipped at step {step}");
            previous = value;
        }
        assert_eq!(previous, ENEMY_MAX_SOUND_CONTRIBUTION);
    }

    #[test]
    fn positions_behind_the_spawn_clamp_to_one_unit() {
        let retreated = snapshot(0, VIEWPORT.width() + 400.0, 1);
        assert_eq!(contribution_for(&retreated, VIEWPORT), 1);
    }

    #[test]
    fn adjustments_fire_only_on_change() {
        // Stored contribution already matches the position: silence.
        let x = BOARD_END_X;
        let settled = snapshot(0, x, ENEMY_MAX_SOUND_CONTRIBUTION);
        assert!(commands(vec![settled]).is_empty());

        // Stored value stale: one adjustment with the recomputed target.
        let stale = snapshot(1, x, 4);
        assert_eq!(
            commands(vec![stale]),
            vec![Command::AdjustEnemySound {
                enemy: EnemyId::new(1),
                contribution: ENEMY_MAX_SOUND_CONTRIBUTION,
            }]
        );
    }

    #[test]
    fn dying_enemies_are_silent() {
        let mut corpse = snapshot(0, 600.0, 5);
        corpse.dying = true;
        assert!(commands(vec![corpse]).is_empty());
    }
}
