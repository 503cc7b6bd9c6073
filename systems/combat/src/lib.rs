#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Item combat: turns an in-use item into kill commands.
//!
//! While an item's use window is open this system resolves the cells the
//! item covers from the player's position, collects every live enemy whose
//! center stands in one of them, and emits a single `KillEnemies` batch.
//! The broom's forward cell may address one column past the right board
//! edge; the board's extrapolated rectangles keep that cell meaningful so
//! enemies still walking in from the edge are not safe from a swing.

use hush_defence_board::Board;
use hush_defence_core::{
    CellCoord, Command, EnemyView, Event, ItemKind, PlayerSnapshot, Viewport,
};

/// Pure system that resolves item strikes into kill commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Combat;

impl Combat {
    /// Creates a new combat system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes events and views to emit kill commands for the active item.
    pub fn handle(
        &self,
        events: &[Event],
        active_item: Option<ItemKind>,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        board: &Board,
        viewport: Viewport,
        out: &mut Vec<Command>,
    ) {
        let ticked = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !ticked {
            return;
        }
        let Some(item) = active_item else {
            return;
        };

        let cells = attack_cells(item, player, board, viewport);
        let hits = resolve_hits(&cells, enemies, board, viewport);
        if !hits.is_empty() {
            out.push(Command::KillEnemies { enemies: hits });
        }
    }
}

/// Cells the item strikes from the player's current position.
///
/// The broom sweeps the player's own cell plus the one toward the enemies'
/// approach, which may lie one past the right edge; the hose soaks the
/// player's lane from the player's column through the last board column.
#[must_use]
pub fn attack_cells(
    item: ItemKind,
    player: &PlayerSnapshot,
    board: &Board,
    viewport: Viewport,
) -> Vec<CellCoord> {
    let origin = board.world_to_nearest_cell(viewport, player.x, player.y);
    match item {
        ItemKind::Broom => vec![
            origin,
            CellCoord::new(origin.column() + 1, origin.row()),
        ],
        ItemKind::Hose => (origin.column()..board.cols())
            .map(|column| CellCoord::new(column, origin.row()))
            .collect(),
    }
}

// In-board cells resolve through the board's own lookup so perspective quads
// match their centers; cells past the edge fall back to the extrapolated
// rectangle.
fn resolve_hits(
    cells: &[CellCoord],
    enemies: &EnemyView,
    board: &Board,
    viewport: Viewport,
) -> Vec<hush_defence_core::EnemyId> {
    let in_board = |cell: &CellCoord| cell.column() < board.cols() && cell.row() < board.rows();
    enemies
        .iter()
        .filter(|enemy| !enemy.dying)
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
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hush_defence_board::{BoardConfig, GameLevel};
    use hush_defence_core::{EnemyId, EnemyKind, EnemySnapshot};
    use std::time::Duration;

    const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

    fn board() -> Board {
        Board::new(BoardConfig::for_level(GameLevel::One))
    }

    fn player_at(board: &Board, cell: CellCoord) -> PlayerSnapshot {
        let center = board.cell_to_world(VIEWPORT, cell);
        PlayerSnapshot {
            x: center.x,
            y: center.y,
            is_moving: false,
            equipped: None,
            shielded: true,
        }
    }

    fn enemy_at(id: u32, lane: u32, x: f32, y: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Diablo,
            lane,
            x,
            y,
            spawn_x: VIEWPORT.width(),
            can_move: true,
            dying: false,
            sound_contribution: 1,
        }
    }

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(16),
        }]
    }

    #[test]
    fn broom_covers_the_player_cell_and_the_one_ahead() {
        let board = board();
        let player = player_at(&board, CellCoord::new(1, 2));
        let cells = attack_cells(ItemKind::Broom, &player, &board, VIEWPORT);
        assert_eq!(cells, vec![CellCoord::new(1, 2), CellCoord::new(2, 2)]);
    }

    #[test]
    fn broom_in_the_last_column_reaches_past_the_edge() {
        let board = board();
        let last = board.cols() - 1;
        let player = player_at(&board, CellCoord::new(last, 0));
        let cells = attack_cells(ItemKind::Broom, &player, &board, VIEWPORT);
        assert_eq!(cells[1], CellCoord::new(board.cols(), 0));
    }

    #[test]
    fn hose_soaks_the_lane_through_the_last_column() {
        let board = board();
        let player = player_at(&board, CellCoord::new(2, 1));
        let cells = attack_cells(ItemKind::Hose, &player, &board, VIEWPORT);
        let columns: Vec<u32> = cells.iter().map(CellCoord::column).collect();
        assert_eq!(columns, vec![2, 3, 4]);
        assert!(cells.iter().all(|cell| cell.row() == 1));
    }

    #[test]
    fn strike_kills_enemies_in_covered_cells_only() {
        let board = board();
        let bounds = board.bounds(VIEWPORT);
        let player = player_at(&board, CellCoord::new(1, 2));
        let lane_y = bounds.min_y + 2.5 * bounds.cell_height;

        // In the swept cell ahead of the player.
        let in_reach = enemy_at(0, 2, bounds.min_x + 2.5 * bounds.cell_width, lane_y);
        // Same lane, two columns ahead: out of the broom's reach.
        let beyond = enemy_at(1, 2, bounds.min_x + 4.5 * bounds.cell_width, lane_y);
        // Adjacent lane.
        let other_lane = enemy_at(
            2,
            1,
            bounds.min_x + 2.5 * bounds.cell_width,
            lane_y - bounds.cell_height,
        );
        let enemies = EnemyView::from_snapshots(vec![in_reach, beyond, other_lane]);

        let mut out = Vec::new();
        Combat::new().handle(
            &tick(),
            Some(ItemKind::Broom),
            &player,
            &enemies,
            &board,
            VIEWPORT,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::KillEnemies {
                enemies: vec![EnemyId::new(0)],
            }]
        );
    }

    #[test]
    fn broom_reaches_an_enemy_one_cell_past_the_edge() {
        let board = board();
        let bounds = board.bounds(VIEWPORT);
        let last = board.cols() - 1;
        let player = player_at(&board, CellCoord::new(last, 3));
        let lane_y = bounds.min_y + 3.5 * bounds.cell_height;
        let straggler = enemy_at(0, 3, bounds.max_x + bounds.cell_width / 2.0, lane_y);
        let enemies = EnemyView::from_snapshots(vec![straggler]);

        let mut out = Vec::new();
        Combat::new().handle(
            &tick(),
            Some(ItemKind::Broom),
            &player,
            &enemies,
            &board,
            VIEWPORT,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::KillEnemies {
                enemies: vec![EnemyId::new(0)],
            }]
        );
    }

    #[test]
    fn hose_stops_at_the_board_edge() {
        let board = board();
        let bounds = board.bounds(VIEWPORT);
        let player = player_at(&board, CellCoord::new(0, 3));
        let lane_y = bounds.min_y + 3.5 * bounds.cell_height;
        let straggler = enemy_at(0, 3, bounds.max_x + bounds.cell_width / 2.0, lane_y);
        let enemies = EnemyView::from_snapshots(vec![straggler]);

        let mut out = Vec::new();
        Combat::new().handle(
            &tick(),
            Some(ItemKind::Hose),
            &player,
            &enemies,
            &board,
            VIEWPORT,
            &mut out,
        );
        assert!(out.is_empty(), "the hose covers board columns only");
    }

    #[test]
    fn strikes_land_on_perspective_lane_centers() {
        let board = Board::new(BoardConfig::for_level(GameLevel::Three));
        let player = player_at(&board, CellCoord::new(3, 3));
        let target_cell = CellCoord::new(4, 3);
        let center = board.cell_to_world(VIEWPORT, target_cell);
        let enemies = EnemyView::from_snapshots(vec![enemy_at(0, 3, center.x, center.y)]);

        let mut out = Vec::new();
        Combat::new().handle(
            &tick(),
            Some(ItemKind::Broom),
            &player,
            &enemies,
            &board,
            VIEWPORT,
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::KillEnemies {
                enemies: vec![EnemyId::new(0)],
            }]
        );
    }

    #[test]
    fn idle_items_emit_nothing() {
        let board = board();
        let player = player_at(&board, CellCoord::new(1, 1));
        let enemies = EnemyView::from_snapshots(vec![enemy_at(0, 1, player.x, player.y)]);
        let mut out = Vec::new();
        Combat::new().handle(&tick(), None, &player, &enemies, &board, VIEWPORT, &mut out);
        assert!(out.is_empty());
    }
}
