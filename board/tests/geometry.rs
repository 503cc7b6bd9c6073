use hush_defence_board::{point_in_quad, Board, BoardConfig, GameLevel};
use hush_defence_core::{CellCoord, Viewport};

const VIEWPORTS: [Viewport; 3] = [
    Viewport::new(1280.0, 720.0),
    Viewport::new(1920.0, 1080.0),
    Viewport::new(1024.0, 768.0),
];

fn boards() -> Vec<Board> {
    [GameLevel::One, GameLevel::Two, GameLevel::Three]
        .into_iter()
        .map(|level| Board::new(BoardConfig::for_level(level)))
        .collect()
}

#[test]
fn every_preset_validates_on_every_viewport() {
    for level in [GameLevel::One, GameLevel::Two, GameLevel::Three] {
        for viewport in VIEWPORTS {
            assert!(
                BoardConfig::for_level(level).validate(viewport).is_ok(),
                "{level:?} rejected {viewport:?}"
            );
        }
    }
}

#[test]
fn cell_centers_resolve_back_to_their_own_cell() {
    for board in boards() {
        for viewport in VIEWPORTS {
            for row in 0..board.rows() {
                for col in 0..board.cols() {
                    let cell = CellCoord::new(col, row);
                    let center = board.cell_to_world(viewport, cell);
                    assert_eq!(
                        board.world_to_cell(viewport, center.x, center.y),
                        Some(cell),
                        "round trip failed for {cell:?} on {viewport:?}"
                    );
                    assert_eq!(
                        board.world_to_nearest_cell(viewport, center.x, center.y),
                        cell
                    );
                }
            }
        }
    }
}

#[test]
fn cell_centers_sit_inside_their_quads() {
    for board in boards() {
        for viewport in VIEWPORTS {
            for row in 0..board.rows() {
                for col in 0..board.cols() {
                    let cell = CellCoord::new(col, row);
                    let quad = board.cell_quad(viewport, cell);
                    let center = board.cell_to_world(viewport, cell);
                    assert!(
                        point_in_quad(center.x, center.y, &quad),
                        "center escaped its quad for {cell:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn far_corners_resolve_to_corner_cells() {
    for board in boards() {
        for viewport in VIEWPORTS {
            assert_eq!(
                board.world_to_nearest_cell(viewport, -10_000.0, -10_000.0),
                CellCoord::new(0, 0)
            );
            assert_eq!(
                board.world_to_nearest_cell(viewport, 10_000.0, 10_000.0),
                CellCoord::new(board.cols() - 1, board.rows() - 1)
            );
        }
    }
}

#[test]
fn extrapolated_cells_tile_contiguously_past_the_edge() {
    for board in boards() {
        let viewport = VIEWPORTS[0];
        let bounds = board.bounds(viewport);
        for row in 0..board.rows() {
            let last_inside = board.extrapolated_cell_rect(viewport, CellCoord::new(board.cols() - 1, row));
            let first_outside = board.extrapolated_cell_rect(viewport, CellCoord::new(board.cols(), row));
            assert!((last_inside.max_x - first_outside.min_x).abs() < 1e-3);
            assert!((first_outside.max_x - (bounds.max_x + bounds.cell_width)).abs() < 1e-3);
        }
    }
}

#[test]
fn perspective_trapezoid_narrows_away_from_the_viewer() {
    let board = Board::new(BoardConfig::for_level(GameLevel::Three));
    for viewport in VIEWPORTS {
        let positions = board.board_positions(viewport);
        let top = positions.corners.top_right.x - positions.corners.top_left.x;
        let bottom = positions.corners.bottom_right.x - positions.corners.bottom_left.x;
        assert!(top < bottom, "trapezoid failed to narrow on {viewport:?}");
    }
}

#[test]
fn paint_plans_cover_the_full_grid_when_visible() {
    for board in boards() {
        let plan = board.paint_plan(VIEWPORTS[0], 0xffffff, 0x000000, 1.0);
        assert_eq!(plan.fills.len(), (board.cols() * board.rows()) as usize);

        let hidden = board.paint_plan(VIEWPORTS[0], 0xffffff, 0x000000, 0.0);
        assert!(hidden.fills.is_empty());
    }
}
