#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Board geometry engine for Hush Defence.
//!
//! Maps the checkerboard of lanes between grid addresses and world
//! coordinates, in either a flat axis-aligned layout or a trapezoidal
//! perspective projection where far rows shrink and compress toward a
//! vanishing point. Everything here is a pure function of the current
//! viewport plus an immutable [`BoardConfig`]; the only mutable state a
//! [`Board`] carries is the hover-highlight cell.

use hush_defence_core::{CellCoord, Viewport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inter-cell gap painted between flat-mode checkerboard cells.
const FLAT_CELL_GAP: f32 = 2.0;

/// Configuration of the board grid and its optional perspective projection.
///
/// Perspective is active iff both `vanishing_point_y_offset` and
/// `perspective_shrink` are present and positive; otherwise the board is an
/// axis-aligned rectangle. Geometry functions assume a configuration that
/// passed [`BoardConfig::validate`]; they perform no runtime checks of their
/// own so the per-frame path stays branch-free.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of columns (5 columns = 5 lanes of approach).
    pub cols: u32,
    /// Number of rows.
    pub rows: u32,
    /// Uniform margin in world units, used for any side without an override.
    pub margin: f32,
    /// Top margin override.
    pub margin_top: Option<f32>,
    /// Left margin override. Aligns the board with the back wall.
    pub margin_left: Option<f32>,
    /// Right margin override. Aligns the board with the back wall.
    pub margin_right: Option<f32>,
    /// Bottom margin override.
    pub margin_bottom: Option<f32>,
    /// World units above `min_y` where the vanishing point sits.
    pub vanishing_point_y_offset: Option<f32>,
    /// Factor in `0..1`: how much the far row narrows relative to the near
    /// row (0.5 = the top row is half the bottom row's width).
    pub perspective_shrink: Option<f32>,
    /// Vertical compression exponent base: values above 1 squeeze rows
    /// closer together near the vanishing point. 1 is linear.
    pub perspective_y_compression: Option<f32>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::for_level(GameLevel::Three)
    }
}

impl BoardConfig {
    /// Board preset for the provided campaign level.
    #[must_use]
    pub const fn for_level(level: GameLevel) -> Self {
        let base = Self {
            cols: 5,
            rows: 4,
            margin: 20.0,
            margin_top: Some(560.0),
            margin_left: Some(60.0),
            margin_right: Some(370.0),
            margin_bottom: Some(0.0),
            vanishing_point_y_offset: None,
            perspective_shrink: None,
            perspective_y_compression: None,
        };
        match level {
            GameLevel::One => base,
            GameLevel::Two => Self {
                vanishing_point_y_offset: Some(40.0),
                perspective_shrink: Some(0.3),
                perspective_y_compression: Some(1.2),
                ..base
            },
            GameLevel::Three => Self {
                vanishing_point_y_offset: Some(80.0),
                perspective_shrink: Some(0.5),
                perspective_y_compression: Some(1.5),
                ..base
            },
        }
    }

    /// Reports whether the perspective projection is active.
    #[must_use]
    pub fn has_perspective(&self) -> bool {
        let offset = self.vanishing_point_y_offset.unwrap_or(0.0);
        let shrink = self.perspective_shrink.unwrap_or(0.0);
        offset > 0.0 && shrink > 0.0
    }

    /// Checks the construction-time preconditions the geometry relies on.
    ///
    /// Callers validate once before building a [`Board`]; the hot path never
    /// re-checks.
    pub fn validate(&self, viewport: Viewport) -> Result<(), BoardConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(BoardConfigError::EmptyGrid {
                cols: self.cols,
                rows: self.rows,
            });
        }

        let usable_width = viewport.width()
            - self.margin_left.unwrap_or(self.margin)
            - self.margin_right.unwrap_or(self.margin);
        if usable_width <= 0.0 {
            return Err(BoardConfigError::NoUsableWidth { usable_width });
        }

        let usable_height = viewport.height()
            - self.margin_top.unwrap_or(self.margin)
            - self.margin_bottom.unwrap_or(self.margin);
        if usable_height <= 0.0 {
            return Err(BoardConfigError::NoUsableHeight { usable_height });
        }

        if let Some(shrink) = self.perspective_shrink {
            if !(0.0..1.0).contains(&shrink) {
                return Err(BoardConfigError::ShrinkOutOfRange { shrink });
            }
        }
        if let Some(compression) = self.perspective_y_compression {
            if compression <= 0.0 {
                return Err(BoardConfigError::NonPositiveCompression { compression });
            }
        }

        Ok(())
    }
}

/// Campaign levels with distinct board presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameLevel {
    /// Flat introductory board.
    One,
    /// Mild perspective.
    Two,
    /// Full trapezoidal perspective.
    Three,
}

/// Reasons a board configuration fails its construction-time check.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum BoardConfigError {
    /// The grid has no cells.
    #[error("board grid is empty ({cols} cols x {rows} rows)")]
    EmptyGrid {
        /// Configured column count.
        cols: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The horizontal margins consume the whole viewport.
    #[error("horizontal margins leave no usable width ({usable_width})")]
    NoUsableWidth {
        /// Width remaining after margins, non-positive.
        usable_width: f32,
    },
    /// The vertical margins consume the whole viewport.
    #[error("vertical margins leave no usable height ({usable_height})")]
    NoUsableHeight {
        /// Height remaining after margins, non-positive.
        usable_height: f32,
    },
    /// The width-shrink factor must stay within `0..1`.
    #[error("perspective shrink {shrink} outside 0..1")]
    ShrinkOutOfRange {
        /// Configured shrink factor.
        shrink: f32,
    },
    /// The vertical-compression exponent base must be positive.
    #[error("perspective y-compression {compression} must be positive")]
    NonPositiveCompression {
        /// Configured compression base.
        compression: f32,
    },
}

/// Point in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPoint {
    /// Horizontal world coordinate.
    pub x: f32,
    /// Vertical world coordinate.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a point from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Four-vertex cell outline ordered bottom-left, bottom-right, top-right,
/// top-left in screen space.
pub type Quad = [WorldPoint; 4];

/// Axis-aligned board extent plus the derived flat cell size.
///
/// Recomputed from the viewport on every query; never cached across frames
/// because the surface may resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardBounds {
    /// Left edge of the board area.
    pub min_x: f32,
    /// Right edge of the board area.
    pub max_x: f32,
    /// Top edge of the board area.
    pub min_y: f32,
    /// Bottom edge of the board area.
    pub max_y: f32,
    /// Width of one flat-mode cell.
    pub cell_width: f32,
    /// Height of one flat-mode cell.
    pub cell_height: f32,
}

/// Axis-aligned rectangle in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldRect {
    /// Left edge.
    pub min_x: f32,
    /// Right edge.
    pub max_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Bottom edge.
    pub max_y: f32,
}

impl WorldRect {
    /// Reports whether the rectangle covers the provided point.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Integer point used for rounded board outlines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridPoint {
    /// Rounded horizontal coordinate.
    pub x: i32,
    /// Rounded vertical coordinate.
    pub y: i32,
}

/// Rounded corner points of the drawn board, trapezoidal under perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardCorners {
    /// Upper-left corner.
    pub top_left: GridPoint,
    /// Upper-right corner.
    pub top_right: GridPoint,
    /// Lower-right corner.
    pub bottom_right: GridPoint,
    /// Lower-left corner.
    pub bottom_left: GridPoint,
}

/// Rounded bounding box of every drawn cell quad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometricBounds {
    /// Left edge.
    pub min_x: i32,
    /// Right edge.
    pub max_x: i32,
    /// Top edge.
    pub min_y: i32,
    /// Bottom edge.
    pub max_y: i32,
}

/// Corner points and geometric bounding box of the drawn board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardPositions {
    /// Trapezoid (or rectangle) corner points.
    pub corners: BoardCorners,
    /// Bounding box over every cell quad.
    pub bounds: GeometricBounds,
}

/// Fill instruction for a single checkerboard cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellFill {
    /// Cell this fill covers.
    pub cell: CellCoord,
    /// Outline to fill.
    pub quad: Quad,
    /// RGB color packed as `0xRRGGBB`.
    pub color: u32,
}

/// Renderer-facing description of the checkerboard.
///
/// With `alpha` at zero the fill list is empty (the board is an invisible
/// overlay) while hover resolution keeps working on the owning [`Board`].
#[derive(Clone, Debug, PartialEq)]
pub struct PaintPlan {
    /// Per-cell fill instructions, row-major.
    pub fills: Vec<CellFill>,
    /// Opacity shared by every fill.
    pub alpha: f32,
}

/// Derived projection parameters shared by the perspective helpers.
#[derive(Clone, Copy, Debug)]
struct PerspectiveParams {
    vp_x: f32,
    vp_y: f32,
    base_width: f32,
    max_y: f32,
}

/// Board geometry with a hover-highlight cell as its only mutable state.
#[derive(Clone, Debug)]
pub struct Board {
    config: BoardConfig,
    hover: Option<CellCoord>,
}

impl Board {
    /// Creates a board over the provided configuration.
    #[must_use]
    pub const fn new(config: BoardConfig) -> Self {
        Self {
            config,
            hover: None,
        }
    }

    /// Read-only access to the board configuration.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.config.cols
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.config.rows
    }

    /// Board area in world coordinates, derived from the current viewport.
    #[must_use]
    pub fn bounds(&self, viewport: Viewport) -> BoardBounds {
        let min_x = self.config.margin_left.unwrap_or(self.config.margin);
        let max_x = viewport.width() - self.config.margin_right.unwrap_or(self.config.margin);
        let min_y = self.config.margin_top.unwrap_or(self.config.margin);
        let max_y = viewport.height() - self.config.margin_bottom.unwrap_or(self.config.margin);
        BoardBounds {
            min_x,
            max_x,
            min_y,
            max_y,
            cell_width: (max_x - min_x) / self.config.cols as f32,
            cell_height: (max_y - min_y) / self.config.rows as f32,
        }
    }

    fn perspective_params(&self, viewport: Viewport) -> PerspectiveParams {
        let bounds = self.bounds(viewport);
        PerspectiveParams {
            vp_x: (bounds.min_x + bounds.max_x) / 2.0,
            vp_y: bounds.min_y - self.config.vanishing_point_y_offset.unwrap_or(0.0),
            base_width: bounds.max_x - bounds.min_x,
            max_y: bounds.max_y,
        }
    }

    /// Four corners of the cell's quad, ordered bottom-left, bottom-right,
    /// top-right, top-left.
    ///
    /// Under perspective, row 0 is farthest from the viewer. The bottom edge
    /// of row `r` sits at depth `rows - 1 - r`, its top edge at `rows - r`;
    /// depth maps to screen Y through the compression exponent and to edge
    /// width through the shrink factor, with columns slicing each row's
    /// width evenly about the board's horizontal midpoint.
    #[must_use]
    pub fn cell_quad(&self, viewport: Viewport, cell: CellCoord) -> Quad {
        if !self.config.has_perspective() {
            let bounds = self.bounds(viewport);
            let left = bounds.min_x + cell.column() as f32 * bounds.cell_width;
            let right = bounds.min_x + (cell.column() + 1) as f32 * bounds.cell_width;
            let top = bounds.min_y + cell.row() as f32 * bounds.cell_height;
            let bottom = bounds.min_y + (cell.row() + 1) as f32 * bounds.cell_height;
            return [
                WorldPoint::new(left, bottom),
                WorldPoint::new(right, bottom),
                WorldPoint::new(right, top),
                WorldPoint::new(left, top),
            ];
        }

        let params = self.perspective_params(viewport);
        let shrink = self.config.perspective_shrink.unwrap_or(0.0);
        let compression = self.config.perspective_y_compression.unwrap_or(1.0);
        let rows = self.config.rows as f32;
        let cols = self.config.cols as f32;
        let depth_bottom = rows - 1.0 - cell.row() as f32;
        let depth_top = rows - cell.row() as f32;

        let y_at_depth = |depth: f32| {
            let t = depth / rows;
            params.max_y - (params.max_y - params.vp_y) * t.powf(1.0 / compression)
        };
        let width_at_depth = |depth: f32| params.base_width * (1.0 - shrink * (depth / rows));

        let y_bottom = y_at_depth(depth_bottom);
        let y_top = y_at_depth(depth_top);
        let w_bottom = width_at_depth(depth_bottom);
        let w_top = width_at_depth(depth_top);

        let column = cell.column() as f32;
        let left_bottom = params.vp_x - w_bottom / 2.0 + column * (w_bottom / cols);
        let right_bottom = params.vp_x - w_bottom / 2.0 + (column + 1.0) * (w_bottom / cols);
        let left_top = params.vp_x - w_top / 2.0 + column * (w_top / cols);
        let right_top = params.vp_x - w_top / 2.0 + (column + 1.0) * (w_top / cols);

        [
            WorldPoint::new(left_bottom, y_bottom),
            WorldPoint::new(right_bottom, y_bottom),
            WorldPoint::new(right_top, y_top),
            WorldPoint::new(left_top, y_top),
        ]
    }

    /// Converts a world position to the cell that contains it.
    ///
    /// Flat boards floor-divide and clamp the far edge against
    /// floating-point overflow. Perspective boards scan rows from nearest to
    /// farthest so visually-front cells claim ambiguous points first.
    /// Returns `None` for positions outside every cell; that is a normal
    /// outcome, not an error.
    #[must_use]
    pub fn world_to_cell(&self, viewport: Viewport, x: f32, y: f32) -> Option<CellCoord> {
        let bounds = self.bounds(viewport);
        if !self.config.has_perspective() {
            if x < bounds.min_x || x > bounds.max_x || y < bounds.min_y || y > bounds.max_y {
                return None;
            }
            let col = ((x - bounds.min_x) / bounds.cell_width) as u32;
            let row = ((y - bounds.min_y) / bounds.cell_height) as u32;
            return Some(CellCoord::new(
                col.min(self.config.cols - 1),
                row.min(self.config.rows - 1),
            ));
        }

        for row in (0..self.config.rows).rev() {
            for col in 0..self.config.cols {
                let quad = self.cell_quad(viewport, CellCoord::new(col, row));
                if point_in_quad(x, y, &quad) {
                    return Some(CellCoord::new(col, row));
                }
            }
        }
        None
    }

    /// Converts a world position to the nearest cell. Always succeeds.
    ///
    /// Off-board flat positions round the continuous cell index and clamp
    /// into range. Off-board perspective positions fall back to an
    /// exhaustive nearest-centroid scan; boards stay small (tens of cells)
    /// so the O(cols x rows) scan is acceptable.
    #[must_use]
    pub fn world_to_nearest_cell(&self, viewport: Viewport, x: f32, y: f32) -> CellCoord {
        if let Some(cell) = self.world_to_cell(viewport, x, y) {
            return cell;
        }

        if !self.config.has_perspective() {
            let bounds = self.bounds(viewport);
            let col_continuous = (x - bounds.min_x) / bounds.cell_width;
            let row_continuous = (y - bounds.min_y) / bounds.cell_height;
            let col = col_continuous
                .round()
                .clamp(0.0, (self.config.cols - 1) as f32);
            let row = row_continuous
                .round()
                .clamp(0.0, (self.config.rows - 1) as f32);
            return CellCoord::new(col as u32, row as u32);
        }

        let mut nearest = CellCoord::new(0, 0);
        let mut min_dist = f32::INFINITY;
        for row in 0..self.config.rows {
            for col in 0..self.config.cols {
                let center = self.cell_to_world(viewport, CellCoord::new(col, row));
                let dist = (x - center.x).powi(2) + (y - center.y).powi(2);
                if dist < min_dist {
                    min_dist = dist;
                    nearest = CellCoord::new(col, row);
                }
            }
        }
        nearest
    }

    /// Center of the cell in world coordinates.
    ///
    /// Perspective centers average the four quad corners rather than
    /// computing the true projective centroid. Click-target alignment is
    /// tuned to this approximation; keep it.
    #[must_use]
    pub fn cell_to_world(&self, viewport: Viewport, cell: CellCoord) -> WorldPoint {
        if !self.config.has_perspective() {
            let bounds = self.bounds(viewport);
            return WorldPoint::new(
                bounds.min_x + (cell.column() as f32 + 0.5) * bounds.cell_width,
                bounds.min_y + (cell.row() as f32 + 0.5) * bounds.cell_height,
            );
        }
        let quad = self.cell_quad(viewport, cell);
        WorldPoint::new(
            (quad[0].x + quad[1].x + quad[2].x + quad[3].x) / 4.0,
            (quad[0].y + quad[1].y + quad[2].y + quad[3].y) / 4.0,
        )
    }

    /// Notional cell rectangle extended past the board edge.
    ///
    /// Uses the flat bounds arithmetic in both board modes, so an attack
    /// aimed one column past the right edge still covers enemies standing
    /// there. The cell address may lie outside the configured grid.
    #[must_use]
    pub fn extrapolated_cell_rect(&self, viewport: Viewport, cell: CellCoord) -> WorldRect {
        let bounds = self.bounds(viewport);
        let min_x = bounds.min_x + cell.column() as f32 * bounds.cell_width;
        let min_y = bounds.min_y + cell.row() as f32 * bounds.cell_height;
        WorldRect {
            min_x,
            max_x: min_x + bounds.cell_width,
            min_y,
            max_y: min_y + bounds.cell_height,
        }
    }

    /// Rounded corner points and geometric bounding box of the drawn board.
    #[must_use]
    pub fn board_positions(&self, viewport: Viewport) -> BoardPositions {
        let rect = self.bounds(viewport);
        if !self.config.has_perspective() {
            let corners = BoardCorners {
                top_left: round_point(WorldPoint::new(rect.min_x, rect.min_y)),
                top_right: round_point(WorldPoint::new(rect.max_x, rect.min_y)),
                bottom_right: round_point(WorldPoint::new(rect.max_x, rect.max_y)),
                bottom_left: round_point(WorldPoint::new(rect.min_x, rect.max_y)),
            };
            return BoardPositions {
                corners,
                bounds: GeometricBounds {
                    min_x: rect.min_x.round() as i32,
                    max_x: rect.max_x.round() as i32,
                    min_y: rect.min_y.round() as i32,
                    max_y: rect.max_y.round() as i32,
                },
            };
        }

        let last_col = self.config.cols - 1;
        let last_row = self.config.rows - 1;
        let top_left_quad = self.cell_quad(viewport, CellCoord::new(0, 0));
        let top_right_quad = self.cell_quad(viewport, CellCoord::new(last_col, 0));
        let bottom_right_quad = self.cell_quad(viewport, CellCoord::new(last_col, last_row));
        let bottom_left_quad = self.cell_quad(viewport, CellCoord::new(0, last_row));

        let corners = BoardCorners {
            top_left: round_point(top_left_quad[3]),
            top_right: round_point(top_right_quad[2]),
            bottom_right: round_point(bottom_right_quad[1]),
            bottom_left: round_point(bottom_left_quad[0]),
        };

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for row in 0..self.config.rows {
            for col in 0..self.config.cols {
                for point in self.cell_quad(viewport, CellCoord::new(col, row)) {
                    min_x = min_x.min(point.x);
                    max_x = max_x.max(point.x);
                    min_y = min_y.min(point.y);
                    max_y = max_y.max(point.y);
                }
            }
        }

        BoardPositions {
            corners,
            bounds: GeometricBounds {
                min_x: min_x.round() as i32,
                max_x: max_x.round() as i32,
                min_y: min_y.round() as i32,
                max_y: max_y.round() as i32,
            },
        }
    }

    /// Checkerboard fill plan alternating two colors by `(col + row)` parity.
    ///
    /// Flat cells inset a small gap; perspective cells fill their quads
    /// edge-to-edge. A zero alpha yields an empty plan so the board acts as
    /// an invisible overlay while hover resolution keeps working.
    #[must_use]
    pub fn paint_plan(
        &self,
        viewport: Viewport,
        color_light: u32,
        color_dark: u32,
        alpha: f32,
    ) -> PaintPlan {
        let mut fills = Vec::new();
        if alpha <= 0.0 {
            return PaintPlan { fills, alpha };
        }

        for row in 0..self.config.rows {
            for col in 0..self.config.cols {
                let cell = CellCoord::new(col, row);
                let color = if (col + row) % 2 == 0 {
                    color_light
                } else {
                    color_dark
                };
                let quad = if self.config.has_perspective() {
                    self.cell_quad(viewport, cell)
                } else {
                    inset_flat_quad(self.cell_quad(viewport, cell), FLAT_CELL_GAP)
                };
                fills.push(CellFill { cell, quad, color });
            }
        }
        PaintPlan { fills, alpha }
    }

    /// Moves the hover highlight to the cell nearest the pointer.
    ///
    /// Resolves through [`Board::world_to_nearest_cell`] so the highlight
    /// never disappears while the pointer hugs the board edge.
    pub fn update_hover(&mut self, viewport: Viewport, x: f32, y: f32) -> CellCoord {
        let cell = self.world_to_nearest_cell(viewport, x, y);
        self.hover = Some(cell);
        cell
    }

    /// Removes the hover highlight, e.g. when the pointer leaves the canvas.
    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    /// Cell currently highlighted, if any.
    #[must_use]
    pub const fn hover(&self) -> Option<CellCoord> {
        self.hover
    }

    /// Outline of the highlighted cell for the renderer to stroke.
    #[must_use]
    pub fn hover_outline(&self, viewport: Viewport) -> Option<Quad> {
        self.hover.map(|cell| self.cell_quad(viewport, cell))
    }
}

/// Ray-casting point-in-polygon test over a four-vertex quad.
///
/// Horizontal edges have zero height and contribute no crossing.
#[must_use]
pub fn point_in_quad(x: f32, y: f32, quad: &Quad) -> bool {
    let mut inside = false;
    let mut j = quad.len() - 1;
    for i in 0..quad.len() {
        let (xi, yi) = (quad[i].x, quad[i].y);
        let (xj, yj) = (quad[j].x, quad[j].y);
        if yj != yi {
            let crosses = (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi;
            if crosses {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn round_point(point: WorldPoint) -> GridPoint {
    GridPoint {
        x: point.x.round() as i32,
        y: point.y.round() as i32,
    }
}

fn inset_flat_quad(quad: Quad, gap: f32) -> Quad {
    let half = gap / 2.0;
    [
        WorldPoint::new(quad[0].x + half, quad[0].y - half),
        WorldPoint::new(quad[1].x - half, quad[1].y - half),
        WorldPoint::new(quad[2].x - half, quad[2].y + half),
        WorldPoint::new(quad[3].x + half, quad[3].y + half),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

    fn flat_config() -> BoardConfig {
        BoardConfig {
            cols: 5,
            rows: 4,
            margin: 20.0,
            margin_top: None,
            margin_left: None,
            margin_right: None,
            margin_bottom: None,
            vanishing_point_y_offset: None,
            perspective_shrink: None,
            perspective_y_compression: None,
        }
    }

    fn perspective_config() -> BoardConfig {
        BoardConfig {
            vanishing_point_y_offset: Some(80.0),
            perspective_shrink: Some(0.5),
            perspective_y_compression: Some(1.5),
            ..flat_config()
        }
    }

    #[test]
    fn perspective_requires_both_parameters() {
        assert!(!flat_config().has_perspective());
        assert!(perspective_config().has_perspective());

        let mut only_offset = flat_config();
        only_offset.vanishing_point_y_offset = Some(80.0);
        assert!(!only_offset.has_perspective());

        let mut only_shrink = flat_config();
        only_shrink.perspective_shrink = Some(0.5);
        assert!(!only_shrink.has_perspective());
    }

    #[test]
    fn bounds_follow_viewport_resize() {
        let board = Board::new(flat_config());
        let small = board.bounds(Viewport::new(640.0, 360.0));
        let large = board.bounds(Viewport::new(1280.0, 720.0));
        assert!(large.cell_width > small.cell_width);
        assert!(large.cell_height > small.cell_height);
        assert_eq!(small.min_x, large.min_x);
    }

    #[test]
    fn flat_quad_is_axis_aligned() {
        let board = Board::new(flat_config());
        let quad = board.cell_quad(VIEWPORT, CellCoord::new(0, 0));
        assert_eq!(quad[0].x, quad[3].x);
        assert_eq!(quad[1].x, quad[2].x);
        assert_eq!(quad[0].y, quad[1].y);
        assert_eq!(quad[2].y, quad[3].y);
    }

    #[test]
    fn far_rows_narrow_under_perspective() {
        let board = Board::new(perspective_config());
        let near = board.cell_quad(VIEWPORT, CellCoord::new(0, 3));
        let far = board.cell_quad(VIEWPORT, CellCoord::new(0, 0));
        let near_width = near[1].x - near[0].x;
        let far_width = far[1].x - far[0].x;
        assert!(far_width < near_width);
    }

    #[test]
    fn rows_compress_toward_vanishing_point() {
        let board = Board::new(perspective_config());
        let near = board.cell_quad(VIEWPORT, CellCoord::new(0, 3));
        let far = board.cell_quad(VIEWPORT, CellCoord::new(0, 0));
        let near_height = near[0].y - near[3].y;
        let far_height = far[0].y - far[3].y;
        assert!(far_height < near_height);
    }

    #[test]
    fn point_in_quad_skips_horizontal_edges() {
        let quad = [
            WorldPoint::new(0.0, 10.0),
            WorldPoint::new(10.0, 10.0),
            WorldPoint::new(10.0, 0.0),
            WorldPoint::new(0.0, 0.0),
        ];
        assert!(point_in_quad(5.0, 5.0, &quad));
        assert!(!point_in_quad(15.0, 5.0, &quad));
        assert!(!point_in_quad(-1.0, 5.0, &quad));
    }

    #[test]
    fn flat_world_to_cell_round_trips_every_cell() {
        let board = Board::new(flat_config());
        for row in 0..board.rows() {
            for col in 0..board.cols() {
                let cell = CellCoord::new(col, row);
                let center = board.cell_to_world(VIEWPORT, cell);
                assert_eq!(
                    board.world_to_cell(VIEWPORT, center.x, center.y),
                    Some(cell),
                    "round trip failed for {cell:?}"
                );
            }
        }
    }

    #[test]
    fn perspective_centroid_lands_in_its_own_cell() {
        let board = Board::new(perspective_config());
        for row in 0..board.rows() {
            for col in 0..board.cols() {
                let cell = CellCoord::new(col, row);
                let center = board.cell_to_world(VIEWPORT, cell);
                assert_eq!(
                    board.world_to_cell(VIEWPORT, center.x, center.y),
                    Some(cell),
                    "centroid containment failed for {cell:?}"
                );
            }
        }
    }

    #[test]
    fn flat_world_to_cell_rejects_outside_points() {
        let board = Board::new(flat_config());
        assert_eq!(board.world_to_cell(VIEWPORT, 1.0, 1.0), None);
        assert_eq!(board.world_to_cell(VIEWPORT, 5000.0, 300.0), None);
    }

    #[test]
    fn flat_far_boundary_clamps_into_last_cell() {
        let board = Board::new(flat_config());
        let bounds = board.bounds(VIEWPORT);
        let cell = board.world_to_cell(VIEWPORT, bounds.max_x, bounds.max_y);
        assert_eq!(cell, Some(CellCoord::new(board.cols() - 1, board.rows() - 1)));
    }

    #[test]
    fn nearest_cell_never_leaves_the_grid() {
        for config in [flat_config(), perspective_config()] {
            let board = Board::new(config);
            let probes = [
                (-500.0, -500.0),
                (5000.0, -200.0),
                (-300.0, 5000.0),
                (9000.0, 9000.0),
                (0.0, 0.0),
            ];
            for (x, y) in probes {
                let cell = board.world_to_nearest_cell(VIEWPORT, x, y);
                assert!(cell.column() < board.cols());
                assert!(cell.row() < board.rows());
            }
        }
    }

    #[test]
    fn nearest_cell_prefers_exact_containment() {
        let board = Board::new(flat_config());
        let center = board.cell_to_world(VIEWPORT, CellCoord::new(2, 1));
        assert_eq!(
            board.world_to_nearest_cell(VIEWPORT, center.x, center.y),
            CellCoord::new(2, 1)
        );
    }

    #[test]
    fn extrapolated_rect_extends_one_cell_past_the_edge() {
        let board = Board::new(flat_config());
        let bounds = board.bounds(VIEWPORT);
        let rect = board.extrapolated_cell_rect(VIEWPORT, CellCoord::new(board.cols(), 2));
        assert!((rect.min_x - bounds.max_x).abs() < 1e-3);
        assert!((rect.max_x - (bounds.max_x + bounds.cell_width)).abs() < 1e-3);
        assert!(rect.contains(bounds.max_x + bounds.cell_width / 2.0, rect.min_y + 1.0));
    }

    #[test]
    fn paint_plan_alternates_colors_and_respects_alpha() {
        let board = Board::new(flat_config());
        let plan = board.paint_plan(VIEWPORT, 0xc4d4a0, 0x8bac0f, 0.5);
        assert_eq!(plan.fills.len(), (board.cols() * board.rows()) as usize);
        for fill in &plan.fills {
            let expected = if (fill.cell.column() + fill.cell.row()) % 2 == 0 {
                0xc4d4a0
            } else {
                0x8bac0f
            };
            assert_eq!(fill.color, expected);
        }

        let invisible = board.paint_plan(VIEWPORT, 0xc4d4a0, 0x8bac0f, 0.0);
        assert!(invisible.fills.is_empty());
    }

    #[test]
    fn hover_tracks_nearest_cell_and_clears() {
        let mut board = Board::new(perspective_config());
        assert!(board.hover().is_none());

        let cell = board.update_hover(VIEWPORT, -1000.0, -1000.0);
        assert!(cell.column() < board.cols());
        assert_eq!(board.hover(), Some(cell));
        assert!(board.hover_outline(VIEWPORT).is_some());

        board.clear_hover();
        assert!(board.hover().is_none());
        assert!(board.hover_outline(VIEWPORT).is_none());
    }

    #[test]
    fn validate_accepts_every_level_preset() {
        for level in [GameLevel::One, GameLevel::Two, GameLevel::Three] {
            let config = BoardConfig::for_level(level);
            assert!(config.validate(Viewport::new(1920.0, 1080.0)).is_ok());
        }
    }

    #[test]
    fn validate_rejects_degenerate_configs() {
        let viewport = Viewport::new(1280.0, 720.0);

        let mut empty = flat_config();
        empty.cols = 0;
        assert!(matches!(
            empty.validate(viewport),
            Err(BoardConfigError::EmptyGrid { .. })
        ));

        let mut wide_margins = flat_config();
        wide_margins.margin_left = Some(700.0);
        wide_margins.margin_right = Some(700.0);
        assert!(matches!(
            wide_margins.validate(viewport),
            Err(BoardConfigError::NoUsableWidth { .. })
        ));

        let mut tall_margins = flat_config();
        tall_margins.margin_top = Some(800.0);
        assert!(matches!(
            tall_margins.validate(viewport),
            Err(BoardConfigError::NoUsableHeight { .. })
        ));

        let mut bad_shrink = perspective_config();
        bad_shrink.perspective_shrink = Some(1.0);
        assert!(matches!(
            bad_shrink.validate(viewport),
            Err(BoardConfigError::ShrinkOutOfRange { .. })
        ));

        let mut bad_compression = perspective_config();
        bad_compression.perspective_y_compression = Some(0.0);
        assert!(matches!(
            bad_compression.validate(viewport),
            Err(BoardConfigError::NonPositiveCompression { .. })
        ));
    }

    #[test]
    fn board_positions_flat_matches_bounds() {
        let board = Board::new(flat_config());
        let bounds = board.bounds(VIEWPORT);
        let positions = board.board_positions(VIEWPORT);
        assert_eq!(positions.corners.top_left.x, bounds.min_x.round() as i32);
        assert_eq!(positions.bounds.max_y, bounds.max_y.round() as i32);
    }

    #[test]
    fn board_positions_perspective_is_a_trapezoid() {
        let board = Board::new(perspective_config());
        let positions = board.board_positions(VIEWPORT);
        let top_width = positions.corners.top_right.x - positions.corners.top_left.x;
        let bottom_width = positions.corners.bottom_right.x - positions.corners.bottom_left.x;
        assert!(top_width < bottom_width);
        assert!(positions.bounds.min_y <= positions.corners.top_left.y);
    }

    #[test]
    fn config_round_trips_through_bincode() {
        let config = BoardConfig::for_level(GameLevel::Three);
        let bytes = bincode::serialize(&config).expect("serialize");
        let restored: BoardConfig = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, config);
    }
}
