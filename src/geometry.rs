//! Integer cell geometry.
//!
//! A panel widget has a fixed pixel budget per axis.  Each axis is split into
//! equal integer *slots*, and every slot holds a visible *core* surrounded by
//! a margin.  Cores and margins are kept integral whenever possible so the
//! cells land on whole pixels at any panel height.

use serde::{Deserialize, Serialize};

/// Geometry of one cell along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGeometry {
    /// Visible size of the cell in pixels.
    pub core_size: u32,
    /// Inset on each side of the core.  Integral unless no even split was
    /// reachable, in which case it ends in `.5`.
    pub margin: f64,
}

impl CellGeometry {
    /// Full slot width: `core_size + 2 * margin`.
    pub fn slot(&self) -> u32 {
        self.core_size + (self.margin * 2.0).round() as u32
    }
}

/// Split `available_span` pixels into `cell_count` slots and size the core
/// of each slot to `occupation_percent` of it.
///
/// A `cell_count` of zero is treated as one.  The percentage is not validated:
/// the candidate core is clamped to `[0, slot]`, so out-of-range values only
/// produce empty or full cells.
pub fn compute_cell_layout(
    available_span: f64,
    cell_count: usize,
    occupation_percent: f64,
) -> CellGeometry {
    let count = cell_count.max(1) as f64;
    let slot = if available_span.is_finite() && available_span > 0.0 {
        (available_span / count).floor() as u32
    } else {
        0
    };

    let ideal = slot as f64 * occupation_percent / 100.0;
    let candidate = if ideal.is_finite() {
        ideal.round().clamp(0.0, slot as f64) as u32
    } else {
        0
    };

    let core = if (slot - candidate) % 2 == 0 {
        candidate
    } else {
        nearest_even_residual(slot, candidate, ideal).unwrap_or(candidate)
    };

    CellGeometry {
        core_size: core,
        margin: (slot - core) as f64 / 2.0,
    }
}

/// Probe the neighbours of `candidate` for one that leaves an even residual.
/// Ties go to the decrement.
fn nearest_even_residual(slot: u32, candidate: u32, ideal: f64) -> Option<u32> {
    let down = candidate.checked_sub(1);
    let up = Some(candidate + 1).filter(|c| *c <= slot);

    match (down, up) {
        (Some(d), Some(u)) => {
            if (ideal - d as f64).abs() <= (u as f64 - ideal).abs() {
                Some(d)
            } else {
                Some(u)
            }
        }
        (Some(d), None) => Some(d),
        (None, Some(u)) => Some(u),
        (None, None) => None,
    }
}

/// How the per-axis results are composed into a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    /// The row axis (panel height) drives one uniform cell size; columns
    /// reuse it and the widget grows horizontally to fit.
    #[default]
    Uniform,
    /// Width and height are divided independently.
    PerAxis,
}

/// Pixel budget handed to the widget by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Allocation {
    pub width: f64,
    pub height: f64,
}

impl Allocation {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A square allocation, the usual shape of a panel icon slot.
    pub fn square(size: f64) -> Self {
        Self::new(size, size)
    }
}

/// Geometry for both axes of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Horizontal geometry (one column).
    pub column: CellGeometry,
    /// Vertical geometry (one row).
    pub row: CellGeometry,
}

impl GridGeometry {
    /// Run the calculator once per axis and compose the results.
    pub fn compute(
        mode: GeometryMode,
        allocation: Allocation,
        rows: usize,
        columns: usize,
        occupation_percent: f64,
    ) -> Self {
        let row = compute_cell_layout(allocation.height, rows, occupation_percent);
        let column = match mode {
            GeometryMode::Uniform => row,
            GeometryMode::PerAxis => {
                compute_cell_layout(allocation.width, columns, occupation_percent)
            }
        };
        Self { column, row }
    }

    /// Top-left corner of the core of cell `(row, col)`.
    pub fn cell_origin(&self, coord: GridCoord) -> (f64, f64) {
        let x = coord.col as f64 * self.column.slot() as f64 + self.column.margin;
        let y = coord.row as f64 * self.row.slot() as f64 + self.row.margin;
        (x, y)
    }

    /// Total pixel size of a `rows × columns` grid laid out with this
    /// geometry.
    pub fn total_size(&self, rows: usize, columns: usize) -> (u32, u32) {
        (
            self.column.slot() * columns as u32,
            self.row.slot() * rows as u32,
        )
    }
}

/// Position of a cell in a row-major grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub row: usize,
    pub col: usize,
}

/// Map a workspace index to its grid coordinate.
pub fn index_to_coordinate(index: usize, columns: usize) -> GridCoord {
    let columns = columns.max(1);
    GridCoord {
        row: index / columns,
        col: index % columns,
    }
}

/// Inverse of [`index_to_coordinate`].
pub fn coordinate_to_index(coord: GridCoord, columns: usize) -> usize {
    coord.row * columns.max(1) + coord.col
}
