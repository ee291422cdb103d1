//! Cell render model.
//!
//! A [`CellGrid`] holds one [`CellVisualState`] per grid position, laid out
//! on integer pixel geometry.  It is built wholesale when the layout or the
//! geometry changes and restyled in place for everything else.
//!
//! Grid positions beyond the live workspace count are padding: they keep
//! their slot but are drawn in the *absent* style (see [`AbsentCells`]).

use crate::config::{CellShape, ThemeConfig};
use crate::geometry::{index_to_coordinate, Allocation, GeometryMode, GridGeometry};
use crate::snapshot::{WorkspaceLayout, WorkspaceSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Opacity of dimmed padding cells.
pub const ABSENT_OPACITY: f64 = 0.3;

/// How grid positions beyond the live workspace count are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentCells {
    /// Inactive fill at [`ABSENT_OPACITY`], never outlined.  Without the
    /// fill a borderless padding cell would not be visible at all.
    #[default]
    Dimmed,
    /// Not drawn at all.
    Hidden,
}

/// Resolved state of one cell.
///
/// Precedence, highest first: active+occupied, active, occupied, inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Inactive,
    Active,
    Occupied,
    ActiveOccupied,
    /// Padding beyond the live workspace count.
    Absent,
}

impl CellState {
    /// State of grid position `index` in `snapshot`.
    pub fn of(index: usize, snapshot: &WorkspaceSnapshot) -> Self {
        if !snapshot.is_present(index) {
            return CellState::Absent;
        }
        match (snapshot.is_active(index), snapshot.is_occupied(index)) {
            (true, true) => CellState::ActiveOccupied,
            (true, false) => CellState::Active,
            (false, true) => CellState::Occupied,
            (false, false) => CellState::Inactive,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, CellState::Active | CellState::ActiveOccupied)
    }

    pub fn has_occupants(self) -> bool {
        matches!(self, CellState::Occupied | CellState::ActiveOccupied)
    }

    /// Whether the occupancy outline is drawn in this state.
    pub fn shows_outline(self, theme: &ThemeConfig) -> bool {
        match self {
            CellState::Occupied => true,
            CellState::ActiveOccupied => theme.outline_active,
            CellState::Inactive | CellState::Active | CellState::Absent => false,
        }
    }

    /// Base style class, shared with the icon backend.
    pub fn css_class(self) -> &'static str {
        match self {
            CellState::Active | CellState::ActiveOccupied => "workspace-active",
            CellState::Inactive | CellState::Occupied => "workspace-inactive",
            CellState::Absent => "workspace-absent",
        }
    }
}

/// A stroke around a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub color: String,
    pub thickness: u32,
}

/// Visual properties of one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    /// `None` draws no background.
    pub fill: Option<String>,
    pub outline: Option<Outline>,
    pub corner_radius: f64,
    pub opacity: f64,
    pub visible: bool,
}

impl CellStyle {
    /// Render as a CSS declaration block.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        match &self.fill {
            Some(fill) => {
                let _ = write!(css, "background-color: {}; ", fill);
            }
            None => css.push_str("background-color: transparent; "),
        }
        match &self.outline {
            Some(o) => {
                let _ = write!(css, "border: {}px solid {}; ", o.thickness, o.color);
            }
            None => css.push_str("border: none; "),
        }
        let _ = write!(css, "border-radius: {}px; opacity: {};", self.corner_radius, self.opacity);
        css
    }
}

/// Style for a cell in `state` whose core is `width × height` pixels.
pub fn resolve_style(
    state: CellState,
    theme: &ThemeConfig,
    absent: AbsentCells,
    width: u32,
    height: u32,
) -> CellStyle {
    let corner_radius = match theme.cell_shape {
        CellShape::Circle => width.min(height) as f64 / 2.0,
        CellShape::Square => 0.0,
    };
    let outline = state.shows_outline(theme).then(|| Outline {
        color: theme.occupied_outline_color.clone(),
        thickness: theme.occupied_outline_thickness,
    });

    match state {
        CellState::Active | CellState::ActiveOccupied => CellStyle {
            fill: Some(theme.active_fill.clone()),
            outline,
            corner_radius,
            opacity: 1.0,
            visible: true,
        },
        CellState::Inactive | CellState::Occupied => CellStyle {
            fill: Some(theme.inactive_fill.clone()),
            outline,
            corner_radius,
            opacity: 1.0,
            visible: true,
        },
        CellState::Absent => CellStyle {
            fill: Some(theme.inactive_fill.clone()),
            outline: None,
            corner_radius,
            opacity: ABSENT_OPACITY,
            visible: absent == AbsentCells::Dimmed,
        },
    }
}

/// One positioned, styled cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellVisualState {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    /// Left edge of the core, in widget pixels.
    pub x: f64,
    /// Top edge of the core, in widget pixels.
    pub y: f64,
    pub width: u32,
    pub height: u32,
    pub state: CellState,
    pub style: CellStyle,
}

impl CellVisualState {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn has_occupants(&self) -> bool {
        self.state.has_occupants()
    }
}

/// Derive every cell of `snapshot`'s grid.  Pure: the same inputs always
/// give the same sequence, in row-major order.
pub fn build_grid(
    snapshot: &WorkspaceSnapshot,
    theme: &ThemeConfig,
    geometry: &GridGeometry,
    absent: AbsentCells,
) -> Vec<CellVisualState> {
    let columns = snapshot.layout.columns;
    let width = geometry.column.core_size;
    let height = geometry.row.core_size;

    (0..snapshot.cell_count())
        .map(|index| {
            let coord = index_to_coordinate(index, columns);
            let (x, y) = geometry.cell_origin(coord);
            let state = CellState::of(index, snapshot);
            CellVisualState {
                index,
                row: coord.row,
                col: coord.col,
                x,
                y,
                width,
                height,
                state,
                style: resolve_style(state, theme, absent, width, height),
            }
        })
        .collect()
}

/// The cell backend's render output.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    layout: WorkspaceLayout,
    geometry: GridGeometry,
    absent: AbsentCells,
    cells: Vec<CellVisualState>,
}

impl CellGrid {
    /// Compute geometry for `allocation` and build every cell.
    pub fn build(
        snapshot: &WorkspaceSnapshot,
        theme: &ThemeConfig,
        mode: GeometryMode,
        allocation: Allocation,
        absent: AbsentCells,
    ) -> Self {
        let layout = snapshot.layout;
        let geometry = GridGeometry::compute(
            mode,
            allocation,
            layout.rows,
            layout.columns,
            theme.occupation_percent(),
        );
        let cells = build_grid(snapshot, theme, &geometry, absent);
        Self {
            layout,
            geometry,
            absent,
            cells,
        }
    }

    /// Re-derive state and style of the existing cells from a fresh
    /// snapshot.  Cell count, positions and sizes are left untouched; a
    /// snapshot whose layout disagrees with the grid is applied to the
    /// overlapping positions only.
    ///
    /// Returns the number of cells whose state changed.
    pub fn restyle(&mut self, snapshot: &WorkspaceSnapshot, theme: &ThemeConfig) -> usize {
        let mut changed = 0;
        for cell in &mut self.cells {
            let state = CellState::of(cell.index, snapshot);
            if state != cell.state {
                changed += 1;
            }
            cell.state = state;
            cell.style = resolve_style(state, theme, self.absent, cell.width, cell.height);
        }
        changed
    }

    pub fn cells(&self) -> &[CellVisualState] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&CellVisualState> {
        self.cells.get(index)
    }

    pub fn layout(&self) -> WorkspaceLayout {
        self.layout
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Pixel size of the whole grid as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        self.geometry.total_size(self.layout.rows, self.layout.columns)
    }

    /// Index of the active cell, if it is part of this grid.
    pub fn active_index(&self) -> Option<usize> {
        self.cells.iter().find(|c| c.is_active()).map(|c| c.index)
    }
}

//  Tests
