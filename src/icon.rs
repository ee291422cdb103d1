//! Single-icon render backend.
//!
//! Some panel surfaces accept only one image rather than a tree of child
//! widgets.  [`build_icon`] draws the same cell model as [`crate::grid`] into
//! a self-contained SVG document: the same state precedence, the same
//! absent-cell policy and the same occupancy filtering, just a different
//! primitive.
//!
//! ```text
//! <svg width=W height=H>
//!   <style>            (OutlineMode::StyleClass only)
//!   <line class="grid-line">   × (cols-1) + (rows-1), if grid lines are on
//!   <circle|rect class="workspace-… [with-apps]">   × rows·cols
//! </svg>
//! ```

use crate::config::{CellShape, ThemeConfig};
use crate::geometry::{index_to_coordinate, Allocation, GeometryMode, GridCoord, GridGeometry};
use crate::grid::{AbsentCells, CellState, ABSENT_OPACITY};
use crate::snapshot::{WorkspaceLayout, WorkspaceSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// How occupied workspaces are marked in the icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineMode {
    /// An embedded stylesheet; occupied shapes carry a `with-apps` class.
    #[default]
    StyleClass,
    /// Presentation attributes written on every shape.
    Inline,
}

/// Backend switches for [`build_icon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IconOptions {
    pub outline: OutlineMode,
    pub absent: AbsentCells,
}

/// A generated SVG document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgIcon {
    width: u32,
    height: u32,
    markup: String,
}

impl SvgIcon {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_str(&self) -> &str {
        &self.markup
    }

    pub fn into_string(self) -> String {
        self.markup
    }
}

impl fmt::Display for SvgIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup)
    }
}

/// Errors from icon generation.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("icon size {width}x{height} has no pixels")]
    ZeroSize { width: u32, height: u32 },
    #[error("{field} value {value:?} cannot be embedded in an SVG document")]
    UnsafeColor { field: &'static str, value: String },
    #[error("icon size {size}px is below the minimum of {min}px")]
    TooSmall { size: u32, min: u32 },
    #[error("formatting error: {0}")]
    Format(#[from] fmt::Error),
}

/// Resolved colors, checked once per document.
struct Palette<'a> {
    grid: &'a str,
    active: &'a str,
    inactive: &'a str,
    outline: &'a str,
}

impl<'a> Palette<'a> {
    fn new(theme: &'a ThemeConfig) -> Result<Self, IconError> {
        Ok(Self {
            grid: embeddable("grid_color", &theme.grid_color)?,
            active: embeddable("active_fill", &theme.active_fill)?,
            inactive: embeddable("inactive_fill", &theme.inactive_fill)?,
            outline: embeddable("occupied_outline_color", &theme.occupied_outline_color)?,
        })
    }

    fn fill(&self, state: CellState) -> &'a str {
        if state.is_active() {
            self.active
        } else {
            self.inactive
        }
    }
}

/// Colors end up inside attribute values and a `<style>` block; anything
/// that could close either is rejected.
fn embeddable<'a>(field: &'static str, value: &'a str) -> Result<&'a str, IconError> {
    let value_ok = !value.trim().is_empty()
        && !value.contains(['<', '>', '&', '"', '\'', '{', '}', ';']);
    if value_ok {
        Ok(value.trim())
    } else {
        Err(IconError::UnsafeColor {
            field,
            value: value.to_string(),
        })
    }
}

/// Generate the icon for `snapshot`, `pixel_height` pixels tall and
/// `pixel_width` (default: `pixel_height`) pixels wide.
pub fn build_icon(
    snapshot: &WorkspaceSnapshot,
    theme: &ThemeConfig,
    options: IconOptions,
    pixel_height: u32,
    pixel_width: Option<u32>,
) -> Result<SvgIcon, IconError> {
    let height = pixel_height;
    let width = pixel_width.unwrap_or(pixel_height);
    if width == 0 || height == 0 {
        return Err(IconError::ZeroSize { width, height });
    }
    let palette = Palette::new(theme)?;

    let rows = snapshot.layout.rows;
    let columns = snapshot.layout.columns;
    let geometry = GridGeometry::compute(
        GeometryMode::PerAxis,
        Allocation::new(width as f64, height as f64),
        rows,
        columns,
        theme.occupation_percent(),
    );
    let slot_w = geometry.column.slot() as f64;
    let slot_h = geometry.row.slot() as f64;
    let (grid_w, grid_h) = geometry.total_size(rows, columns);
    // Center the grid; the calculator floors slots, leaving a few spare pixels.
    let offset_x = (width - grid_w) as f64 / 2.0;
    let offset_y = (height - grid_h) as f64 / 2.0;
    let side = geometry.column.core_size.min(geometry.row.core_size) as f64;

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    )?;

    if options.outline == OutlineMode::StyleClass {
        write_styles(&mut svg, theme, &palette)?;
    }

    if theme.grid_visible {
        let x_end = offset_x + grid_w as f64;
        let y_end = offset_y + grid_h as f64;
        for i in 1..columns {
            let x = offset_x + i as f64 * slot_w;
            write_line(&mut svg, options.outline, theme, &palette, (x, offset_y), (x, y_end))?;
        }
        for i in 1..rows {
            let y = offset_y + i as f64 * slot_h;
            write_line(&mut svg, options.outline, theme, &palette, (offset_x, y), (x_end, y))?;
        }
    }

    for index in 0..snapshot.cell_count() {
        let state = CellState::of(index, snapshot);
        if state == CellState::Absent && options.absent == AbsentCells::Hidden {
            continue;
        }
        let coord = index_to_coordinate(index, columns);
        let slot_x = offset_x + coord.col as f64 * slot_w;
        let slot_y = offset_y + coord.row as f64 * slot_h;

        svg.push_str("  ");
        match theme.cell_shape {
            CellShape::Circle => write!(
                svg,
                r#"<circle cx="{}" cy="{}" r="{}""#,
                slot_x + slot_w / 2.0,
                slot_y + slot_h / 2.0,
                side / 2.0
            )?,
            CellShape::Square => write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                slot_x + (slot_w - side) / 2.0,
                slot_y + (slot_h - side) / 2.0,
                side,
                side
            )?,
        }
        match options.outline {
            OutlineMode::StyleClass => write_class(&mut svg, state, theme)?,
            OutlineMode::Inline => write_presentation(&mut svg, state, theme, &palette)?,
        }
        svg.push_str("/>\n");
    }

    svg.push_str("</svg>\n");
    Ok(SvgIcon {
        width,
        height,
        markup: svg,
    })
}

/// Side of a square icon-set icon: the largest multiple of the longer grid
/// axis that fits in `max_size`.
pub fn icon_set_size(layout: WorkspaceLayout, max_size: u32, min_size: u32) -> Result<u32, IconError> {
    let cells = layout.rows.max(layout.columns) as u32;
    let size = (max_size / cells) * cells;
    if size < min_size || size == 0 {
        return Err(IconError::TooSmall { size, min: min_size });
    }
    Ok(size)
}

/// One `size`×`size` icon per grid position, each with that position
/// active, in row-major order.  Every position counts as a live workspace.
pub fn build_icon_set(
    layout: WorkspaceLayout,
    theme: &ThemeConfig,
    options: IconOptions,
    size: u32,
) -> Result<Vec<(GridCoord, SvgIcon)>, IconError> {
    let total = layout.cell_count();
    (0..total)
        .map(|active| {
            let snapshot = WorkspaceSnapshot::from_parts(layout, total, active, &[]);
            let icon = build_icon(&snapshot, theme, options, size, Some(size))?;
            Ok((index_to_coordinate(active, layout.columns), icon))
        })
        .collect()
}

fn write_styles(svg: &mut String, theme: &ThemeConfig, palette: &Palette<'_>) -> fmt::Result {
    svg.push_str("  <style>\n");
    writeln!(
        svg,
        "    .grid-line {{ stroke: {}; stroke-width: {}; }}",
        palette.grid, theme.grid_thickness
    )?;
    writeln!(svg, "    .workspace-inactive {{ fill: {}; stroke: none; }}", palette.inactive)?;
    writeln!(svg, "    .workspace-active {{ fill: {}; stroke: none; }}", palette.active)?;
    writeln!(
        svg,
        "    .workspace-absent {{ fill: {}; stroke: none; opacity: {}; }}",
        palette.inactive, ABSENT_OPACITY
    )?;
    writeln!(
        svg,
        "    .with-apps {{ stroke: {}; stroke-width: {}; }}",
        palette.outline, theme.occupied_outline_thickness
    )?;
    svg.push_str("  </style>\n");
    Ok(())
}

fn write_line(
    svg: &mut String,
    mode: OutlineMode,
    theme: &ThemeConfig,
    palette: &Palette<'_>,
    (x1, y1): (f64, f64),
    (x2, y2): (f64, f64),
) -> fmt::Result {
    write!(svg, r#"  <line x1="{}" y1="{}" x2="{}" y2="{}""#, x1, y1, x2, y2)?;
    match mode {
        OutlineMode::StyleClass => svg.push_str(r#" class="grid-line""#),
        OutlineMode::Inline => write!(
            svg,
            r#" stroke="{}" stroke-width="{}""#,
            palette.grid, theme.grid_thickness
        )?,
    }
    svg.push_str("/>\n");
    Ok(())
}

fn write_class(svg: &mut String, state: CellState, theme: &ThemeConfig) -> fmt::Result {
    if state.shows_outline(theme) {
        write!(svg, r#" class="{} with-apps""#, state.css_class())
    } else {
        write!(svg, r#" class="{}""#, state.css_class())
    }
}

fn write_presentation(
    svg: &mut String,
    state: CellState,
    theme: &ThemeConfig,
    palette: &Palette<'_>,
) -> fmt::Result {
    write!(svg, r#" fill="{}""#, palette.fill(state))?;
    if state.shows_outline(theme) {
        write!(
            svg,
            r#" stroke="{}" stroke-width="{}""#,
            palette.outline, theme.occupied_outline_thickness
        )?;
    } else {
        svg.push_str(r#" stroke="none""#);
    }
    if state == CellState::Absent {
        write!(svg, r#" opacity="{}""#, ABSENT_OPACITY)?;
    }
    Ok(())
}
