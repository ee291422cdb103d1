//! Application configuration.
//!
//! The configuration is a JSON file with two sections: `"theme"` holds the
//! appearance settings a user can change at runtime, `"indicator"` holds the
//! capability flags fixed when a widget is created.
//!
//! # Example
//!
//! ```json
//! {
//!   "theme": {
//!     "grid_visible": true,
//!     "cell_shape": "square",
//!     "cell_size": 80,
//!     "outline_active": true
//!   },
//!   "indicator": {
//!     "backend": "icon",
//!     "scroll_policy": "wrap"
//!   }
//! }
//! ```

use crate::event::Trigger;
use crate::geometry::GeometryMode;
use crate::grid::AbsentCells;
use crate::icon::OutlineMode;
use crate::scroll::ScrollPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Appearance settings.
    #[serde(default)]
    pub theme: ThemeConfig,

    /// Rendering and input behaviour.
    #[serde(default)]
    pub indicator: IndicatorConfig,
}

/// Shape drawn for each workspace cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellShape {
    #[default]
    Circle,
    Square,
}

/// Appearance settings.
///
/// Colors are CSS color strings (`"white"`, `"#ff0000"`,
/// `"rgba(255, 255, 255, 0.5)"`) and are passed through to the render
/// backend unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Draw separator lines between cells.  Default: `false`.
    pub grid_visible: bool,
    pub grid_color: String,
    /// Separator line thickness in pixels.  Default: `1`.
    pub grid_thickness: u32,
    pub cell_shape: CellShape,
    /// Share of each slot covered by the cell, in percent.  Default: `75`.
    pub cell_size: f64,
    pub active_fill: String,
    pub inactive_fill: String,
    /// Outline drawn around workspaces that hold windows.
    pub occupied_outline_color: String,
    pub occupied_outline_thickness: u32,
    /// Keep the occupancy outline on the active cell too.  Default: `false`.
    pub outline_active: bool,
    /// Log every notification and render pass.  Default: `false`.
    pub debug_logging: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            grid_visible: false,
            grid_color: "rgba(255, 255, 255, 1.0)".into(),
            grid_thickness: 1,
            cell_shape: CellShape::Circle,
            cell_size: 75.0,
            active_fill: "rgba(255, 255, 255, 1)".into(),
            inactive_fill: "rgba(128, 128, 128, 0.5)".into(),
            occupied_outline_color: "rgba(255, 255, 255, 1)".into(),
            occupied_outline_thickness: 1,
            outline_active: false,
            debug_logging: false,
        }
    }
}

impl ThemeConfig {
    /// [`cell_size`](Self::cell_size) clamped to `[0, 100]`.
    pub fn occupation_percent(&self) -> f64 {
        if self.cell_size.is_nan() {
            return 0.0;
        }
        self.cell_size.clamp(0.0, 100.0)
    }

    /// How replacing `self` with `next` affects the render model.
    ///
    /// Cell size, cell shape and grid lines change geometry or the shapes
    /// drawn; every other field only restyles.  `None` when nothing changed.
    pub fn change_kind(&self, next: &ThemeConfig) -> Option<Trigger> {
        if self == next {
            return None;
        }
        let geometry_changed = self.cell_size != next.cell_size
            || self.cell_shape != next.cell_shape
            || self.grid_visible != next.grid_visible
            || self.grid_thickness != next.grid_thickness;
        if geometry_changed {
            Some(Trigger::Layout)
        } else {
            Some(Trigger::State)
        }
    }
}

/// Which render output the widget produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderBackend {
    /// A live grid of positioned cell descriptors.
    #[default]
    Cells,
    /// One generated SVG icon.
    Icon,
}

/// Rendering and input behaviour, fixed per widget.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub backend: RenderBackend,
    /// Behaviour when scrolling past the first or last workspace.
    pub scroll_policy: ScrollPolicy,
    /// How cells beyond the live workspace count are drawn.
    pub absent_cells: AbsentCells,
    pub geometry: GeometryMode,
    /// How the icon backend marks occupied workspaces.
    pub icon_outline: OutlineMode,
    /// Icon width in pixels.  Defaults to the icon height.
    pub icon_width: Option<u32>,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
