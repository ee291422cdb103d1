//! Widget toolkit backends for the cell grid.
//!
//! The stylesheet generator here is toolkit-independent; each cell widget
//! is given a name from [`cell_widget_name`] and styled by an id selector.
//! With the `widget-gtk` feature enabled, [`gtk::GridWidget`] draws a
//! [`CellGrid`] with GTK4.

#[cfg(feature = "widget-gtk")]
pub mod gtk;

use crate::grid::CellGrid;
use std::fmt::Write;

/// Widget name of cell `index`.
pub fn cell_widget_name(prefix: &str, index: usize) -> String {
    format!("{}-cell-{}", prefix, index)
}

/// One rule per cell, keyed by widget name.
///
/// ```text
/// #wsgrid-cell-0 { background-color: white; border-radius: 6px; opacity: 1; min-width: 12px; min-height: 12px; }
/// ```
pub fn stylesheet(grid: &CellGrid, prefix: &str) -> String {
    let mut css = String::new();
    for cell in grid.cells() {
        // Writing into a String cannot fail.
        let _ = writeln!(
            css,
            "#{} {{ {} min-width: {}px; min-height: {}px; }}",
            cell_widget_name(prefix, cell.index),
            cell.style.to_css(),
            cell.width,
            cell.height,
        );
    }
    css
}
