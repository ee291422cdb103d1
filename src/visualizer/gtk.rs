//! GTK4 cell-grid widget.
//!
//! # Widget tree
//!
//! ```text
//! gtk4::Fixed                  (.wsgrid, sized to the grid)
//! ├ gtk4::Box #<prefix>-cell-0 (.workspace-active / -inactive / -absent)
//! ├ gtk4::Box #<prefix>-cell-1
//! └ …
//! ```
//!
//! Cell appearance comes from a per-widget stylesheet generated by
//! [`stylesheet`](super::stylesheet) and reloaded on every [`GridWidget::sync`].
//! The `.workspace-*` and `.with-apps` classes are kept in step so user CSS
//! can hook into them.

use super::{cell_widget_name, stylesheet};
use crate::geometry::GridGeometry;
use crate::grid::CellGrid;
use crate::host::WorkspaceHost;
use crate::reconcile::ReconciliationController;
use crate::scroll::ScrollInput;
use crate::snapshot::WorkspaceLayout;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use log::{debug, error, warn};
use std::cell::RefCell;
use std::rc::Rc;

const STATE_CLASSES: [&str; 3] = ["workspace-active", "workspace-inactive", "workspace-absent"];

/// A `gtk4::Fixed` holding one box per workspace cell.
pub struct GridWidget {
    root: gtk4::Fixed,
    cells: Vec<gtk4::Box>,
    provider: gtk4::CssProvider,
    prefix: String,
    placed: Option<(WorkspaceLayout, GridGeometry)>,
}

impl GridWidget {
    /// Create an empty widget.  `prefix` must be unique per widget on the
    /// display; it namespaces the generated CSS.
    pub fn new(prefix: &str) -> Self {
        let root = gtk4::Fixed::new();
        root.add_css_class("wsgrid");

        let provider = gtk4::CssProvider::new();
        if let Some(display) = gdk::Display::default() {
            gtk4::style_context_add_provider_for_display(
                &display,
                &provider,
                gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        } else {
            warn!("no GDK display; cell styles will not be applied");
        }

        Self {
            root,
            cells: Vec::new(),
            provider,
            prefix: prefix.to_string(),
            placed: None,
        }
    }

    /// The widget to pack into the host's container.
    pub fn widget(&self) -> &gtk4::Fixed {
        &self.root
    }

    /// Bring the widget tree in line with `grid`.
    ///
    /// Children are recreated only when the layout or geometry changed;
    /// otherwise styles and classes are patched in place.
    pub fn sync(&mut self, grid: &CellGrid) {
        let placement = (grid.layout(), *grid.geometry());
        if self.placed != Some(placement) || self.cells.len() != grid.cells().len() {
            self.place_cells(grid);
            self.placed = Some(placement);
        }

        for (widget, cell) in self.cells.iter().zip(grid.cells()) {
            for class in STATE_CLASSES {
                widget.remove_css_class(class);
            }
            widget.add_css_class(cell.state.css_class());
            if cell.style.outline.is_some() {
                widget.add_css_class("with-apps");
            } else {
                widget.remove_css_class("with-apps");
            }
            widget.set_visible(cell.style.visible);
        }

        #[allow(deprecated)]
        self.provider.load_from_data(&stylesheet(grid, &self.prefix));
    }

    fn place_cells(&mut self, grid: &CellGrid) {
        for cell in self.cells.drain(..) {
            self.root.remove(&cell);
        }
        let (width, height) = grid.size();
        self.root.set_size_request(width as i32, height as i32);

        for cell in grid.cells() {
            let widget = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
            widget.set_widget_name(&cell_widget_name(&self.prefix, cell.index));
            widget.set_size_request(cell.width as i32, cell.height as i32);
            widget.set_can_target(false);
            self.root.put(&widget, cell.x, cell.y);
            self.cells.push(widget);
        }
        debug!(
            "placed {} cells ({}x{} px)",
            self.cells.len(),
            width,
            height
        );
    }

    /// Forward scrolling and clicks on the widget to `controller`.
    pub fn connect_input<H: WorkspaceHost + 'static>(
        &self,
        controller: Rc<RefCell<ReconciliationController<H>>>,
    ) {
        let scroll = gtk4::EventControllerScroll::new(gtk4::EventControllerScrollFlags::VERTICAL);
        let ctl = Rc::clone(&controller);
        scroll.connect_scroll(move |scroll, _dx, dy| {
            let input = scroll_input(scroll, dy);
            if let Err(e) = ctl.borrow_mut().scroll(input) {
                error!("scroll {} failed: {}", input, e);
            }
            glib::Propagation::Stop
        });
        self.root.add_controller(scroll);

        let click = gtk4::GestureClick::new();
        click.connect_released(move |_, _, _, _| {
            if let Err(e) = controller.borrow().activate() {
                error!("failed to open preferences: {}", e);
            }
        });
        self.root.add_controller(click);
    }
}

/// Wheel clicks become discrete steps, touchpad motion stays smooth.
fn scroll_input(scroll: &gtk4::EventControllerScroll, dy: f64) -> ScrollInput {
    let direction = scroll
        .current_event()
        .and_then(|event| event.downcast_ref::<gdk::ScrollEvent>().map(|e| e.direction()));
    match direction {
        Some(gdk::ScrollDirection::Up) => ScrollInput::Up,
        Some(gdk::ScrollDirection::Down) => ScrollInput::Down,
        _ => ScrollInput::Smooth { delta_y: dy },
    }
}

impl Drop for GridWidget {
    fn drop(&mut self) {
        if let Some(display) = gdk::Display::default() {
            gtk4::style_context_remove_provider_for_display(&display, &self.provider);
        }
    }
}
