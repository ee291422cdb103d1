//! Point-in-time view of the host's workspace state.

use crate::host::WorkspaceHost;
use std::collections::BTreeSet;

/// Rows and columns of the workspace grid.
///
/// Hosts may report zero or negative-looking layouts while a workspace is
/// being added or removed; [`WorkspaceLayout::new`] clamps both axes to at
/// least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub rows: usize,
    pub columns: usize,
}

impl WorkspaceLayout {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: rows.max(1),
            columns: columns.max(1),
        }
    }

    /// Number of grid positions.
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Grow the row count until the grid holds `total` workspaces.
    fn fit(self, total: usize) -> Self {
        let layout = Self::new(self.rows, self.columns);
        if layout.cell_count() >= total {
            return layout;
        }
        Self::new(total.div_ceil(layout.columns), layout.columns)
    }
}

/// Where a window lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPlacement {
    /// On a single workspace.
    Workspace(usize),
    /// Sticky: shown on every workspace.
    AllWorkspaces,
    /// Not yet assigned (e.g. still being mapped).
    Unplaced,
}

/// Window kinds as reported by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    #[default]
    Normal,
    Dialog,
    ModalDialog,
    Utility,
    Toolbar,
    Menu,
    Splash,
    /// The desktop background window.
    Desktop,
    /// Panels and docks.
    Dock,
}

/// The per-window facts occupancy depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub placement: WindowPlacement,
    pub window_type: WindowType,
    pub skip_taskbar: bool,
    pub skip_pager: bool,
}

impl WindowInfo {
    /// A normal window on `workspace`.
    pub fn on_workspace(workspace: usize) -> Self {
        Self {
            placement: WindowPlacement::Workspace(workspace),
            window_type: WindowType::Normal,
            skip_taskbar: false,
            skip_pager: false,
        }
    }

    /// A normal window shown on every workspace.
    pub fn sticky() -> Self {
        Self {
            placement: WindowPlacement::AllWorkspaces,
            ..Self::on_workspace(0)
        }
    }

    /// Whether this window makes its workspace count as occupied.
    ///
    /// Desktop and dock windows exist on every workspace and would mark the
    /// whole grid occupied; skip-taskbar and skip-pager windows have asked
    /// not to be listed.
    pub fn is_content(&self) -> bool {
        !matches!(self.window_type, WindowType::Desktop | WindowType::Dock)
            && !self.skip_taskbar
            && !self.skip_pager
    }
}

/// A consistent read of the host's workspace state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSnapshot {
    pub layout: WorkspaceLayout,
    pub total_workspaces: usize,
    pub active_index: usize,
    pub occupied: BTreeSet<usize>,
}

impl WorkspaceSnapshot {
    /// Assemble a snapshot from raw host values, clamping anything the
    /// host reported inconsistently.
    pub fn from_parts(
        layout: WorkspaceLayout,
        total_workspaces: usize,
        active_index: usize,
        windows: &[WindowInfo],
    ) -> Self {
        let total = total_workspaces.max(1);
        let layout = layout.fit(total);
        let active_index = active_index.min(total - 1);

        let mut occupied = BTreeSet::new();
        for window in windows.iter().filter(|w| w.is_content()) {
            match window.placement {
                WindowPlacement::AllWorkspaces => {
                    occupied.extend(0..total);
                    break;
                }
                WindowPlacement::Workspace(i) if i < total => {
                    occupied.insert(i);
                }
                WindowPlacement::Workspace(_) | WindowPlacement::Unplaced => {}
            }
        }

        Self {
            layout,
            total_workspaces: total,
            active_index,
            occupied,
        }
    }

    /// Number of grid positions, including padding beyond the live count.
    pub fn cell_count(&self) -> usize {
        self.layout.cell_count()
    }

    /// Whether grid position `index` corresponds to a live workspace.
    pub fn is_present(&self, index: usize) -> bool {
        index < self.total_workspaces
    }

    pub fn is_active(&self, index: usize) -> bool {
        index == self.active_index
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        self.is_present(index) && self.occupied.contains(&index)
    }
}

/// Read the host's current state in one synchronous pass.
pub fn capture_snapshot<H: WorkspaceHost + ?Sized>(host: &H) -> WorkspaceSnapshot {
    let layout = host.layout();
    let total = host.workspace_count();
    let active = host.active_workspace_index();
    let windows = host.windows();
    WorkspaceSnapshot::from_parts(layout, total, active, &windows)
}
