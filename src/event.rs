//! Notifications the host delivers to the engine, and how each one is
//! classified.
//!
//! Hosts subscribe through [`WorkspaceHost::connect`](crate::host::WorkspaceHost::connect)
//! with a [`SignalSource`] / [`Signal`] pair and then forward whatever fires
//! as a [`HostEvent`] to
//! [`ReconciliationController::handle`](crate::reconcile::ReconciliationController::handle).

use crate::config::ThemeConfig;
use std::fmt;

/// The object a subscription is attached to.
///
/// Window-added / window-removed notifications are scoped to individual
/// workspace objects, which is why [`SignalSource::Workspace`] carries an
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalSource {
    WorkspaceManager,
    Workspace(usize),
    Display,
    Settings,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSource::WorkspaceManager => write!(f, "workspace-manager"),
            SignalSource::Workspace(i) => write!(f, "workspace[{}]", i),
            SignalSource::Display => write!(f, "display"),
            SignalSource::Settings => write!(f, "settings"),
        }
    }
}

/// A notification kind the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    ActiveWorkspaceChanged,
    WorkspaceAdded,
    WorkspaceRemoved,
    LayoutChanged,
    WindowAdded,
    WindowRemoved,
    WindowCreated,
    WindowWorkspaceChanged,
    SettingsChanged,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::ActiveWorkspaceChanged => "active-workspace-changed",
            Signal::WorkspaceAdded => "workspace-added",
            Signal::WorkspaceRemoved => "workspace-removed",
            Signal::LayoutChanged => "layout-changed",
            Signal::WindowAdded => "window-added",
            Signal::WindowRemoved => "window-removed",
            Signal::WindowCreated => "window-created",
            Signal::WindowWorkspaceChanged => "window-workspace-changed",
            Signal::SettingsChanged => "changed",
        };
        f.write_str(name)
    }
}

/// Signals subscribed on the workspace manager.
pub const MANAGER_SIGNALS: [Signal; 4] = [
    Signal::ActiveWorkspaceChanged,
    Signal::WorkspaceAdded,
    Signal::WorkspaceRemoved,
    Signal::LayoutChanged,
];

/// Signals subscribed on every workspace object.
pub const WORKSPACE_SIGNALS: [Signal; 2] = [Signal::WindowAdded, Signal::WindowRemoved];

/// Signals subscribed on the display.
pub const DISPLAY_SIGNALS: [Signal; 2] = [Signal::WindowCreated, Signal::WindowWorkspaceChanged];

/// A notification delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    ActiveWorkspaceChanged,
    WorkspaceAdded(usize),
    WorkspaceRemoved(usize),
    /// The row or column count of the workspace grid changed.
    LayoutChanged,
    WindowAdded { workspace: usize },
    WindowRemoved { workspace: usize },
    WindowCreated,
    /// A window moved between workspaces or became sticky.
    WindowWorkspaceChanged,
    /// The widget's pixel allocation changed.
    AllocationChanged,
    /// The settings backend produced a new theme.  The value replaces the
    /// controller's current theme.
    ThemeChanged(ThemeConfig),
}

/// What a notification requires of the render model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Cell count or geometry must be recomputed.
    Layout,
    /// Existing cells only need restyling.
    State,
}

impl HostEvent {
    /// Classify this event against the theme currently in use.
    ///
    /// Returns `None` for a theme change that changes nothing.
    pub fn trigger(&self, current: &ThemeConfig) -> Option<Trigger> {
        match self {
            HostEvent::WorkspaceAdded(_)
            | HostEvent::WorkspaceRemoved(_)
            | HostEvent::LayoutChanged
            | HostEvent::AllocationChanged => Some(Trigger::Layout),
            HostEvent::ActiveWorkspaceChanged
            | HostEvent::WindowAdded { .. }
            | HostEvent::WindowRemoved { .. }
            | HostEvent::WindowCreated
            | HostEvent::WindowWorkspaceChanged => Some(Trigger::State),
            HostEvent::ThemeChanged(theme) => current.change_kind(theme),
        }
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::ActiveWorkspaceChanged => write!(f, "active workspace changed"),
            HostEvent::WorkspaceAdded(i) => write!(f, "workspace {} added", i),
            HostEvent::WorkspaceRemoved(i) => write!(f, "workspace {} removed", i),
            HostEvent::LayoutChanged => write!(f, "layout changed"),
            HostEvent::WindowAdded { workspace } => {
                write!(f, "window added to workspace {}", workspace)
            }
            HostEvent::WindowRemoved { workspace } => {
                write!(f, "window removed from workspace {}", workspace)
            }
            HostEvent::WindowCreated => write!(f, "window created"),
            HostEvent::WindowWorkspaceChanged => write!(f, "window changed workspace"),
            HostEvent::AllocationChanged => write!(f, "allocation changed"),
            HostEvent::ThemeChanged(_) => write!(f, "theme changed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CellShape;

    #[test]
    fn workspace_structure_events_are_layout_triggers() {
        let theme = ThemeConfig::default();
        for event in [
            HostEvent::WorkspaceAdded(3),
            HostEvent::WorkspaceRemoved(0),
            HostEvent::LayoutChanged,
            HostEvent::AllocationChanged,
        ] {
            assert_eq!(event.trigger(&theme), Some(Trigger::Layout), "{}", event);
        }
    }

    #[test]
    fn window_and_focus_events_are_state_triggers() {
        let theme = ThemeConfig::default();
        for event in [
            HostEvent::ActiveWorkspaceChanged,
            HostEvent::WindowAdded { workspace: 1 },
            HostEvent::WindowRemoved { workspace: 1 },
            HostEvent::WindowCreated,
            HostEvent::WindowWorkspaceChanged,
        ] {
            assert_eq!(event.trigger(&theme), Some(Trigger::State), "{}", event);
        }
    }

    #[test]
    fn theme_change_is_classified_by_content() {
        let theme = ThemeConfig::default();
        assert_eq!(HostEvent::ThemeChanged(theme.clone()).trigger(&theme), None);

        let shape = ThemeConfig {
            cell_shape: CellShape::Square,
            ..theme.clone()
        };
        assert_eq!(HostEvent::ThemeChanged(shape).trigger(&theme), Some(Trigger::Layout));

        let fill = ThemeConfig {
            active_fill: "red".into(),
            ..theme.clone()
        };
        assert_eq!(HostEvent::ThemeChanged(fill).trigger(&theme), Some(Trigger::State));
    }

    #[test]
    fn signal_display_uses_host_names() {
        assert_eq!(Signal::ActiveWorkspaceChanged.to_string(), "active-workspace-changed");
        assert_eq!(Signal::WindowAdded.to_string(), "window-added");
        assert_eq!(SignalSource::Workspace(2).to_string(), "workspace[2]");
    }
}
