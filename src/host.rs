//! The seam between the engine and the desktop shell that hosts it.
//!
//! Everything the engine knows about workspaces, windows, the event loop and
//! the widget's pixel budget comes through [`WorkspaceHost`].  A shell
//! integration implements it once; tests implement it with a recording mock.

use crate::event::{Signal, SignalSource};
use crate::geometry::Allocation;
use crate::snapshot::{WindowInfo, WorkspaceLayout};
use std::fmt;

/// Opaque token for a live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Opaque token for a scheduled idle callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdleId(pub u64);

impl fmt::Display for IdleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "idle#{}", self.0)
    }
}

/// Abstraction over the shell that owns the workspace model and the event
/// loop.
///
/// Queries are plain reads and may briefly disagree with each other while a
/// workspace is being added or removed; the engine clamps what it reads.
///
/// # Event delivery
///
/// The host never calls into the engine by closure.  Instead:
///
/// * for every live subscription, the host forwards the notification as a
///   [`HostEvent`](crate::event::HostEvent) to
///   [`ReconciliationController::handle`](crate::reconcile::ReconciliationController::handle);
/// * for every idle callback that was scheduled and not cancelled, the host
///   calls [`ReconciliationController::on_idle`](crate::reconcile::ReconciliationController::on_idle)
///   once with the id it handed out, from its main loop.
pub trait WorkspaceHost {
    /// The error type produced by this host's commands.
    type Error: std::error::Error + Send + 'static;

    /// Rows and columns of the workspace grid, as configured in the host.
    fn layout(&self) -> WorkspaceLayout;

    /// Index of the workspace currently shown.
    fn active_workspace_index(&self) -> usize;

    /// Number of live workspaces.
    fn workspace_count(&self) -> usize;

    /// Every window the host knows about.
    fn windows(&self) -> Vec<WindowInfo>;

    /// Pixel budget of the widget inside the panel.
    fn allocation(&self) -> Allocation;

    /// Switch to workspace `index`.  Fire-and-forget: the resulting
    /// active-workspace notification drives the re-render.
    fn activate_workspace(&self, index: usize) -> Result<(), Self::Error>;

    /// Open the indicator's configuration UI.
    fn open_preferences(&self) -> Result<(), Self::Error>;

    /// Subscribe to `signal` on `source`.
    fn connect(&self, source: SignalSource, signal: Signal) -> Result<SubscriptionId, Self::Error>;

    /// Revoke a subscription.  Unknown or already-revoked ids are ignored.
    fn disconnect(&self, id: SubscriptionId);

    /// Request a single-shot callback on the next idle cycle.
    fn schedule_idle(&self) -> IdleId;

    /// Cancel a pending idle callback.  Unknown or already-run ids are
    /// ignored.
    fn cancel_idle(&self, id: IdleId);
}
