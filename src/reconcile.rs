//! The orchestrator that keeps a widget's render model in sync with the
//! host.
//!
//! [`ReconciliationController`] owns the render model, the theme, and every
//! subscription and idle callback it has asked the host for.  Notifications
//! are classified as layout-affecting or state-only (see
//! [`Trigger`]) and turned into at most one pending rebuild and one pending
//! update, so a burst of notifications inside one main-loop iteration costs a
//! single pass.
//!
//! ```text
//!              layout trigger             on_idle(rebuild)
//!   Idle ───────────────────────▶ RebuildPending ──────────▶ Idle
//!    │                                 ▲   geometry → cells → restyle
//!    │ state trigger                   │ layout trigger
//!    ▼                                 │
//!   UpdatePending ─────────────────────┘ (rebuild cancels the update)
//!    │ on_idle(update): restyle
//!    ▼
//!   Idle
//! ```

use crate::config::{Config, IndicatorConfig, RenderBackend, ThemeConfig};
use crate::event::{
    HostEvent, Signal, SignalSource, Trigger, DISPLAY_SIGNALS, MANAGER_SIGNALS, WORKSPACE_SIGNALS,
};
use crate::grid::CellGrid;
use crate::host::{IdleId, SubscriptionId, WorkspaceHost};
use crate::icon::{build_icon, IconOptions, SvgIcon};
use crate::scroll::{ScrollInput, ScrollNavigator};
use crate::snapshot::{capture_snapshot, WorkspaceSnapshot};
use log::{debug, error, info, log, warn, Level};

/// Possible errors from the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The host rejected a subscription or a command.
    #[error("host error: {0}")]
    Host(String),
    /// The controller was used after [`destroy`](ReconciliationController::destroy).
    #[error("controller has been torn down")]
    Destroyed,
}

/// A live `(source, signal)` subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Subscription {
    source: SignalSource,
    signal: Signal,
    id: SubscriptionId,
}

/// Counters for completed render passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub rebuilds: u64,
    pub updates: u64,
    /// Icon generations that failed and left the previous icon in place.
    pub icon_failures: u64,
}

/// What the host should display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOutput<'a> {
    Cells(&'a CellGrid),
    Icon(&'a SvgIcon),
}

/// Reconciles host notifications into one widget's render model.
///
/// # Typical usage
///
/// ```ignore
/// let mut ctl = ReconciliationController::new(host, config);
/// ctl.start()?;
/// // from the host's signal handlers:
/// ctl.handle(HostEvent::ActiveWorkspaceChanged)?;
/// // from the host's idle dispatcher:
/// ctl.on_idle(id);
/// // on unmount:
/// ctl.destroy();
/// ```
pub struct ReconciliationController<H: WorkspaceHost> {
    host: H,
    theme: ThemeConfig,
    indicator: IndicatorConfig,
    navigator: ScrollNavigator,
    cells: Option<CellGrid>,
    icon: Option<SvgIcon>,
    subscriptions: Vec<Subscription>,
    pending_rebuild: Option<IdleId>,
    pending_update: Option<IdleId>,
    stats: ReconcileStats,
    started: bool,
    destroyed: bool,
}

impl<H: WorkspaceHost> ReconciliationController<H> {
    /// Create a controller.  Nothing is subscribed or rendered until
    /// [`start`](Self::start).
    pub fn new(host: H, config: Config) -> Self {
        let navigator = ScrollNavigator::new(config.indicator.scroll_policy);
        Self {
            host,
            theme: config.theme,
            indicator: config.indicator,
            navigator,
            cells: None,
            icon: None,
            subscriptions: Vec::new(),
            pending_rebuild: None,
            pending_update: None,
            stats: ReconcileStats::default(),
            started: false,
            destroyed: false,
        }
    }

    /// Subscribe to every notification source and render once.
    ///
    /// Calling `start` again after it succeeded is a no-op.  If a
    /// subscription fails, the ones made so far are released and `start`
    /// may be retried.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.destroyed {
            return Err(ControllerError::Destroyed);
        }
        if self.started {
            return Ok(());
        }
        if let Err(e) = self.subscribe_all() {
            self.release_subscriptions();
            return Err(e);
        }
        self.started = true;

        info!(
            "indicator started ({:?} backend, {} subscriptions)",
            self.indicator.backend,
            self.subscriptions.len()
        );
        self.rebuild();
        Ok(())
    }

    /// Process one host notification.
    ///
    /// Only schedules work; the render model changes when the host runs the
    /// scheduled idle callback.
    pub fn handle(&mut self, event: HostEvent) -> Result<(), ControllerError> {
        if self.destroyed {
            warn!("{} delivered after teardown", event);
            return Err(ControllerError::Destroyed);
        }
        log!(self.trace_level(), "event: {}", event);

        let trigger = event.trigger(&self.theme);
        let workspaces_changed = matches!(
            event,
            HostEvent::WorkspaceAdded(_) | HostEvent::WorkspaceRemoved(_)
        );
        if let HostEvent::ThemeChanged(theme) = event {
            self.theme = theme;
        }

        match trigger {
            Some(Trigger::Layout) => self.schedule_rebuild(),
            Some(Trigger::State) => self.schedule_update(),
            None => debug!("theme unchanged, nothing to do"),
        }

        // After scheduling, so a failed resubscription still rebuilds.
        if workspaces_changed {
            self.resubscribe_workspaces()?;
        }
        Ok(())
    }

    /// Run the idle callback the host scheduled under `id`.
    pub fn on_idle(&mut self, id: IdleId) {
        if self.destroyed {
            error!("{} fired after teardown; it should have been cancelled", id);
            return;
        }
        if self.pending_rebuild == Some(id) {
            self.pending_rebuild = None;
            self.rebuild();
        } else if self.pending_update == Some(id) {
            self.pending_update = None;
            self.update();
        } else {
            warn!("ignoring unknown {}", id);
        }
    }

    /// Feed a scroll event and activate the resulting workspace, if any.
    ///
    /// Returns the index handed to the host.
    pub fn scroll(&mut self, input: ScrollInput) -> Result<Option<usize>, ControllerError> {
        if self.destroyed {
            return Err(ControllerError::Destroyed);
        }
        let active = self.host.active_workspace_index();
        let total = self.host.workspace_count();
        let Some(cmd) = self.navigator.on_scroll(input, active, total) else {
            return Ok(None);
        };
        log!(self.trace_level(), "scroll {} -> workspace {}", input, cmd.index);
        self.host
            .activate_workspace(cmd.index)
            .map_err(|e| ControllerError::Host(e.to_string()))?;
        Ok(Some(cmd.index))
    }

    /// Click on the widget: open the configuration UI.
    pub fn activate(&self) -> Result<(), ControllerError> {
        if self.destroyed {
            return Err(ControllerError::Destroyed);
        }
        self.host
            .open_preferences()
            .map_err(|e| ControllerError::Host(e.to_string()))
    }

    /// Cancel pending callbacks and revoke every subscription.  Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for id in [self.pending_rebuild.take(), self.pending_update.take()]
            .into_iter()
            .flatten()
        {
            self.host.cancel_idle(id);
        }
        let count = self.release_subscriptions();
        info!("indicator torn down ({} subscriptions released)", count);
    }

    //  Accessors

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    /// The latest render, or `None` before the first successful pass.
    pub fn output(&self) -> Option<RenderOutput<'_>> {
        match self.indicator.backend {
            RenderBackend::Cells => self.cells.as_ref().map(RenderOutput::Cells),
            RenderBackend::Icon => self.icon.as_ref().map(RenderOutput::Icon),
        }
    }

    pub fn is_rebuild_pending(&self) -> bool {
        self.pending_rebuild.is_some()
    }

    pub fn is_update_pending(&self) -> bool {
        self.pending_update.is_some()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    //  Scheduling

    fn schedule_rebuild(&mut self) {
        if self.pending_rebuild.is_some() {
            debug!("rebuild already pending");
            return;
        }
        self.pending_rebuild = Some(self.host.schedule_idle());
    }

    fn schedule_update(&mut self) {
        if self.pending_rebuild.is_some() || self.pending_update.is_some() {
            debug!("update already covered by a pending pass");
            return;
        }
        self.pending_update = Some(self.host.schedule_idle());
    }

    //  Render passes

    /// Geometry, then cells, then state, in that order.
    fn rebuild(&mut self) {
        if let Some(id) = self.pending_update.take() {
            self.host.cancel_idle(id);
        }
        let snapshot = capture_snapshot(&self.host);
        if self.indicator.backend == RenderBackend::Cells {
            self.cells = Some(self.build_cells(&snapshot));
        }
        self.stats.rebuilds += 1;
        log!(
            self.trace_level(),
            "rebuild #{}: {}x{} grid, {} workspaces",
            self.stats.rebuilds,
            snapshot.layout.rows,
            snapshot.layout.columns,
            snapshot.total_workspaces
        );
        self.apply_state(&snapshot);
    }

    fn update(&mut self) {
        let snapshot = capture_snapshot(&self.host);
        self.apply_state(&snapshot);
    }

    fn apply_state(&mut self, snapshot: &WorkspaceSnapshot) {
        match self.indicator.backend {
            RenderBackend::Cells => {
                if let Some(grid) = self.cells.as_mut() {
                    grid.restyle(snapshot, &self.theme);
                } else {
                    self.cells = Some(self.build_cells(snapshot));
                }
            }
            RenderBackend::Icon => self.render_icon(snapshot),
        }
        self.stats.updates += 1;
        log!(
            self.trace_level(),
            "update #{}: active {}, occupied {:?}",
            self.stats.updates,
            snapshot.active_index,
            snapshot.occupied
        );
    }

    fn build_cells(&self, snapshot: &WorkspaceSnapshot) -> CellGrid {
        CellGrid::build(
            snapshot,
            &self.theme,
            self.indicator.geometry,
            self.host.allocation(),
            self.indicator.absent_cells,
        )
    }

    /// Regenerate the icon; on failure the previous one stays on screen.
    fn render_icon(&mut self, snapshot: &WorkspaceSnapshot) {
        let options = IconOptions {
            outline: self.indicator.icon_outline,
            absent: self.indicator.absent_cells,
        };
        let height = self.host.allocation().height.max(0.0).floor() as u32;
        match build_icon(snapshot, &self.theme, options, height, self.indicator.icon_width) {
            Ok(icon) => self.icon = Some(icon),
            Err(e) => {
                self.stats.icon_failures += 1;
                error!("icon generation failed, keeping last render: {}", e);
            }
        }
    }

    //  Subscriptions

    fn subscribe(&mut self, source: SignalSource, signal: Signal) -> Result<(), ControllerError> {
        let id = self
            .host
            .connect(source, signal)
            .map_err(|e| ControllerError::Host(format!("connect {} on {}: {}", signal, source, e)))?;
        debug!("subscribed {} on {} ({})", signal, source, id);
        self.subscriptions.push(Subscription { source, signal, id });
        Ok(())
    }

    fn subscribe_all(&mut self) -> Result<(), ControllerError> {
        for signal in MANAGER_SIGNALS {
            self.subscribe(SignalSource::WorkspaceManager, signal)?;
        }
        for signal in DISPLAY_SIGNALS {
            self.subscribe(SignalSource::Display, signal)?;
        }
        self.subscribe(SignalSource::Settings, Signal::SettingsChanged)?;
        self.subscribe_workspaces()
    }

    /// Disconnect every subscription; returns how many there were.
    fn release_subscriptions(&mut self) -> usize {
        let count = self.subscriptions.len();
        for sub in self.subscriptions.drain(..) {
            debug!("released {} on {} ({})", sub.signal, sub.source, sub.id);
            self.host.disconnect(sub.id);
        }
        count
    }

    fn subscribe_workspaces(&mut self) -> Result<(), ControllerError> {
        for index in 0..self.host.workspace_count() {
            for signal in WORKSPACE_SIGNALS {
                self.subscribe(SignalSource::Workspace(index), signal)?;
            }
        }
        Ok(())
    }

    /// Workspace objects came or went: drop every per-workspace
    /// subscription and subscribe the current set.
    fn resubscribe_workspaces(&mut self) -> Result<(), ControllerError> {
        let host = &self.host;
        self.subscriptions.retain(|sub| {
            let per_workspace = matches!(sub.source, SignalSource::Workspace(_));
            if per_workspace {
                debug!("released {} on {} ({})", sub.signal, sub.source, sub.id);
                host.disconnect(sub.id);
            }
            !per_workspace
        });
        self.subscribe_workspaces()
    }

    fn trace_level(&self) -> Level {
        if self.theme.debug_logging {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

impl<H: WorkspaceHost> Drop for ReconciliationController<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CellShape;
    use crate::geometry::Allocation;
    use crate::grid::CellState;
    use crate::scroll::ScrollPolicy;
    use crate::snapshot::{WindowInfo, WorkspaceLayout};
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    /// Record-keeping mock host with a simulated idle queue.
    #[derive(Debug)]
    struct MockHost {
        layout: Cell<WorkspaceLayout>,
        count: Cell<usize>,
        active: Cell<usize>,
        windows: RefCell<Vec<WindowInfo>>,
        allocation: Cell<Allocation>,
        next_id: Cell<u64>,
        live: RefCell<BTreeMap<SubscriptionId, (SignalSource, Signal)>>,
        idle_queue: RefCell<Vec<IdleId>>,
        scheduled: Cell<u32>,
        activations: RefCell<Vec<usize>>,
        preferences_opened: Cell<u32>,
        fail_connect: Cell<bool>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock host error")]
    struct MockError;

    impl MockHost {
        fn new(rows: usize, columns: usize, count: usize) -> Self {
            Self {
                layout: Cell::new(WorkspaceLayout::new(rows, columns)),
                count: Cell::new(count),
                active: Cell::new(0),
                windows: RefCell::new(Vec::new()),
                allocation: Cell::new(Allocation::square(30.0)),
                next_id: Cell::new(1),
                live: RefCell::new(BTreeMap::new()),
                idle_queue: RefCell::new(Vec::new()),
                scheduled: Cell::new(0),
                activations: RefCell::new(Vec::new()),
                preferences_opened: Cell::new(0),
                fail_connect: Cell::new(false),
            }
        }

        fn fresh_id(&self) -> u64 {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            id
        }

        fn live_on(&self, source: SignalSource) -> usize {
            self.live.borrow().values().filter(|(s, _)| *s == source).count()
        }
    }

    impl WorkspaceHost for MockHost {
        type Error = MockError;

        fn layout(&self) -> WorkspaceLayout {
            self.layout.get()
        }

        fn active_workspace_index(&self) -> usize {
            self.active.get()
        }

        fn workspace_count(&self) -> usize {
            self.count.get()
        }

        fn windows(&self) -> Vec<WindowInfo> {
            self.windows.borrow().clone()
        }

        fn allocation(&self) -> Allocation {
            self.allocation.get()
        }

        fn activate_workspace(&self, index: usize) -> Result<(), MockError> {
            self.activations.borrow_mut().push(index);
            Ok(())
        }

        fn open_preferences(&self) -> Result<(), MockError> {
            self.preferences_opened.set(self.preferences_opened.get() + 1);
            Ok(())
        }

        fn connect(&self, source: SignalSource, signal: Signal) -> Result<SubscriptionId, MockError> {
            if self.fail_connect.get() {
                return Err(MockError);
            }
            let id = SubscriptionId(self.fresh_id());
            self.live.borrow_mut().insert(id, (source, signal));
            Ok(id)
        }

        fn disconnect(&self, id: SubscriptionId) {
            self.live.borrow_mut().remove(&id);
        }

        fn schedule_idle(&self) -> IdleId {
            let id = IdleId(self.fresh_id());
            self.idle_queue.borrow_mut().push(id);
            self.scheduled.set(self.scheduled.get() + 1);
            id
        }

        fn cancel_idle(&self, id: IdleId) {
            self.idle_queue.borrow_mut().retain(|queued| *queued != id);
        }
    }

    /// One main-loop iteration: run every idle callback still queued.
    fn run_idle(ctl: &mut ReconciliationController<MockHost>) {
        let queued: Vec<IdleId> = ctl.host().idle_queue.borrow_mut().drain(..).collect();
        for id in queued {
            ctl.on_idle(id);
        }
    }

    fn started(host: MockHost, config: Config) -> ReconciliationController<MockHost> {
        let mut ctl = ReconciliationController::new(host, config);
        ctl.start().unwrap();
        ctl
    }

    fn cells(ctl: &ReconciliationController<MockHost>) -> &CellGrid {
        match ctl.output() {
            Some(RenderOutput::Cells(grid)) => grid,
            other => panic!("expected cell output, got {:?}", other),
        }
    }

    fn icon_config() -> Config {
        Config {
            indicator: IndicatorConfig {
                backend: RenderBackend::Icon,
                ..IndicatorConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn start_subscribes_everything_and_renders() {
        let ctl = started(MockHost::new(2, 2, 4), Config::default());
        let host = ctl.host();
        assert_eq!(host.live_on(SignalSource::WorkspaceManager), 4);
        assert_eq!(host.live_on(SignalSource::Display), 2);
        assert_eq!(host.live_on(SignalSource::Settings), 1);
        for i in 0..4 {
            assert_eq!(host.live_on(SignalSource::Workspace(i)), 2);
        }
        assert_eq!(ctl.subscription_count(), host.live.borrow().len());
        assert_eq!(ctl.stats().rebuilds, 1);
        assert_eq!(cells(&ctl).cells().len(), 4);
    }

    #[test]
    fn start_twice_is_a_noop() {
        let mut ctl = started(MockHost::new(1, 2, 2), Config::default());
        let subs = ctl.subscription_count();
        ctl.start().unwrap();
        assert_eq!(ctl.subscription_count(), subs);
        assert_eq!(ctl.stats().rebuilds, 1);
    }

    #[test]
    fn layout_triggers_coalesce_into_one_rebuild() {
        let mut ctl = started(MockHost::new(2, 2, 4), Config::default());
        let before = ctl.stats().rebuilds;
        for _ in 0..5 {
            ctl.handle(HostEvent::LayoutChanged).unwrap();
        }
        assert_eq!(ctl.host().scheduled.get(), 1);
        run_idle(&mut ctl);
        assert_eq!(ctl.stats().rebuilds - before, 1);
        assert!(!ctl.is_rebuild_pending());
    }

    #[test]
    fn state_triggers_coalesce_into_one_update() {
        let mut ctl = started(MockHost::new(2, 2, 4), Config::default());
        let before = ctl.stats();
        ctl.handle(HostEvent::ActiveWorkspaceChanged).unwrap();
        ctl.handle(HostEvent::WindowCreated).unwrap();
        ctl.handle(HostEvent::WindowAdded { workspace: 1 }).unwrap();
        assert_eq!(ctl.host().scheduled.get(), 1);
        run_idle(&mut ctl);
        assert_eq!(ctl.stats().updates - before.updates, 1);
        assert_eq!(ctl.stats().rebuilds, before.rebuilds);
    }

    #[test]
    fn state_trigger_folds_into_pending_rebuild() {
        let mut ctl = started(MockHost::new(2, 2, 4), Config::default());
        ctl.handle(HostEvent::LayoutChanged).unwrap();
        ctl.handle(HostEvent::ActiveWorkspaceChanged).unwrap();
        assert!(ctl.is_rebuild_pending());
        assert!(!ctl.is_update_pending());
        assert_eq!(ctl.host().scheduled.get(), 1);
    }

    #[test]
    fn rebuild_cancels_pending_update() {
        let mut ctl = started(MockHost::new(2, 2, 4), Config::default());
        ctl.handle(HostEvent::ActiveWorkspaceChanged).unwrap();
        ctl.handle(HostEvent::LayoutChanged).unwrap();
        assert!(ctl.is_update_pending() && ctl.is_rebuild_pending());

        let before = ctl.stats();
        // Run the rebuild first; it must cancel the queued update.
        let rebuild_id = *ctl.host().idle_queue.borrow().last().unwrap();
        ctl.host().idle_queue.borrow_mut().retain(|id| *id != rebuild_id);
        assert_eq!(ctl.host().idle_queue.borrow().len(), 1);
        ctl.on_idle(rebuild_id);
        assert!(!ctl.is_update_pending());
        assert_eq!(ctl.stats().rebuilds - before.rebuilds, 1);
        assert_eq!(ctl.stats().updates - before.updates, 1);
        assert!(ctl.host().idle_queue.borrow().is_empty());
    }

    #[test]
    fn update_reflects_new_active_and_occupied_state() {
        let mut ctl = started(MockHost::new(2, 2, 4), Config::default());
        ctl.host().active.set(3);
        ctl.host().windows.borrow_mut().push(WindowInfo::on_workspace(1));
        ctl.handle(HostEvent::ActiveWorkspaceChanged).unwrap();
        // Nothing changes until the idle callback runs.
        assert_eq!(cells(&ctl).active_index(), Some(0));
        run_idle(&mut ctl);
        let grid = cells(&ctl);
        assert_eq!(grid.active_index(), Some(3));
        assert_eq!(grid.cell(1).unwrap().state, CellState::Occupied);
    }

    #[test]
    fn workspace_added_resubscribes_and_rebuilds() {
        let mut ctl = started(MockHost::new(1, 3, 2), Config::default());
        assert_eq!(ctl.host().live_on(SignalSource::Workspace(2)), 0);

        ctl.host().count.set(3);
        ctl.handle(HostEvent::WorkspaceAdded(2)).unwrap();
        assert_eq!(ctl.host().live_on(SignalSource::Workspace(2)), 2);
        assert_eq!(ctl.subscription_count(), ctl.host().live.borrow().len());

        run_idle(&mut ctl);
        let grid = cells(&ctl);
        assert_eq!(grid.cell(2).unwrap().state, CellState::Inactive);
    }

    #[test]
    fn workspace_removed_drops_stale_subscriptions() {
        let mut ctl = started(MockHost::new(1, 3, 3), Config::default());
        ctl.host().count.set(2);
        ctl.handle(HostEvent::WorkspaceRemoved(2)).unwrap();
        assert_eq!(ctl.host().live_on(SignalSource::Workspace(2)), 0);
        assert_eq!(ctl.host().live_on(SignalSource::Workspace(1)), 2);
        run_idle(&mut ctl);
        assert_eq!(cells(&ctl).cell(2).unwrap().state, CellState::Absent);
    }

    #[test]
    fn allocation_change_rebuilds_geometry() {
        let mut ctl = started(MockHost::new(1, 1, 1), Config::default());
        ctl.host().allocation.set(Allocation::square(40.0));
        ctl.handle(HostEvent::AllocationChanged).unwrap();
        run_idle(&mut ctl);
        assert_eq!(cells(&ctl).size(), (40, 40));
    }

    #[test]
    fn theme_change_is_replaced_and_classified() {
        let mut ctl = started(MockHost::new(1, 2, 2), Config::default());

        let recolor = ThemeConfig {
            active_fill: "red".into(),
            ..ThemeConfig::default()
        };
        ctl.handle(HostEvent::ThemeChanged(recolor)).unwrap();
        assert!(ctl.is_update_pending());
        assert!(!ctl.is_rebuild_pending());
        run_idle(&mut ctl);
        assert_eq!(ctl.theme().active_fill, "red");
        assert_eq!(cells(&ctl).cell(0).unwrap().style.fill.as_deref(), Some("red"));

        let reshape = ThemeConfig {
            cell_shape: CellShape::Square,
            ..ctl.theme().clone()
        };
        ctl.handle(HostEvent::ThemeChanged(reshape)).unwrap();
        assert!(ctl.is_rebuild_pending());
        run_idle(&mut ctl);
        assert_eq!(cells(&ctl).cell(0).unwrap().style.corner_radius, 0.0);
    }

    #[test]
    fn identical_theme_schedules_nothing() {
        let mut ctl = started(MockHost::new(1, 2, 2), Config::default());
        ctl.handle(HostEvent::ThemeChanged(ThemeConfig::default())).unwrap();
        assert_eq!(ctl.host().scheduled.get(), 0);
    }

    #[test]
    fn icon_backend_renders_svg() {
        let ctl = started(MockHost::new(2, 2, 4), icon_config());
        match ctl.output() {
            Some(RenderOutput::Icon(icon)) => {
                assert_eq!((icon.width(), icon.height()), (30, 30));
                assert_eq!(icon.as_str().matches("<circle").count(), 4);
            }
            other => panic!("expected icon output, got {:?}", other),
        }
    }

    #[test]
    fn icon_failure_keeps_last_good_render() {
        let mut ctl = started(MockHost::new(2, 2, 4), icon_config());
        let good = match ctl.output() {
            Some(RenderOutput::Icon(icon)) => icon.clone(),
            other => panic!("expected icon output, got {:?}", other),
        };

        let broken = ThemeConfig {
            active_fill: "<script>".into(),
            ..ThemeConfig::default()
        };
        ctl.handle(HostEvent::ThemeChanged(broken)).unwrap();
        ctl.host().active.set(2);
        ctl.handle(HostEvent::ActiveWorkspaceChanged).unwrap();
        run_idle(&mut ctl);

        assert_eq!(ctl.stats().icon_failures, 1);
        assert_eq!(ctl.output(), Some(RenderOutput::Icon(&good)));
    }

    #[test]
    fn scroll_activates_workspace() {
        let mut ctl = started(MockHost::new(1, 4, 4), Config::default());
        ctl.host().active.set(1);
        assert_eq!(ctl.scroll(ScrollInput::Down).unwrap(), Some(2));
        assert_eq!(ctl.scroll(ScrollInput::Smooth { delta_y: 0.5 }).unwrap(), None);
        assert_eq!(*ctl.host().activations.borrow(), vec![2]);
    }

    #[test]
    fn scroll_policy_comes_from_config() {
        let wrap = Config {
            indicator: IndicatorConfig {
                scroll_policy: ScrollPolicy::Wrap,
                ..IndicatorConfig::default()
            },
            ..Config::default()
        };
        let mut ctl = started(MockHost::new(1, 4, 4), wrap);
        ctl.host().active.set(3);
        assert_eq!(ctl.scroll(ScrollInput::Down).unwrap(), Some(0));

        let mut clamp = started(MockHost::new(1, 4, 4), Config::default());
        clamp.host().active.set(3);
        assert_eq!(clamp.scroll(ScrollInput::Down).unwrap(), None);
        assert!(clamp.host().activations.borrow().is_empty());
    }

    #[test]
    fn click_opens_preferences() {
        let ctl = started(MockHost::new(1, 1, 1), Config::default());
        ctl.activate().unwrap();
        assert_eq!(ctl.host().preferences_opened.get(), 1);
    }

    #[test]
    fn destroy_releases_everything() {
        let mut ctl = started(MockHost::new(2, 2, 4), Config::default());
        ctl.handle(HostEvent::LayoutChanged).unwrap();
        let stale = *ctl.host().idle_queue.borrow().first().unwrap();
        let rebuilds = ctl.stats().rebuilds;

        ctl.destroy();
        assert!(ctl.host().live.borrow().is_empty());
        assert!(ctl.host().idle_queue.borrow().is_empty());
        assert_eq!(ctl.subscription_count(), 0);

        // A host that ignores the cancellation still cannot run the pass.
        ctl.on_idle(stale);
        run_idle(&mut ctl);
        assert_eq!(ctl.stats().rebuilds, rebuilds);
    }

    #[test]
    fn destroy_is_idempotent_and_blocks_further_use() {
        let mut ctl = started(MockHost::new(1, 2, 2), Config::default());
        ctl.destroy();
        ctl.destroy();
        assert!(ctl.is_destroyed());
        assert!(matches!(
            ctl.handle(HostEvent::ActiveWorkspaceChanged),
            Err(ControllerError::Destroyed)
        ));
        assert!(matches!(ctl.scroll(ScrollInput::Down), Err(ControllerError::Destroyed)));
        assert!(matches!(ctl.start(), Err(ControllerError::Destroyed)));
        assert_eq!(ctl.host().scheduled.get(), 0);
    }

    #[test]
    fn failed_subscription_is_reported_and_cleaned_up() {
        let host = MockHost::new(1, 2, 2);
        host.fail_connect.set(true);
        let mut ctl = ReconciliationController::new(host, Config::default());
        assert!(matches!(ctl.start(), Err(ControllerError::Host(_))));
        assert!(ctl.host().live.borrow().is_empty());
        assert_eq!(ctl.subscription_count(), 0);
        assert!(ctl.output().is_none());
    }

    #[test]
    fn start_can_be_retried_after_a_failed_subscription() {
        let host = MockHost::new(1, 2, 2);
        host.fail_connect.set(true);
        let mut ctl = ReconciliationController::new(host, Config::default());
        assert!(ctl.start().is_err());

        ctl.host().fail_connect.set(false);
        ctl.start().unwrap();
        // 4 manager + 2 display + 1 settings + 2 per workspace.
        assert_eq!(ctl.subscription_count(), 11);
        assert_eq!(ctl.host().live.borrow().len(), 11);
        assert_eq!(ctl.stats().rebuilds, 1);
        assert_eq!(cells(&ctl).cells().len(), 2);
    }

    #[test]
    fn workspace_added_rebuilds_even_if_resubscription_fails() {
        let mut ctl = started(MockHost::new(1, 3, 2), Config::default());
        ctl.host().count.set(3);
        ctl.host().fail_connect.set(true);

        assert!(matches!(
            ctl.handle(HostEvent::WorkspaceAdded(2)),
            Err(ControllerError::Host(_))
        ));
        assert!(ctl.is_rebuild_pending());
        assert_eq!(ctl.host().live_on(SignalSource::WorkspaceManager), 4);

        run_idle(&mut ctl);
        assert_eq!(cells(&ctl).cell(2).unwrap().state, CellState::Inactive);
    }

    #[test]
    fn unknown_idle_id_is_ignored() {
        let mut ctl = started(MockHost::new(1, 2, 2), Config::default());
        let before = ctl.stats();
        ctl.on_idle(IdleId(9999));
        assert_eq!(ctl.stats(), before);
    }
}
