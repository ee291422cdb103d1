//! **wsgrid**: a workspace-grid indicator engine for desktop panels.
//!
//! The host's workspaces are drawn as a `rows × columns` grid of cells.
//! Each cell shows whether its workspace is active, holds windows, or does
//! not exist yet.  Scrolling over the widget switches workspaces.
//!
//! # Architecture
//!
//! The crate is organised around one trait and one orchestrator:
//!
//! * [`host::WorkspaceHost`] abstracts the desktop shell: workspace state,
//!   workspace activation, signal subscriptions and idle scheduling.  No
//!   toolkit or compositor is assumed.
//! * [`reconcile::ReconciliationController`] turns host notifications into
//!   coalesced render passes over one of two backends: a cell grid
//!   ([`grid`]) or a single SVG icon ([`icon`]).
//!
//! The pure parts ([`geometry`], [`snapshot`], [`scroll`]) have no host
//! dependency.  A GTK4 widget for the cell grid lives in [`visualizer`]
//! behind the `widget-gtk` feature.

pub mod config;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod host;
pub mod icon;
pub mod reconcile;
pub mod scroll;
pub mod snapshot;
pub mod visualizer;
