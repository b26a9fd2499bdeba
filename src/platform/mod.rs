//! The interface between the decorations and the compositor hosting them.
//!
//! The core never owns windows or monitors. It knows them by handle, and
//! resolves handles through the [`Host`] trait on every use. The host answers
//! with a snapshot of the object ([`WindowState`], [`MonitorState`]) or with
//! [`Expired`](crate::core::Expired) if the object is gone.
//!
//! ## The `Host` trait
//!
//! `Host` has two halves:
//!
//! - Queries: window and monitor state, focus, what is under the cursor,
//!   and whether input is currently grabbed by something else.
//! - Requests: reposition or relayout a window, damage a region, dispatch a
//!   [`WmCommand`], run a shell command, and queue a decoration for rendering.
//!
//! Requests are fire-and-forget. The host is free to act on them immediately
//! or batch them until the end of the frame.
//!
//! ## Positioning
//!
//! Decorations take part in the host's positioning protocol: each one
//! declares a [`PositioningInfo`], and the host replies with the box it
//! assigned to the decoration, which the registry passes on through
//! [`DecorationRegistry::assign_box`](crate::manager::DecorationRegistry::assign_box).

use std::fmt::Debug;
use std::time::Instant;

use strum::Display;

use crate::config::RuleSource;
use crate::core::{DecorationId, Lookup, MonitorId, WindowId};
use crate::types::{Extents, Logical, Point, Rectangle, Scale, Size};

/// A host that does not need a compositor, for testing.
pub mod dummy;

#[doc(inline)]
pub use dummy::DummyHost;

/// A snapshot of a window, as the host sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    /// The position of the window body in the global coordinate space.
    pub position: Point<f64, Logical>,
    /// The size of the window body.
    pub size: Size<f64, Logical>,
    /// The window title.
    pub title: String,
    /// The application id, used to find the app icon.
    pub app_id: String,
    /// The monitor the window is on, if any.
    pub monitor: Option<MonitorId>,
    /// Whether the workspace of the window is currently visible.
    pub workspace_visible: bool,
    /// The render offset of the window's workspace, e.g. during a
    /// workspace switch animation.
    pub workspace_offset: Point<f64, Logical>,
    /// Whether the window is pinned to every workspace.
    pub pinned: bool,
    /// Whether the window is floating.
    pub floating: bool,
    /// Whether the window is mapped.
    pub mapped: bool,
    /// Whether the window is hidden.
    pub hidden: bool,
    /// Whether the host's rules allow this window to be decorated.
    pub decorate: bool,
    /// Whether the window asked not to have borders or decorations.
    pub refuses_borders: bool,
    /// Corner rounding of the window, in logical pixels.
    pub rounding: f64,
    /// Exponent of the window's corner curve.
    pub rounding_power: f32,
    /// Border width of the window, in logical pixels.
    pub border_size: f64,
}

impl Default for WindowState {
    fn default() -> Self {
        WindowState {
            position: Point::zeroed(),
            size: Size::zeroed(),
            title: String::new(),
            app_id: String::new(),
            monitor: None,
            workspace_visible: true,
            workspace_offset: Point::zeroed(),
            pinned: false,
            floating: false,
            mapped: true,
            hidden: false,
            decorate: true,
            refuses_borders: false,
            rounding: 0.,
            rounding_power: 2.,
            border_size: 0.,
        }
    }
}

impl WindowState {
    /// Whether the window exists on screen and can be interacted with.
    pub fn valid_mapped(&self) -> bool {
        self.mapped && !self.hidden
    }
}

/// A snapshot of a monitor, as the host sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorState {
    /// The position of the monitor in the global coordinate space.
    pub position: Point<f64, Logical>,
    /// The logical size of the monitor.
    pub size: Size<f64, Logical>,
    /// The scale of the monitor.
    pub scale: Scale,
    /// The connector name of the monitor.
    pub name: String,
}

/// A window management command the decorations ask the host to carry out.
///
/// Commands always apply to the window the decoration belongs to.
#[derive(Debug, Clone, PartialEq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WmCommand {
    /// Give the window keyboard focus.
    Focus,
    /// Raise the window to the top of its layer.
    Raise,
    /// Start (`true`) or stop (`false`) an interactive, pointer-driven move.
    InteractiveMove(bool),
    /// Make the window floating.
    SetFloating,
    /// Put the window back under tiling.
    SetTiled,
    /// Pin the window to every workspace.
    Pin,
    /// Unpin the window.
    Unpin,
    /// Resize the window to a percentage of its monitor.
    ResizeExact {
        /// Width, in percent of the monitor width.
        width_pct: u32,
        /// Height, in percent of the monitor height.
        height_pct: u32,
    },
    /// Move the window body to an exact global position.
    MoveExact(Point<i32, Logical>),
}

/// How the host should attach a decoration to its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PositionPolicy {
    /// Positioned at a fixed place, not following the window.
    Absolute,
    /// Follows the window as it moves.
    Sticky,
}

bitflags! {
    /// The window edges a decoration occupies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Edges: u8 {
        /// The top edge.
        const TOP    = 1 << 0;
        /// The bottom edge.
        const BOTTOM = 1 << 1;
        /// The left edge.
        const LEFT   = 1 << 2;
        /// The right edge.
        const RIGHT  = 1 << 3;
    }
}

bitflags! {
    /// Properties of a decoration the host needs to know about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DecorationFlags: u8 {
        /// The decoration wants pointer and touch input.
        const ALLOWS_MOUSE_INPUT  = 1 << 0;
        /// The decoration counts as part of the window, e.g. for
        /// screenshots and window snapping.
        const PART_OF_MAIN_WINDOW = 1 << 1;
    }
}

/// Where a decoration is drawn relative to its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DecorationLayer {
    /// Under the window body.
    Under,
    /// Over the window body.
    Over,
}

/// What a decoration asks of the host's positioner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositioningInfo {
    /// How the decoration follows its window.
    pub policy: PositionPolicy,
    /// The edges the decoration occupies.
    pub edges: Edges,
    /// Ordering among decorations on the same edges; higher is closer to the window.
    pub priority: u32,
    /// Whether the space is reserved, pushing the window body inwards.
    pub reserved: bool,
    /// The space wanted on each edge.
    pub desired: Extents,
}

/// The compositor hosting the decorations.
///
/// See the module-level documentation for details.
pub trait Host: RuleSource + Debug {
    /// Resolves a window handle.
    fn window(&self, id: WindowId) -> Lookup<WindowState>;

    /// Resolves a monitor handle.
    fn monitor(&self, id: MonitorId) -> Lookup<MonitorState>;

    /// Every window currently managed, in stacking order.
    fn windows(&self) -> Vec<WindowId>;

    /// The window with keyboard focus.
    fn focused_window(&self) -> Option<WindowId>;

    /// The monitor with focus.
    fn focused_monitor(&self) -> Option<MonitorId>;

    /// Finds a monitor by its connector name.
    fn monitor_by_name(&self, name: &str) -> Option<MonitorId>;

    /// The topmost window under a global position, decorations included.
    fn window_at(&self, point: Point<f64, Logical>) -> Option<WindowId>;

    /// Whether a top or overlay layer surface is under a global position.
    fn layer_surface_at(&self, point: Point<f64, Logical>) -> bool;

    /// Whether an exclusive layer surface or a seat grab currently keeps
    /// input from reaching `window`.
    fn input_grabbed(&self, window: WindowId) -> bool;

    /// Whether blur is enabled globally.
    fn global_blur_enabled(&self) -> bool;

    /// The current time, as the host's animations see it.
    fn now(&self) -> Instant;

    /// Asks the host to run the positioner for the decorations of `window`.
    fn reposition(&mut self, window: WindowId);

    /// Asks the host to lay out `window` again.
    fn relayout(&mut self, window: WindowId);

    /// Marks a global region as needing a repaint.
    fn damage(&mut self, region: Rectangle<f64, Logical>);

    /// Carries out a window management command on `window`.
    fn dispatch(&mut self, window: WindowId, command: WmCommand);

    /// Runs a shell command.
    fn exec(&mut self, command: &str);

    /// Queues a render pass of `decoration` for the current frame.
    fn queue_render(&mut self, decoration: DecorationId, alpha: f32);
}
