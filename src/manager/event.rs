use std::time::Instant;

use strum::{Display, EnumDiscriminants};

use crate::config::BarConfig;
use crate::core::{MonitorId, WindowId};
use crate::types::{Logical, Point};

/// Events the host delivers to the decorations.
///
/// Every event has a kind, [`EventKind`], that hooks are registered
/// against in an [`EventBus`](super::EventBus).
#[derive(Debug, Clone, EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(Hash, Display))]
#[strum_discriminants(doc = "The kind of a [`HostEvent`], used to register hooks.")]
pub enum HostEvent {
    /// A window was opened and mapped.
    WindowOpened(WindowId),
    /// A window was closed. Its handle is about to expire.
    WindowClosed(WindowId),
    /// The rules of a window were evaluated again.
    WindowRulesUpdated(WindowId),
    /// Keyboard focus moved.
    FocusChanged(Option<WindowId>),
    /// The active workspace of a monitor changed.
    WorkspaceChanged(MonitorId),
    /// The configuration is about to be reloaded.
    PreConfigReload,
    /// A button declaration was read from the configuration.
    ButtonDeclared(String),
    /// The configuration was reloaded.
    ConfigReloaded(Box<BarConfig>),
    /// A pointer button was pressed or released.
    PointerButton {
        /// Whether the button went down.
        pressed: bool,
        /// The global position of the pointer.
        position: Point<f64, Logical>,
        /// When the event happened.
        time: Instant,
    },
    /// The pointer moved.
    PointerMotion {
        /// The new global position of the pointer.
        position: Point<f64, Logical>,
    },
    /// A touch point went down.
    TouchDown {
        /// The touch point.
        id: i32,
        /// The position in the output, normalized to `0.0..=1.0` on each axis.
        position: Point<f64, Logical>,
        /// The output the touch device is bound to, if any.
        output: Option<String>,
        /// When the event happened.
        time: Instant,
    },
    /// A touch point went up.
    TouchUp {
        /// The touch point.
        id: i32,
    },
    /// A touch point moved.
    TouchMotion {
        /// The touch point.
        id: i32,
        /// The position in the output, normalized to `0.0..=1.0` on each axis.
        position: Point<f64, Logical>,
    },
}

impl HostEvent {
    /// Whether this is an input event.
    pub fn is_input(&self) -> bool {
        matches!(
            EventKind::from(self),
            EventKind::PointerButton
                | EventKind::PointerMotion
                | EventKind::TouchDown
                | EventKind::TouchUp
                | EventKind::TouchMotion
        )
    }
}
