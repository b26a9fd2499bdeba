//! The input gesture state machine of a single decoration.
//!
//! The [`GestureController`] turns raw pointer and touch events, already
//! classified into a [`Hit`], into high level [`Action`]s for the decoration
//! to carry out. It holds no references to the window; everything it needs to
//! know about the window at the time of an event is passed in as a
//! [`GestureEnv`].
//!
//! ## States
//!
//! - `Idle`: nothing is happening. A pressed button is tracked in this state.
//! - `DownPendingDoubleClick`: the background was pressed; the next move starts
//!   a drag, and a second press soon enough runs the double click command.
//! - `Dragging`: the window is being moved.
//! - `TouchTracking`: like `DownPendingDoubleClick`, for a touch point.
//!
//! A drag begins on the very first move after a press; there is no distance
//! threshold.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::types::{ButtonSet, Logical, Point};

use super::hit::Hit;

/// Two presses on the background closer together than this are a double click.
pub const DOUBLE_CLICK_THRESHOLD: Duration = Duration::from_millis(400);

/// The input device that drives a drag.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Pointer,
    Touch,
}

/// An observable summary of the controller state.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    Idle,
    DownPendingDoubleClick,
    Dragging,
    TouchTracking,
}

/// Something the decoration should do in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Give the owning window keyboard focus.
    Focus,
    /// Raise the owning window to the top of its layer.
    Raise,
    /// Start moving the window.
    BeginDrag(InputSource),
    /// Keep moving the window; carries the global position of the input.
    ContinueDrag(InputSource, Point<f64, Logical>),
    /// Stop moving the window.
    EndDrag(InputSource),
    /// Make the window floating.
    SetFloating,
    /// Resize the window to a percentage of the monitor.
    ResizeTo {
        /// Width in percent of the monitor width.
        width_pct: u32,
        /// Height in percent of the monitor height.
        height_pct: u32,
    },
    /// Pin the window to every workspace.
    Pin,
    /// Unpin the window.
    Unpin,
    /// Put the window back under tiling.
    SetTiled,
    /// Run a shell command.
    RunCommand(String),
    /// The pressed button changed; the button row must be redrawn.
    PressedChanged(Option<usize>),
    /// The hovered button changed; the button row must be redrawn.
    HoverChanged,
}

/// What the controller needs to know about the owning window for one event.
#[derive(Debug, Clone, Copy)]
pub struct GestureEnv<'a> {
    /// Whether the owning window still exists and is mapped.
    pub owner_valid: bool,
    /// Whether the owning window has focus.
    pub owner_focused: bool,
    /// Whether the owning window is floating.
    pub owner_floating: bool,
    /// The configured double click command.
    pub double_click: Option<&'a str>,
    /// The commands of the buttons, in layout order.
    pub button_commands: &'a [&'a str],
}

/// Whether the host should stop processing an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventInfo {
    /// Set when the decoration consumed the event.
    pub consumed: bool,
}

impl EventInfo {
    /// Marks the event as consumed.
    pub fn consume(&mut self) {
        self.consumed = true;
    }
}

/// The gesture state of one decoration.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    touch_active: bool,
    touch_id: Option<i32>,
    drag_pending: bool,
    dragging: bool,
    pressed_button: Option<usize>,
    last_press: Option<Instant>,
    cancelled_down: bool,
    hover: ButtonSet,
}

impl GestureController {
    /// Creates an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current phase.
    pub fn phase(&self) -> GesturePhase {
        if self.dragging {
            GesturePhase::Dragging
        } else if self.drag_pending && self.touch_active {
            GesturePhase::TouchTracking
        } else if self.drag_pending {
            GesturePhase::DownPendingDoubleClick
        } else {
            GesturePhase::Idle
        }
    }

    /// The button currently held down, if any.
    pub fn pressed_button(&self) -> Option<usize> {
        self.pressed_button
    }

    /// Whether button `idx` is hovered.
    pub fn is_hovered(&self, idx: usize) -> bool {
        self.hover.contains(idx)
    }

    /// Whether the window is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether `id` is the touch point that pressed the bar.
    pub fn tracks_touch(&self, id: i32) -> bool {
        self.touch_id == Some(id)
    }

    /// Whether a drag is armed or in progress.
    pub fn is_busy(&self) -> bool {
        self.dragging || self.drag_pending
    }

    /// The source of the current or armed drag.
    fn source(&self) -> InputSource {
        if self.touch_active { InputSource::Touch } else { InputSource::Pointer }
    }

    /// Forgets any drag, returning the actions needed to finish it.
    fn finish_drag(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.dragging {
            let source = self.source();
            actions.push(Action::EndDrag(source));
            if source == InputSource::Touch {
                actions.push(Action::SetTiled);
                actions.push(Action::Unpin);
            }
        }
        self.dragging = false;
        self.drag_pending = false;
        self.touch_active = false;
        self.touch_id = None;
        actions
    }

    fn down(&mut self, hit: Hit, time: Instant, env: &GestureEnv<'_>, info: &mut EventInfo) -> Vec<Action> {
        if !hit.on_bar() {
            // a press off the bar while a drag is armed or running abandons it
            return self.finish_drag()
        }

        info.consume();
        self.cancelled_down = true;

        let mut actions = Vec::new();
        if !env.owner_focused {
            actions.push(Action::Focus);
        }
        if env.owner_floating {
            actions.push(Action::Raise);
        }

        if let Hit::Button(idx) = hit {
            trace!(idx, "button pressed");
            self.pressed_button = Some(idx);
            actions.push(Action::PressedChanged(Some(idx)));
            return actions
        }

        let double = match (env.double_click, self.last_press) {
            (Some(_), Some(last)) => time.saturating_duration_since(last) < DOUBLE_CLICK_THRESHOLD,
            _ => false,
        };

        match env.double_click {
            Some(cmd) if double => {
                trace!("double click");
                actions.push(Action::RunCommand(cmd.to_string()));
                self.drag_pending = false;
            }
            _ => {
                self.last_press = Some(time);
                self.drag_pending = true;
            }
        }

        actions
    }

    fn up(&mut self, hit: Hit, env: &GestureEnv<'_>, info: &mut EventInfo) -> Vec<Action> {
        if !env.owner_focused {
            trace!("ignoring release on an unfocused window");
            return Vec::new()
        }

        if self.cancelled_down {
            info.consume();
        }

        let mut actions = self.finish_drag();
        self.cancelled_down = false;

        if let Some(pressed) = self.pressed_button.take() {
            actions.push(Action::PressedChanged(None));
            if hit.button() == Some(pressed) {
                if let Some(cmd) = env.button_commands.get(pressed) {
                    actions.push(Action::RunCommand(cmd.to_string()));
                }
            }
        }

        actions
    }

    /// Handles a pointer button press.
    ///
    /// Presses off the bar pass through untouched unless a drag is armed.
    pub fn button_down(
        &mut self,
        hit: Hit,
        time: Instant,
        env: &GestureEnv<'_>,
        info: &mut EventInfo,
    ) -> Vec<Action> {
        if !env.owner_valid {
            return Vec::new()
        }
        if !hit.on_bar() && !self.is_busy() {
            return Vec::new()
        }
        self.down(hit, time, env, info)
    }

    /// Handles a pointer button release.
    pub fn button_up(&mut self, hit: Hit, env: &GestureEnv<'_>, info: &mut EventInfo) -> Vec<Action> {
        if !env.owner_valid {
            return Vec::new()
        }
        if !hit.on_bar() && !self.is_busy() && self.pressed_button.is_none() {
            return Vec::new()
        }
        self.up(hit, env, info)
    }

    /// Handles pointer motion.
    ///
    /// Updates hover state, starts a drag if one is armed, and continues a
    /// running drag.
    pub fn pointer_motion(
        &mut self,
        hit: Hit,
        position: Point<f64, Logical>,
        env: &GestureEnv<'_>,
    ) -> Vec<Action> {
        if self.touch_active || !env.owner_valid {
            return Vec::new()
        }

        let mut actions = Vec::new();
        if self.update_hover(hit, env.button_commands.len()) {
            actions.push(Action::HoverChanged);
        }

        if self.drag_pending {
            trace!("pointer drag started");
            self.drag_pending = false;
            self.dragging = true;
            actions.push(Action::BeginDrag(InputSource::Pointer));
        } else if self.dragging {
            actions.push(Action::ContinueDrag(InputSource::Pointer, position));
        }

        actions
    }

    fn update_hover(&mut self, hit: Hit, buttons: usize) -> bool {
        let mut changed = false;
        for idx in 0..buttons.min(ButtonSet::CAPACITY) {
            let changed_here = if hit.button() == Some(idx) {
                self.hover.insert(idx)
            } else {
                self.hover.remove(idx)
            };
            changed |= changed_here;
        }
        changed
    }

    /// Clears hover state, returning whether anything was hovered.
    pub fn clear_hover(&mut self) -> bool {
        let had = !self.hover.is_empty();
        self.hover.clear();
        had
    }

    /// Handles a touch point going down.
    ///
    /// Only one touch point is tracked at a time.
    pub fn touch_down(
        &mut self,
        id: i32,
        hit: Hit,
        time: Instant,
        env: &GestureEnv<'_>,
        info: &mut EventInfo,
    ) -> Vec<Action> {
        if !env.owner_valid {
            return Vec::new()
        }
        if self.touch_id.is_some_and(|tracked| tracked != id) {
            trace!(id, "ignoring a second touch point");
            return Vec::new()
        }
        if !hit.on_bar() && !self.is_busy() {
            return Vec::new()
        }

        let actions = self.down(hit, time, env, info);
        if hit.on_bar() {
            self.touch_id = Some(id);
            self.touch_active = self.drag_pending;
        }
        actions
    }

    /// Handles a touch point going up.
    pub fn touch_up(&mut self, id: i32, hit: Hit, env: &GestureEnv<'_>, info: &mut EventInfo) -> Vec<Action> {
        if !env.owner_valid {
            return Vec::new()
        }
        if !self.tracks_touch(id) {
            return Vec::new()
        }
        self.up(hit, env, info)
    }

    /// Handles touch motion; `position` is the global position of the touch point.
    ///
    /// The first move of a touch drag floats the window, shrinks it to half
    /// the monitor and pins it, so it can be carried across workspaces.
    pub fn touch_motion(&mut self, id: i32, position: Point<f64, Logical>, env: &GestureEnv<'_>) -> Vec<Action> {
        if !self.touch_active || self.touch_id != Some(id) || !env.owner_valid {
            return Vec::new()
        }

        let mut actions = Vec::new();
        if self.drag_pending {
            trace!("touch drag started");
            self.drag_pending = false;
            self.dragging = true;
            actions.extend([
                Action::BeginDrag(InputSource::Touch),
                Action::SetFloating,
                Action::ResizeTo { width_pct: 50, height_pct: 50 },
                Action::Pin,
            ]);
        }
        if self.dragging {
            actions.push(Action::ContinueDrag(InputSource::Touch, position));
        }
        actions
    }

    /// Silently drops every in-progress gesture.
    ///
    /// Used when the owning window goes away; no actions are emitted because
    /// there is no longer a window to act on.
    pub fn reset(&mut self) {
        let hover = self.hover;
        *self = Self {
            hover,
            ..Self::default()
        };
    }
}
