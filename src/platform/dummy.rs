use std::collections::HashMap;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::config::{RuleKey, RuleSource};
use crate::core::{DecorationId, Expired, Lookup, MonitorId, WindowId};
use crate::types::{Logical, Point, Rectangle, Scale, Size};

use super::{Host, MonitorState, WindowState, WmCommand};

/// A request the decorations made of a [`DummyHost`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Reposition(WindowId),
    Relayout(WindowId),
    Damage(Rectangle<f64, Logical>),
    Dispatch(WindowId, WmCommand),
    Exec(String),
    QueueRender(DecorationId, f32),
}

/// A dummy host implementing [`Host`] without any compositor behind it,
/// and should mainly be used for testing.
///
/// `DummyHost` keeps an internal store of windows and monitors that tests
/// fill in and mutate directly, and records every request the decorations
/// make so tests can inspect them. Its clock only moves when told to.
#[derive(Debug)]
pub struct DummyHost {
    windows: IndexMap<WindowId, WindowState>,
    monitors: IndexMap<MonitorId, MonitorState>,
    rules: HashMap<(WindowId, RuleKey), String>,
    focused: Option<WindowId>,
    focused_monitor: Option<MonitorId>,
    pointer_window: Option<WindowId>,
    /// Whether a layer surface sits under every point.
    pub layer_surface: bool,
    /// Whether input is grabbed away from every window.
    pub grabbed: bool,
    /// Whether blur is enabled globally.
    pub blur: bool,
    now: Instant,
    requests: Vec<Request>,
}

impl Default for DummyHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyHost {
    /// Creates a new, empty DummyHost.
    pub fn new() -> Self {
        Self {
            windows: IndexMap::new(),
            monitors: IndexMap::new(),
            rules: HashMap::new(),
            focused: None,
            focused_monitor: None,
            pointer_window: None,
            layer_surface: false,
            grabbed: false,
            blur: true,
            now: Instant::now(),
            requests: Vec::new(),
        }
    }

    /// Adds a window, or replaces the state of an existing one.
    pub fn add_window(&mut self, id: WindowId, state: WindowState) {
        self.windows.insert(id, state);
    }

    /// Removes a window. Its handle expires.
    pub fn remove_window(&mut self, id: WindowId) -> Option<WindowState> {
        if self.focused == Some(id) {
            self.focused = None;
        }
        self.windows.shift_remove(&id)
    }

    /// Mutable access to the state of a window.
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowState> {
        self.windows.get_mut(&id)
    }

    /// Adds a monitor. The first monitor added gets focus.
    pub fn add_monitor(&mut self, id: MonitorId, state: MonitorState) {
        self.monitors.insert(id, state);
        self.focused_monitor.get_or_insert(id);
    }

    /// A 1920x1080 monitor at the origin, with the given scale.
    pub fn simple_monitor(name: &str, scale: f64) -> MonitorState {
        MonitorState {
            position: Point::zeroed(),
            size: Size::new(1920., 1080.),
            scale: Scale(scale),
            name: name.into(),
        }
    }

    /// Sets a window rule.
    pub fn set_rule<S: Into<String>>(&mut self, window: WindowId, key: RuleKey, value: S) {
        self.rules.insert((window, key), value.into());
    }

    /// Clears a window rule.
    pub fn clear_rule(&mut self, window: WindowId, key: RuleKey) {
        self.rules.remove(&(window, key));
    }

    /// Gives focus to a window.
    pub fn focus(&mut self, window: Option<WindowId>) {
        self.focused = window;
    }

    /// Overrides which window [`Host::window_at`] reports.
    ///
    /// By default the topmost window containing the point is reported,
    /// without accounting for decorations.
    pub fn set_pointer_window(&mut self, window: Option<WindowId>) {
        self.pointer_window = window;
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Every request made so far.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Takes every request made so far, clearing the record.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    /// The window management commands dispatched so far.
    pub fn commands(&self) -> Vec<(WindowId, WmCommand)> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                Request::Dispatch(id, cmd) => Some((*id, cmd.clone())),
                _ => None,
            })
            .collect()
    }

    /// The shell commands run so far.
    pub fn execs(&self) -> Vec<String> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                Request::Exec(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any region was damaged so far.
    pub fn damaged(&self) -> bool {
        self.requests.iter().any(|r| matches!(r, Request::Damage(_)))
    }
}

impl RuleSource for DummyHost {
    fn rule(&self, window: WindowId, key: RuleKey) -> Option<String> {
        self.rules.get(&(window, key)).cloned()
    }
}

impl Host for DummyHost {
    fn window(&self, id: WindowId) -> Lookup<WindowState> {
        self.windows.get(&id).cloned().ok_or(Expired::window(id))
    }

    fn monitor(&self, id: MonitorId) -> Lookup<MonitorState> {
        self.monitors.get(&id).cloned().ok_or(Expired::monitor(id))
    }

    fn windows(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    fn focused_window(&self) -> Option<WindowId> {
        self.focused
    }

    fn focused_monitor(&self) -> Option<MonitorId> {
        self.focused_monitor
    }

    fn monitor_by_name(&self, name: &str) -> Option<MonitorId> {
        self.monitors
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(id, _)| *id)
    }

    fn window_at(&self, point: Point<f64, Logical>) -> Option<WindowId> {
        if self.pointer_window.is_some() {
            return self.pointer_window
        }
        self.windows
            .iter()
            .rev()
            .find(|(_, w)| Rectangle { point: w.position, size: w.size }.contains_point(point))
            .map(|(id, _)| *id)
    }

    fn layer_surface_at(&self, _: Point<f64, Logical>) -> bool {
        self.layer_surface
    }

    fn input_grabbed(&self, _: WindowId) -> bool {
        self.grabbed
    }

    fn global_blur_enabled(&self) -> bool {
        self.blur
    }

    fn now(&self) -> Instant {
        self.now
    }

    fn reposition(&mut self, window: WindowId) {
        self.requests.push(Request::Reposition(window));
    }

    fn relayout(&mut self, window: WindowId) {
        self.requests.push(Request::Relayout(window));
    }

    fn damage(&mut self, region: Rectangle<f64, Logical>) {
        self.requests.push(Request::Damage(region));
    }

    fn dispatch(&mut self, window: WindowId, command: WmCommand) {
        self.requests.push(Request::Dispatch(window, command));
    }

    fn exec(&mut self, command: &str) {
        self.requests.push(Request::Exec(command.into()));
    }

    fn queue_render(&mut self, decoration: DecorationId, alpha: f32) {
        self.requests.push(Request::QueueRender(decoration, alpha));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_handles_expire() {
        let mut host = DummyHost::new();
        let id = WindowId::new(1);
        host.add_window(id, WindowState::default());
        assert!(host.window(id).is_ok());

        host.remove_window(id);
        assert_eq!(host.window(id), Err(Expired::window(id)));
        assert!(host.monitor(MonitorId::new(9)).is_err());
    }

    #[test]
    fn test_window_at_prefers_topmost() {
        let mut host = DummyHost::new();
        let (a, b) = (WindowId::new(1), WindowId::new(2));
        let at = |x, y, w, h| WindowState {
            position: Point::new(x, y),
            size: Size::new(w, h),
            ..WindowState::default()
        };
        host.add_window(a, at(0., 0., 100., 100.));
        host.add_window(b, at(50., 50., 100., 100.));

        assert_eq!(host.window_at(Point::new(10., 10.)), Some(a));
        assert_eq!(host.window_at(Point::new(60., 60.)), Some(b));
        assert_eq!(host.window_at(Point::new(500., 500.)), None);

        host.set_pointer_window(Some(a));
        assert_eq!(host.window_at(Point::new(60., 60.)), Some(a));
    }
}
