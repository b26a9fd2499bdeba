use std::collections::HashMap;

use tracing::trace;

use crate::core::EventInfo;
use crate::platform::Host;

use super::event::{EventKind, HostEvent};
use super::DecorationRegistry;

/// Code that runs in response to a host event.
///
/// A `Hook` is a plain function; hooks capture nothing, and get everything
/// they need through their arguments.
pub type Hook = fn(&mut DecorationRegistry, &mut dyn Host, &HostEvent, &mut EventInfo);

/// Hooks, grouped by the kind of event they run on.
pub type Hooks = HashMap<EventKind, Vec<Hook>>;

/// A typed event bus.
///
/// Each event kind has an ordered list of hooks, which run in the order
/// they were subscribed.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    hooks: Hooks,
}

impl EventBus {
    /// Creates a bus with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus with the hooks the registry needs to function.
    pub fn with_defaults() -> Self {
        let mut bus = Self::new();
        bus.subscribe(EventKind::WindowOpened, |reg, host, ev, _| {
            if let HostEvent::WindowOpened(id) = ev {
                reg.on_window_open(host, *id);
            }
        });
        bus.subscribe(EventKind::WindowClosed, |reg, _, ev, _| {
            if let HostEvent::WindowClosed(id) = ev {
                reg.on_window_close(*id);
            }
        });
        bus.subscribe(EventKind::WindowRulesUpdated, |reg, host, ev, _| {
            if let HostEvent::WindowRulesUpdated(id) = ev {
                reg.update_rules(host, *id);
            }
        });
        bus.subscribe(EventKind::FocusChanged, |reg, host, _, _| reg.damage_all(host));
        bus.subscribe(EventKind::WorkspaceChanged, |reg, host, _, _| reg.damage_all(host));
        bus.subscribe(EventKind::PreConfigReload, |reg, _, _, _| reg.pre_reload());
        bus.subscribe(EventKind::ButtonDeclared, |reg, _, ev, _| {
            if let HostEvent::ButtonDeclared(line) = ev {
                reg.declare_button(line);
            }
        });
        bus.subscribe(EventKind::ConfigReloaded, |reg, host, ev, _| {
            if let HostEvent::ConfigReloaded(config) = ev {
                reg.reload(host, (**config).clone());
            }
        });
        bus.subscribe(EventKind::PointerButton, |reg, host, ev, info| {
            if let HostEvent::PointerButton { pressed, position, time } = ev {
                reg.pointer_button(host, *pressed, *position, *time, info);
            }
        });
        bus.subscribe(EventKind::PointerMotion, |reg, host, ev, _| {
            if let HostEvent::PointerMotion { position } = ev {
                reg.pointer_motion(host, *position);
            }
        });
        bus.subscribe(EventKind::TouchDown, |reg, host, ev, info| {
            if let HostEvent::TouchDown { id, position, output, time } = ev {
                reg.touch_down(host, *id, *position, output.as_deref(), *time, info);
            }
        });
        bus.subscribe(EventKind::TouchUp, |reg, host, ev, info| {
            if let HostEvent::TouchUp { id } = ev {
                reg.touch_up(host, *id, info);
            }
        });
        bus.subscribe(EventKind::TouchMotion, |reg, host, ev, _| {
            if let HostEvent::TouchMotion { id, position } = ev {
                reg.touch_motion(host, *id, *position);
            }
        });
        bus
    }

    /// Adds a hook to run on every event of `kind`.
    pub fn subscribe(&mut self, kind: EventKind, hook: Hook) {
        self.hooks.entry(kind).or_default().push(hook);
    }

    /// Removes every hook of `kind`.
    pub fn clear(&mut self, kind: EventKind) {
        self.hooks.remove(&kind);
    }

    /// The hooks subscribed to `kind`, in the order they run.
    pub fn hooks(&self, kind: EventKind) -> &[Hook] {
        self.hooks.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Runs every hook subscribed to the kind of `event`.
    pub fn dispatch(
        &self,
        registry: &mut DecorationRegistry,
        host: &mut dyn Host,
        event: &HostEvent,
        info: &mut EventInfo,
    ) {
        let hooks = self.hooks(EventKind::from(event));
        trace!(target: "manager::event", kind = %EventKind::from(event), hooks = hooks.len(), "dispatching");
        for hook in hooks {
            hook(registry, host, event, info);
        }
    }
}
