use std::rc::Rc;
use std::time::Instant;

use custom_debug_derive::Debug;
use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use crate::config::{BarConfig, ButtonSpec};
use crate::core::{DecorationId, EventInfo, MonitorId, StaleKind, WindowId};
use crate::platform::{DecorationFlags, DecorationLayer, Host, PositioningInfo};
use crate::render::Renderer;
use crate::types::{Logical, Point, Rectangle};
use crate::util::DefaultErrorHandler;
use crate::{decoerr, DecoError, ErrorHandler, Result};

use super::event::HostEvent;
use super::hooks::EventBus;
use super::instance::{DecorationInstance, Dirty, Shared};
use super::resources::Resources;

/// The context object holding every decoration and what they share.
///
/// The registry owns the configuration snapshot, the shared resources, and
/// one [`DecorationInstance`] per decorated window. The host drives it
/// through [`handle_event`](Self::handle_event) and the per-decoration
/// entry points; none of its state is global.
///
/// Errors that do not concern the caller directly, such as a skin that
/// failed to decode, are passed to the registry's [`ErrorHandler`] and
/// otherwise ignored.
#[derive(Debug)]
pub struct DecorationRegistry {
    config: BarConfig,
    resources: Resources,
    decorations: IndexMap<DecorationId, DecorationInstance>,
    next_id: u64,
    bus: Rc<EventBus>,
    #[debug(skip)]
    error_handler: Box<dyn ErrorHandler>,
}

impl DecorationRegistry {
    /// Creates an empty registry, with the default hooks subscribed and
    /// errors logged.
    pub fn new(config: BarConfig) -> Self {
        Self {
            config,
            resources: Resources::new(),
            decorations: IndexMap::new(),
            next_id: 0,
            bus: Rc::new(EventBus::with_defaults()),
            error_handler: Box::new(DefaultErrorHandler),
        }
    }

    /// Replaces the error handler.
    pub fn with_error_handler<E: ErrorHandler + 'static>(mut self, handler: E) -> Self {
        self.error_handler = Box::new(handler);
        self
    }

    /// The current configuration.
    pub fn config(&self) -> &BarConfig {
        &self.config
    }

    /// The shared resources.
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Mutable access to the event bus, to add or remove hooks.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        Rc::make_mut(&mut self.bus)
    }

    /// Runs every hook subscribed to `event`.
    ///
    /// For input events, the returned info tells whether a decoration
    /// consumed the event; the host must not process it further if so.
    pub fn handle_event(&mut self, host: &mut dyn Host, event: &HostEvent) -> EventInfo {
        let mut info = EventInfo::default();
        let bus = Rc::clone(&self.bus);
        bus.dispatch(self, host, event, &mut info);
        info
    }

    fn report(&self, errors: Vec<DecoError>) {
        for err in errors {
            self.error_handler.call(err);
        }
    }

    //* Lifecycle *//

    /// Decorates every window the host already has.
    ///
    /// Skins, button textures and the font are loaded on the first draw.
    #[instrument(level = "debug", skip_all)]
    pub fn init(&mut self, host: &mut dyn Host) {
        for window in host.windows() {
            self.on_window_open(host, window);
        }
        info!("decorating {} windows", self.decorations.len());
    }

    /// Decorates a window, unless it is already decorated or refuses
    /// decorations.
    pub fn on_window_open(&mut self, host: &mut dyn Host, window: WindowId) -> Option<DecorationId> {
        let Ok(state) = host.window(window) else {
            debug!("not decorating expired window {window}");
            return None
        };
        if state.refuses_borders || self.decoration_for(window).is_some() {
            return None
        }

        let id = DecorationId::new(self.next_id);
        self.next_id += 1;

        let mut deco = DecorationInstance::new(id, window, &self.config);
        deco.update_rules(host);
        self.decorations.insert(id, deco);
        host.reposition(window);

        debug!("decorated window {window} with {id}");
        Some(id)
    }

    /// Drops the decoration of a window that was closed.
    pub fn on_window_close(&mut self, window: WindowId) {
        self.decorations.retain(|id, deco| {
            let keep = deco.window() != window;
            if !keep {
                debug!("dropping {id} of closed window {window}");
            }
            keep
        });
    }

    /// Reads the rule overrides of a window again.
    pub fn update_rules(&mut self, host: &mut dyn Host, window: WindowId) {
        if let Some(deco) = self.decorations.values_mut().find(|d| d.window() == window) {
            deco.update_rules(host);
        }
    }

    /// Damages every bar.
    pub fn damage_all(&self, host: &mut dyn Host) {
        for deco in self.decorations.values() {
            deco.damage_entire(host);
        }
    }

    //* Configuration *//

    /// Forgets every button; the configuration is about to declare them again.
    pub fn pre_reload(&mut self) {
        self.resources.clear_buttons();
    }

    /// Parses a button declaration and adds the button.
    ///
    /// A malformed declaration is rejected through the error handler, and
    /// the buttons declared so far are kept.
    pub fn declare_button(&mut self, line: &str) {
        match ButtonSpec::parse(line) {
            Ok(spec) => self.add_button(spec),
            Err(e) => self.error_handler.call(e),
        }
    }

    /// Adds a button to the end of the row.
    pub fn add_button(&mut self, spec: ButtonSpec) {
        debug!(command = %spec.command, "adding button");
        self.resources.add_button(spec);
        for deco in self.decorations.values_mut() {
            deco.mark_dirty(Dirty::BUTTONS | Dirty::TITLE);
        }
    }

    /// Replaces the configuration.
    ///
    /// Skins and the font are loaded again on next use, and every decoration
    /// drops its cached textures and is repositioned.
    #[instrument(level = "debug", skip_all)]
    pub fn reload(&mut self, host: &mut dyn Host, config: BarConfig) {
        self.config = config;
        self.resources.reset_font();
        self.resources.reset_skins();

        for deco in self.decorations.values_mut() {
            deco.invalidate_all(host);
            host.reposition(deco.window());
        }
        info!("reloaded configuration");
    }

    //* Per-decoration operations *//

    fn stale(id: DecorationId) -> DecoError {
        debug!("no decoration {id}");
        decoerr!(stale: StaleKind::Decoration)
    }

    /// What a decoration asks of the host's positioner.
    pub fn positioning(&self, id: DecorationId) -> Result<PositioningInfo> {
        let deco = self.decorations.get(&id).ok_or_else(|| Self::stale(id))?;
        Ok(deco.positioning(Shared {
            config: &self.config,
            resources: &self.resources,
        }))
    }

    /// Passes on the box the host assigned to a decoration.
    pub fn assign_box(&mut self, id: DecorationId, assigned: Rectangle<f64, Logical>) -> Result<()> {
        let deco = self.decorations.get_mut(&id).ok_or_else(|| Self::stale(id))?;
        deco.on_assigned_box(assigned);
        Ok(())
    }

    // Skins only load after init or a reload, when every decoration is still
    // marked resized, so the draw that loads them also repositions.
    fn prepare(&mut self) {
        let errors = self.resources.prepare(&self.config);
        self.report(errors);
    }

    /// Queues a render pass of a decoration, if it is drawn at all.
    pub fn draw(&mut self, host: &mut dyn Host, id: DecorationId, alpha: f32) -> Result<()> {
        self.prepare();
        let shared = Shared {
            config: &self.config,
            resources: &self.resources,
        };
        let deco = self.decorations.get_mut(&id).ok_or_else(|| Self::stale(id))?;
        deco.draw(host, shared, alpha);
        Ok(())
    }

    /// Queues a render pass of every decoration.
    pub fn draw_all(&mut self, host: &mut dyn Host, alpha: f32) {
        self.prepare();
        let shared = Shared {
            config: &self.config,
            resources: &self.resources,
        };
        for deco in self.decorations.values_mut() {
            deco.draw(host, shared, alpha);
        }
    }

    /// Runs a queued render pass of a decoration onto a monitor.
    pub fn render_pass(
        &mut self,
        host: &mut dyn Host,
        renderer: &mut dyn Renderer,
        id: DecorationId,
        monitor: MonitorId,
        alpha: f32,
    ) -> Result<()> {
        self.prepare();
        let shared = Shared {
            config: &self.config,
            resources: &self.resources,
        };
        let deco = self.decorations.get_mut(&id).ok_or_else(|| Self::stale(id))?;
        deco.render_pass(host, renderer, shared, monitor, alpha);
        Ok(())
    }

    //* Queries *//

    /// Where decorations are drawn relative to their windows.
    pub fn layer(&self) -> DecorationLayer {
        if self.config.render_above {
            DecorationLayer::Over
        } else {
            DecorationLayer::Under
        }
    }

    /// The properties of every decoration.
    pub fn flags(&self) -> DecorationFlags {
        let mut flags = DecorationFlags::ALLOWS_MOUSE_INPUT;
        if self.config.part_of_window {
            flags |= DecorationFlags::PART_OF_MAIN_WINDOW;
        }
        flags
    }

    /// Looks up a decoration.
    pub fn get(&self, id: DecorationId) -> Option<&DecorationInstance> {
        self.decorations.get(&id)
    }

    /// The decoration of a window, if it has one.
    pub fn decoration_for(&self, window: WindowId) -> Option<DecorationId> {
        self.decorations
            .values()
            .find(|d| d.window() == window)
            .map(DecorationInstance::id)
    }

    /// Every decoration, in the order they were created.
    pub fn iter(&self) -> impl Iterator<Item = &DecorationInstance> {
        self.decorations.values()
    }

    /// The number of decorations.
    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    /// Whether there are no decorations.
    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    //* Input *//

    /// Routes a pointer button event to every decoration.
    pub fn pointer_button(
        &mut self,
        host: &mut dyn Host,
        pressed: bool,
        position: Point<f64, Logical>,
        time: Instant,
        info: &mut EventInfo,
    ) {
        let shared = Shared {
            config: &self.config,
            resources: &self.resources,
        };
        for deco in self.decorations.values_mut() {
            deco.pointer_button(host, shared, pressed, position, time, info);
        }
    }

    /// Routes pointer motion to every decoration.
    pub fn pointer_motion(&mut self, host: &mut dyn Host, position: Point<f64, Logical>) {
        let shared = Shared {
            config: &self.config,
            resources: &self.resources,
        };
        for deco in self.decorations.values_mut() {
            deco.pointer_motion(host, shared, position);
        }
    }

    /// Routes a touch down event to every decoration.
    pub fn touch_down(
        &mut self,
        host: &mut dyn Host,
        id: i32,
        position: Point<f64, Logical>,
        output: Option<&str>,
        time: Instant,
        info: &mut EventInfo,
    ) {
        let shared = Shared {
            config: &self.config,
            resources: &self.resources,
        };
        for deco in self.decorations.values_mut() {
            deco.touch_down(host, shared, id, position, output, time, info);
        }
    }

    /// Routes a touch up event to every decoration.
    pub fn touch_up(&mut self, host: &mut dyn Host, id: i32, info: &mut EventInfo) {
        let shared = Shared {
            config: &self.config,
            resources: &self.resources,
        };
        for deco in self.decorations.values_mut() {
            deco.touch_up(host, shared, id, info);
        }
    }

    /// Routes touch motion to every decoration.
    pub fn touch_motion(&mut self, host: &mut dyn Host, id: i32, position: Point<f64, Logical>) {
        let shared = Shared {
            config: &self.config,
            resources: &self.resources,
        };
        for deco in self.decorations.values_mut() {
            deco.touch_motion(host, shared, id, position);
        }
    }
}
