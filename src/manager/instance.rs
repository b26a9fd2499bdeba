use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::config::{BarConfig, WindowOverrides};
use crate::core::anim::AnimatedColor;
use crate::core::layout::{self, LayoutParams};
use crate::core::{hit, ninepatch};
use crate::core::{
    Action, BarFrame, DecorationId, EventInfo, GestureController, GestureEnv, Hit, InputSource,
    MonitorId, WindowId,
};
use crate::platform::{
    Edges, Host, MonitorState, PositionPolicy, PositioningInfo, WindowState, WmCommand,
};
use crate::render::compose::{self, BackgroundStyle, TitleLayout, TitleText};
use crate::render::{Cutout, RectStyle, Renderer, Texture};
use crate::types::{
    ButtonAlignment, Filter, Logical, Physical, Point, Rectangle, Scale, Size,
};
use crate::util::icon;

use super::resources::Resources;

/// Positioning priority when the bar sits inside the window border.
const PRIORITY_OVER_BORDER: u32 = 10005;
/// Positioning priority when the bar sits outside the window border.
const PRIORITY_UNDER_BORDER: u32 = 5000;

bitflags! {
    /// Cached state of a decoration that must be regenerated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Dirty: u8 {
        /// The assigned box changed size.
        const SIZE       = 1 << 0;
        /// The title texture is stale.
        const TITLE      = 1 << 1;
        /// The button row texture is stale.
        const BUTTONS    = 1 << 2;
        /// The background texture is stale.
        const BACKGROUND = 1 << 3;
        /// The app icon must be looked up again.
        const ICON       = 1 << 4;
    }
}

/// What every decoration reads from its registry during an operation.
///
/// Decorations never keep these across calls; the registry may replace
/// them on reload.
#[derive(Debug, Clone, Copy)]
pub struct Shared<'a> {
    /// The current configuration.
    pub config: &'a BarConfig,
    /// The current shared resources.
    pub resources: &'a Resources,
}

#[derive(Debug, Default)]
struct TextureCache {
    background: Option<Texture>,
    title: Option<Texture>,
    buttons: Option<Texture>,
    icon: Option<Texture>,
}

/// The ids of the cached textures of a decoration.
///
/// Since a regenerated texture always gets a fresh id, comparing these
/// across frames tells which textures were regenerated.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureIds {
    pub background: Option<u64>,
    pub title: Option<u64>,
    pub buttons: Option<u64>,
    pub icon: Option<u64>,
}

/// The decoration of a single window.
///
/// A `DecorationInstance` holds everything specific to one window: the box
/// the host assigned to it, its cached textures, the last title and app id
/// it rendered, the per-window overrides and its gesture state. It refers
/// to its window only by handle; if the handle expires, every operation
/// becomes a no-op.
#[derive(Debug)]
pub struct DecorationInstance {
    id: DecorationId,
    window: WindowId,
    assigned: Rectangle<f64, Logical>,
    textures: TextureCache,
    dirty: Dirty,
    last_title: String,
    last_app_id: String,
    icon_size: u32,
    focused: bool,
    hidden: bool,
    last_enabled: bool,
    last_top_offset: i32,
    queued: bool,
    overrides: WindowOverrides,
    bar_color: AnimatedColor,
    gestures: GestureController,
    last_touch: Option<Point<f64, Logical>>,
}

impl DecorationInstance {
    /// Creates the decoration of `window`, with everything marked stale.
    pub fn new(id: DecorationId, window: WindowId, config: &BarConfig) -> Self {
        Self {
            id,
            window,
            assigned: Rectangle::zeroed(),
            textures: TextureCache::default(),
            dirty: Dirty::all(),
            last_title: String::new(),
            last_app_id: String::new(),
            icon_size: 0,
            focused: false,
            hidden: false,
            last_enabled: config.enabled,
            last_top_offset: config.offset_top,
            queued: false,
            overrides: WindowOverrides::default(),
            bar_color: AnimatedColor::new(config.bar_color, config.color_transition),
            gestures: GestureController::new(),
            last_touch: None,
        }
    }

    /// The handle of this decoration.
    pub fn id(&self) -> DecorationId {
        self.id
    }

    /// The window this decoration belongs to.
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// The box assigned by the host, relative to the window body.
    pub fn assigned_box(&self) -> Rectangle<f64, Logical> {
        self.assigned
    }

    /// Whether the bar is hidden by a window rule.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the window had focus on the last render pass.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The cached state that will be regenerated on the next render pass.
    pub fn dirty(&self) -> Dirty {
        self.dirty
    }

    /// The overrides currently in effect.
    pub fn overrides(&self) -> WindowOverrides {
        self.overrides
    }

    /// The gesture state.
    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    /// The ids of the cached textures.
    pub fn texture_ids(&self) -> TextureIds {
        TextureIds {
            background: self.textures.background.as_ref().map(Texture::id),
            title: self.textures.title.as_ref().map(Texture::id),
            buttons: self.textures.buttons.as_ref().map(Texture::id),
            icon: self.textures.icon.as_ref().map(Texture::id),
        }
    }

    pub(crate) fn mark_dirty(&mut self, dirty: Dirty) {
        self.dirty |= dirty;
    }

    pub(crate) fn reset_gestures(&mut self) {
        self.gestures.reset();
        self.last_touch = None;
    }

    /// What this decoration asks of the host's positioner.
    pub fn positioning(&self, shared: Shared<'_>) -> PositioningInfo {
        let config = shared.config;
        PositioningInfo {
            policy: if self.hidden { PositionPolicy::Absolute } else { PositionPolicy::Sticky },
            edges: Edges::all(),
            priority: if config.precedence_over_border {
                PRIORITY_OVER_BORDER
            } else {
                PRIORITY_UNDER_BORDER
            },
            reserved: !config.inset,
            desired: layout::desired_extents(config, &shared.resources.frame_info(), self.hidden),
        }
    }

    /// Takes the box the host assigned in reply to [`positioning`](Self::positioning).
    pub fn on_assigned_box(&mut self, assigned: Rectangle<f64, Logical>) {
        if assigned.size != self.assigned.size {
            debug!(decoration = %self.id, ?assigned, "assigned box resized");
            self.dirty |= Dirty::SIZE;
        }
        self.assigned = assigned;
    }

    /// The assigned box in the global coordinate space, as rendered.
    fn global_box(&self, win: &WindowState) -> Rectangle<f64, Logical> {
        let mut point = win.position + self.assigned.point;
        if !win.pinned {
            point += win.workspace_offset;
        }
        Rectangle { point, size: self.assigned.size }
    }

    /// Damages the whole bar.
    pub fn damage_entire(&self, host: &mut dyn Host) {
        if let Ok(win) = host.window(self.window) {
            host.damage(self.global_box(&win));
        }
    }

    /// Queues a render pass for this frame, unless the bar is not drawn.
    ///
    /// Also asks the host to reposition the bar if the enabled state or the
    /// size changed since the last pass.
    pub fn draw(&mut self, host: &mut dyn Host, shared: Shared<'_>, alpha: f32) {
        let config = shared.config;
        if self.last_enabled != config.enabled || self.dirty.contains(Dirty::SIZE) {
            self.last_enabled = config.enabled;
            host.reposition(self.window);
        }

        if self.hidden || !config.enabled {
            return
        }
        let Ok(win) = host.window(self.window) else {
            return
        };
        if !win.valid_mapped() || !win.decorate {
            return
        }
        if self.queued {
            return
        }

        self.queued = true;
        host.queue_render(self.id, alpha);
    }

    /// Composes and draws the bar onto `monitor`.
    ///
    /// Cached textures are regenerated only when their inputs changed. They
    /// are drawn in order: background, icon, title, buttons.
    pub fn render_pass(
        &mut self,
        host: &mut dyn Host,
        renderer: &mut dyn Renderer,
        shared: Shared<'_>,
        monitor: MonitorId,
        alpha: f32,
    ) {
        self.queued = false;
        let config = shared.config;

        let Ok(win) = host.window(self.window) else {
            trace!(decoration = %self.id, "window expired before rendering");
            return
        };
        let Ok(mon) = host.monitor(monitor) else {
            return
        };
        let scale = mon.scale;

        let focused = host.focused_window() == Some(self.window);
        if focused != self.focused {
            self.focused = focused;
            self.dirty |= Dirty::BUTTONS | Dirty::BACKGROUND;
            host.damage(self.global_box(&win));
        }

        let now = host.now();
        self.bar_color.set_duration(config.color_transition);
        self.bar_color
            .set_target(self.overrides.bar_color.unwrap_or(config.bar_color), now);
        if self.bar_color.is_animating(now) {
            host.damage(self.global_box(&win));
        }
        let color = self.bar_color.value(now).with_alpha_mul(alpha);
        let blur = config.blur && host.global_blur_enabled() && color.alpha() < 1.;

        let rounding = win.rounding
            + if config.precedence_over_border { 0. } else { win.border_size };
        let scaled_rounding = if rounding > 0. {
            (rounding * scale.factor() - 2.).max(0.) as f32
        } else {
            0.
        };

        let global = self.global_box(&win);
        let bar = Rectangle {
            point: global.point - mon.position,
            size: global.size,
        }
        .as_physical(scale)
        .round();
        if bar.size.width < 1 || bar.size.height < 1 {
            return
        }

        renderer.set_scissor(Some(bar));
        if rounding > 0. && !config.inset {
            renderer.set_cutout(Some(Cutout {
                rect: body_rect(&win, &mon).as_physical(scale).round(),
                radius: scaled_rounding,
                power: win.rounding_power,
            }));
        }

        let res = shared.resources;
        let patch = res.patch(self.focused);
        match patch {
            Some(patch) => {
                if self.dirty.intersects(Dirty::SIZE | Dirty::BACKGROUND) || self.textures.background.is_none() {
                    let style = BackgroundStyle {
                        middle_alpha: config.ninepatch_middle_alpha,
                        repeat: config.ninepatch_repeat,
                        filter: if config.ninepatch_linear_filtering { Filter::Linear } else { Filter::Nearest },
                    };
                    self.textures.background = compose::compose_background(patch, bar.size, scale.factor(), &style)
                        .map(|p| Texture::new(p, style.filter));
                    debug!(decoration = %self.id, "regenerated background");
                }
                if let Some(tex) = &self.textures.background {
                    renderer.blit(tex, bar, alpha);
                }
            }
            None => {
                self.textures.background = None;
                let style = RectStyle {
                    rounding: scaled_rounding,
                    rounding_power: win.rounding_power,
                    blur,
                };
                renderer.fill_rect(bar, color, &style);
            }
        }

        let frame = layout::frame_extents(config, &res.patch_info(self.focused));
        let content = layout::content_rect(config.placement, self.assigned.size, &frame);
        let content_px = content.as_physical(scale).round().translate(bar.point);

        if config.appicon_enabled {
            self.refresh_icon(&win.app_id, config, &content_px.as_f64());
            if let Some(tex) = &self.textures.icon {
                let offset = config.appicon_offset.as_f64().as_physical(scale);
                let dest = compose::icon_rect(config.placement, &content_px.as_f64(), tex.size(), offset);
                renderer.blit(tex, dest, alpha);
            }
        } else {
            self.textures.icon = None;
        }

        renderer.set_cutout(None);

        if config.title_enabled {
            if win.title != self.last_title
                || self.dirty.intersects(Dirty::SIZE | Dirty::TITLE)
                || self.textures.title.is_none()
            {
                self.last_title.clone_from(&win.title);
                self.textures.title = self.compose_title(shared, &content, content_px.size, scale);
                debug!(decoration = %self.id, title = %self.last_title, "regenerated title");
            }
            if let Some(tex) = &self.textures.title {
                renderer.blit(tex, content_px, alpha);
            }
        }

        if self.dirty.intersects(Dirty::SIZE | Dirty::BUTTONS) || self.textures.buttons.is_none() {
            self.textures.buttons = self.compose_buttons(shared, &content, content_px.size, scale);
            trace!(decoration = %self.id, "regenerated buttons");
        }
        if let Some(tex) = &self.textures.buttons {
            renderer.blit(tex, content_px, alpha);
        }

        renderer.set_scissor(None);
        self.dirty = Dirty::empty();

        if config.offset_top != self.last_top_offset {
            self.last_top_offset = config.offset_top;
            host.relayout(self.window);
        }
    }

    fn refresh_icon(&mut self, app_id: &str, config: &BarConfig, content: &Rectangle<f64, Physical>) {
        let size = compose::icon_size(config.placement, content);
        if !self.dirty.contains(Dirty::ICON) && app_id == self.last_app_id && size == self.icon_size {
            return
        }

        self.last_app_id = app_id.to_string();
        self.icon_size = size;
        self.textures.icon = load_icon(app_id, size);
        debug!(decoration = %self.id, app_id, size, found = self.textures.icon.is_some(), "reloaded icon");
    }

    fn compose_title(
        &self,
        shared: Shared<'_>,
        content: &Rectangle<f64, Logical>,
        size: Size<i32, Physical>,
        scale: Scale,
    ) -> Option<Texture> {
        let config = shared.config;
        let font = shared.resources.font()?;

        let params = LayoutParams::from(config);
        let sizes = shared.resources.button_sizes();
        let count = layout::visible_button_count(&params, content, &sizes);
        let s = scale.factor() as f32;

        let title_layout = TitleLayout {
            placement: config.placement,
            buttons_right: config.buttons_alignment == ButtonAlignment::Right,
            align: config.title_align,
            padding: config.padding as f32 * s,
            buttons_span: layout::buttons_span(&params, &sizes, count) as f32 * s,
            icon_reserved: layout::icon_reserved(&params, content) as f32 * s,
        };
        let text = TitleText {
            text: &self.last_title,
            px: config.title_size * s,
            color: self.overrides.title_color.unwrap_or(config.text_color),
        };

        compose::compose_title(size, font, &text, &title_layout).map(|p| Texture::new(p, Filter::Nearest))
    }

    fn compose_buttons(
        &self,
        shared: Shared<'_>,
        content: &Rectangle<f64, Logical>,
        size: Size<i32, Physical>,
        scale: Scale,
    ) -> Option<Texture> {
        let res = shared.resources;
        let rects = layout::button_rects(&LayoutParams::from(shared.config), content, &res.button_sizes());
        if rects.is_empty() {
            return None
        }

        let entries = rects
            .iter()
            .zip(res.buttons())
            .enumerate()
            .filter_map(|(idx, (rect, button))| {
                let image = button.images()?.select(
                    self.focused,
                    self.gestures.is_hovered(idx),
                    self.gestures.pressed_button() == Some(idx),
                )?;
                let local = Rectangle {
                    point: rect.point - content.point,
                    size: rect.size,
                };
                Some((local.as_physical(scale), image))
            });

        compose::compose_buttons(size, entries).map(|p| Texture::new(p, Filter::Linear))
    }

    /// Reads the window's overrides again.
    ///
    /// A change to the hidden state asks the host for a reposition; a change
    /// to the title color marks the title stale.
    pub fn update_rules(&mut self, host: &mut dyn Host) {
        let overrides = WindowOverrides::resolve(&*host, self.window);
        let prev = std::mem::replace(&mut self.overrides, overrides);
        if prev == overrides {
            return
        }

        debug!(decoration = %self.id, ?overrides, "window overrides changed");
        if prev.no_bar != overrides.no_bar {
            self.hidden = overrides.no_bar;
            host.reposition(self.window);
        }
        if prev.title_color != overrides.title_color {
            self.dirty |= Dirty::TITLE;
        }
        self.damage_entire(host);
    }

    /// Drops every cached texture and marks everything stale.
    pub fn invalidate_all(&mut self, host: &mut dyn Host) {
        self.textures = TextureCache::default();
        self.dirty = Dirty::all();
        self.last_title.clear();
        self.damage_entire(host);
    }

    /// Whether input at `cursor` may reach this bar at all.
    fn input_valid(&self, host: &dyn Host, config: &BarConfig, win: &WindowState, cursor: Point<f64, Logical>) -> bool {
        if self.hidden || !config.enabled || !win.workspace_visible || host.input_grabbed(self.window) {
            return false
        }
        if host.window_at(cursor) != Some(self.window) && host.focused_window() != Some(self.window) {
            return false
        }
        !host.layer_surface_at(cursor)
    }

    fn hit_test(&self, shared: Shared<'_>, win: &WindowState, position: Point<f64, Logical>) -> Hit {
        if self.hidden {
            return Hit::Outside
        }
        let config = shared.config;
        let res = shared.resources;
        let local = position - self.global_box(win).point;

        let frame = BarFrame::new(self.assigned.size, &layout::frame_extents(config, &res.frame_info()));
        let content = layout::content_rect(
            config.placement,
            self.assigned.size,
            &layout::frame_extents(config, &res.patch_info(self.focused)),
        );
        let buttons = layout::button_rects(&LayoutParams::from(config), &content, &res.button_sizes());
        hit::classify(local, &frame, &buttons)
    }

    fn env<'a>(&self, host: &dyn Host, win: &WindowState, config: &'a BarConfig, commands: &'a [&'a str]) -> GestureEnv<'a> {
        GestureEnv {
            owner_valid: win.valid_mapped(),
            owner_focused: host.focused_window() == Some(self.window),
            owner_floating: win.floating,
            double_click: config.double_click_command(),
            button_commands: commands,
        }
    }

    /// Handles a pointer button press or release at a global position.
    pub fn pointer_button(
        &mut self,
        host: &mut dyn Host,
        shared: Shared<'_>,
        pressed: bool,
        position: Point<f64, Logical>,
        time: Instant,
        info: &mut EventInfo,
    ) {
        let Ok(win) = host.window(self.window) else {
            self.reset_gestures();
            return
        };
        if !self.input_valid(&*host, shared.config, &win, position) {
            return
        }

        let hit = self.hit_test(shared, &win, position);
        let commands = shared.resources.button_commands();
        let env = self.env(&*host, &win, shared.config, &commands);
        let actions = if pressed {
            self.gestures.button_down(hit, time, &env, info)
        } else {
            self.gestures.button_up(hit, &env, info)
        };
        self.apply(host, &win, actions);
    }

    /// Handles pointer motion to a global position.
    pub fn pointer_motion(&mut self, host: &mut dyn Host, shared: Shared<'_>, position: Point<f64, Logical>) {
        let Ok(win) = host.window(self.window) else {
            self.reset_gestures();
            return
        };

        let hit = self.hit_test(shared, &win, position);
        let commands = shared.resources.button_commands();
        let env = self.env(&*host, &win, shared.config, &commands);
        let actions = self.gestures.pointer_motion(hit, position, &env);
        self.apply(host, &win, actions);
    }

    /// Handles a touch point going down.
    ///
    /// `position` is normalized to the output the touch device is bound to,
    /// or to the focused monitor if it is not bound.
    #[allow(clippy::too_many_arguments)]
    pub fn touch_down(
        &mut self,
        host: &mut dyn Host,
        shared: Shared<'_>,
        id: i32,
        position: Point<f64, Logical>,
        output: Option<&str>,
        time: Instant,
        info: &mut EventInfo,
    ) {
        let Ok(win) = host.window(self.window) else {
            self.reset_gestures();
            return
        };
        let monitor = output
            .and_then(|name| host.monitor_by_name(name))
            .or_else(|| host.focused_monitor());
        let Some(Ok(mon)) = monitor.map(|m| host.monitor(m)) else {
            return
        };

        let global = to_global(&mon, position);
        if !self.input_valid(&*host, shared.config, &win, global) {
            return
        }
        self.last_touch = Some(global);

        let hit = self.hit_test(shared, &win, global);
        let commands = shared.resources.button_commands();
        let env = self.env(&*host, &win, shared.config, &commands);
        let actions = self.gestures.touch_down(id, hit, time, &env, info);
        self.apply(host, &win, actions);
    }

    /// Handles a touch point going up, where it was last seen.
    pub fn touch_up(&mut self, host: &mut dyn Host, shared: Shared<'_>, id: i32, info: &mut EventInfo) {
        let Ok(win) = host.window(self.window) else {
            self.reset_gestures();
            return
        };
        let Some(position) = self.last_touch else {
            return
        };
        if !self.input_valid(&*host, shared.config, &win, position) {
            return
        }

        let hit = self.hit_test(shared, &win, position);
        let commands = shared.resources.button_commands();
        let env = self.env(&*host, &win, shared.config, &commands);
        let actions = self.gestures.touch_up(id, hit, &env, info);
        self.apply(host, &win, actions);
    }

    /// Handles a touch point moving.
    ///
    /// `position` is normalized to the monitor of the window, or to the
    /// focused monitor if the window has none.
    pub fn touch_motion(&mut self, host: &mut dyn Host, shared: Shared<'_>, id: i32, position: Point<f64, Logical>) {
        let Ok(win) = host.window(self.window) else {
            self.reset_gestures();
            return
        };
        let Some(Ok(mon)) = win.monitor.or_else(|| host.focused_monitor()).map(|m| host.monitor(m)) else {
            return
        };

        let global = to_global(&mon, position);
        if self.gestures.tracks_touch(id) {
            self.last_touch = Some(global);
        }
        let commands = shared.resources.button_commands();
        let env = self.env(&*host, &win, shared.config, &commands);
        let actions = self.gestures.touch_motion(id, global, &env);
        self.apply(host, &win, actions);
    }

    /// Carries out the actions of the gesture controller.
    fn apply(&mut self, host: &mut dyn Host, win: &WindowState, actions: Vec<Action>) {
        for action in actions {
            trace!(target: "manager::event", window = %self.window, ?action, "applying");
            let command = match action {
                Action::Focus => WmCommand::Focus,
                Action::Raise => WmCommand::Raise,
                Action::BeginDrag(InputSource::Pointer) => WmCommand::InteractiveMove(true),
                Action::EndDrag(InputSource::Pointer) => WmCommand::InteractiveMove(false),
                // the host tracks the pointer itself; touch drags move explicitly
                Action::BeginDrag(InputSource::Touch)
                | Action::EndDrag(InputSource::Touch)
                | Action::ContinueDrag(InputSource::Pointer, _) => continue,
                Action::ContinueDrag(InputSource::Touch, pos) => {
                    WmCommand::MoveExact(Point::new(pos.x - self.assigned.size.width / 2., pos.y).round())
                }
                Action::SetFloating => WmCommand::SetFloating,
                Action::ResizeTo { width_pct, height_pct } => WmCommand::ResizeExact { width_pct, height_pct },
                Action::Pin => WmCommand::Pin,
                Action::Unpin => WmCommand::Unpin,
                Action::SetTiled => WmCommand::SetTiled,
                Action::RunCommand(cmd) => {
                    host.exec(&cmd);
                    continue
                }
                Action::PressedChanged(_) | Action::HoverChanged => {
                    self.dirty |= Dirty::BUTTONS;
                    host.damage(self.global_box(win));
                    continue
                }
            };
            host.dispatch(self.window, command);
        }
    }
}

/// The window body on its monitor, inset by a pixel on every side.
fn body_rect(win: &WindowState, mon: &MonitorState) -> Rectangle<f64, Logical> {
    let mut origin = win.position - mon.position;
    if !win.pinned {
        origin += win.workspace_offset;
    }
    Rectangle::new(origin.x + 1., origin.y + 1., win.size.width - 2., win.size.height - 2.)
}

/// Maps a position normalized to a monitor into the global space.
fn to_global(mon: &MonitorState, normalized: Point<f64, Logical>) -> Point<f64, Logical> {
    Point::new(
        mon.position.x + normalized.x * mon.size.width,
        mon.position.y + normalized.y * mon.size.height,
    )
}

fn load_icon(app_id: &str, size: u32) -> Option<Texture> {
    if size == 0 {
        return None
    }
    let path = icon::find_app_icon(app_id, size.min(u16::MAX as u32) as u16)?;
    match ninepatch::load_scaled_icon(&path, size) {
        Ok(pixmap) => Some(Texture::new(pixmap, Filter::Linear)),
        Err(e) => {
            warn!("could not load app icon: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::config::{no_checks, RuleKey};
    use crate::platform::dummy::{DummyHost, Request};
    use crate::render::SoftwareRenderer;
    use crate::types::Color;

    const WIN: WindowId = WindowId::new(1);
    const MON: MonitorId = MonitorId::new(0);

    fn config() -> BarConfig {
        BarConfig::builder()
            .offset_top(20)
            .padding(0)
            .title_enabled(false)
            .bar_color(Color::from_hex(0x336699ff))
            .color_transition(Duration::ZERO)
            .finish(no_checks)
            .unwrap()
    }

    fn host() -> DummyHost {
        let mut host = DummyHost::new();
        host.add_monitor(MON, DummyHost::simple_monitor("DP-1", 1.));
        host.add_window(WIN, WindowState {
            position: Point::new(100., 100.),
            size: Size::new(200., 100.),
            title: "Terminal".into(),
            monitor: Some(MON),
            ..WindowState::default()
        });
        host.focus(Some(WIN));
        host
    }

    fn deco(config: &BarConfig) -> DecorationInstance {
        let mut deco = DecorationInstance::new(DecorationId::new(0), WIN, config);
        deco.on_assigned_box(Rectangle::new(0., -20., 200., 120.));
        deco
    }

    #[test]
    fn test_positioning() {
        let config = config();
        let res = Resources::new();
        let shared = Shared { config: &config, resources: &res };
        let mut deco = deco(&config);

        let info = deco.positioning(shared);
        assert_eq!(info.policy, PositionPolicy::Sticky);
        assert_eq!(info.priority, PRIORITY_UNDER_BORDER);
        assert!(info.reserved);
        assert_eq!(info.edges, Edges::all());
        assert_eq!(info.desired.top, 20.);

        deco.hidden = true;
        let info = deco.positioning(shared);
        assert_eq!(info.policy, PositionPolicy::Absolute);
        assert!(info.desired.is_zero());
    }

    #[test]
    fn test_resize_marks_size_dirty() {
        let config = config();
        let mut deco = deco(&config);
        deco.dirty = Dirty::empty();

        deco.on_assigned_box(Rectangle::new(5., -20., 200., 120.));
        assert!(deco.dirty().is_empty());
        deco.on_assigned_box(Rectangle::new(0., -20., 300., 120.));
        assert!(deco.dirty().contains(Dirty::SIZE));
    }

    #[test]
    fn test_draw_queues_once_per_frame() {
        let config = config();
        let res = Resources::new();
        let shared = Shared { config: &config, resources: &res };
        let mut host = host();
        let mut deco = deco(&config);

        deco.draw(&mut host, shared, 1.);
        deco.draw(&mut host, shared, 1.);
        let queued = host
            .requests()
            .iter()
            .filter(|r| matches!(r, Request::QueueRender(..)))
            .count();
        assert_eq!(queued, 1);

        let mut renderer = SoftwareRenderer::new(400, 400).unwrap();
        deco.render_pass(&mut host, &mut renderer, shared, MON, 1.);
        deco.draw(&mut host, shared, 1.);
        let queued = host
            .requests()
            .iter()
            .filter(|r| matches!(r, Request::QueueRender(..)))
            .count();
        assert_eq!(queued, 2);
    }

    #[test]
    fn test_draw_skips_unmapped_windows() {
        let config = config();
        let res = Resources::new();
        let shared = Shared { config: &config, resources: &res };
        let mut host = host();
        host.window_mut(WIN).unwrap().mapped = false;

        let mut deco = deco(&config);
        deco.draw(&mut host, shared, 1.);
        assert!(!host.requests().iter().any(|r| matches!(r, Request::QueueRender(..))));
    }

    #[test]
    fn test_flat_bar_is_drawn_in_bar_color() {
        let config = config();
        let res = Resources::new();
        let shared = Shared { config: &config, resources: &res };
        let mut host = host();
        let mut deco = deco(&config);

        let mut renderer = SoftwareRenderer::new(400, 400).unwrap();
        deco.render_pass(&mut host, &mut renderer, shared, MON, 1.);

        let bar = renderer.pixmap().pixel(150, 90).unwrap();
        assert_eq!((bar.red(), bar.green(), bar.blue(), bar.alpha()), (0x33, 0x66, 0x99, 0xff));
        // the scissor keeps the fill out of everything but the bar box
        assert_eq!(renderer.pixmap().pixel(150, 230).unwrap().alpha(), 0);
        assert!(deco.dirty().is_empty());
    }

    #[test]
    fn test_rules_hide_and_recolor() {
        let config = config();
        let mut host = host();
        let mut deco = deco(&config);
        deco.dirty = Dirty::empty();

        host.set_rule(WIN, RuleKey::TitleColor, "rgb(ff0000)");
        deco.update_rules(&mut host);
        assert!(deco.dirty().contains(Dirty::TITLE));
        assert!(!host.requests().contains(&Request::Reposition(WIN)));

        host.set_rule(WIN, RuleKey::NoBar, "1");
        deco.update_rules(&mut host);
        assert!(deco.is_hidden());
        assert!(host.requests().contains(&Request::Reposition(WIN)));
    }

    #[test]
    fn test_stale_window_is_a_no_op() {
        let config = config();
        let res = Resources::new();
        let shared = Shared { config: &config, resources: &res };
        let mut host = host();
        host.remove_window(WIN);

        let mut deco = deco(&config);
        let mut info = EventInfo::default();
        let now = host.now();
        deco.pointer_button(&mut host, shared, true, Point::new(150., 90.), now, &mut info);
        deco.draw(&mut host, shared, 1.);

        let mut renderer = SoftwareRenderer::new(10, 10).unwrap();
        deco.render_pass(&mut host, &mut renderer, shared, MON, 1.);

        assert!(!info.consumed);
        assert_eq!(renderer.uploads(), 0);
        assert!(host.commands().is_empty());
    }

    #[test]
    fn test_touch_positions_are_denormalized() {
        let mon = MonitorState {
            position: Point::new(1920., 0.),
            size: Size::new(1000., 500.),
            scale: Scale(1.),
            name: "HDMI-1".into(),
        };
        assert_eq!(to_global(&mon, Point::new(0.5, 0.1)), Point::new(2420., 50.));
    }
}
