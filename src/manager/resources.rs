use std::path::PathBuf;
use std::rc::Rc;

use custom_debug_derive::Debug;
use fontdue::Font;
use tracing::debug;

use crate::config::{BarConfig, ButtonSpec, NinePatchSource, DEFAULT_BUTTON_SIZE};
use crate::core::ninepatch;
use crate::core::{NinePatch, NinePatchInfo};
use crate::render::{text, ButtonImages};
use crate::types::{Logical, Size};
use crate::DecoError;

/// A declared button, with its textures once they are loaded.
#[derive(Debug)]
pub struct Button {
    spec: ButtonSpec,
    size: Size<f64, Logical>,
    images: Option<ButtonImages>,
}

impl Button {
    fn new(spec: ButtonSpec) -> Self {
        Self {
            size: spec.size,
            spec,
            images: None,
        }
    }

    /// The declaration of the button.
    pub fn spec(&self) -> &ButtonSpec {
        &self.spec
    }

    /// The size of the button, resolved once its textures are loaded.
    pub fn size(&self) -> Size<f64, Logical> {
        self.size
    }

    /// The command run when the button is clicked.
    pub fn command(&self) -> &str {
        &self.spec.command
    }

    /// The decoded textures, if they were loaded yet.
    pub fn images(&self) -> Option<&ButtonImages> {
        self.images.as_ref()
    }

    fn load(&mut self) {
        let images = ButtonImages::load(&self.spec.textures);
        if self.size.width <= 0. || self.size.height <= 0. {
            self.size = images
                .natural_size()
                .map(|s| Size::new(s.width, s.height))
                .unwrap_or(Size::new(DEFAULT_BUTTON_SIZE, DEFAULT_BUTTON_SIZE));
            debug!(command = self.command(), size = ?self.size, "resolved button size");
        }
        self.images = Some(images);
    }
}

#[derive(Default)]
enum FontSlot {
    #[default]
    Unloaded,
    Loaded(Font),
    Failed,
}

/// The nine-patch skins; a skin that failed to load is `None` until the
/// next reload.
#[derive(Debug, Default)]
enum Skins {
    #[default]
    Unloaded,
    Loaded {
        active: Option<Rc<NinePatch>>,
        inactive: Option<Rc<NinePatch>>,
    },
}

/// Everything decorations share: nine-patch skins, buttons and the title font.
///
/// Resources are loaded lazily, the first time a decoration is drawn, and
/// only once; a resource that failed to load stays empty until the next
/// configuration reload.
#[derive(Debug, Default)]
pub struct Resources {
    skins: Skins,
    buttons: Vec<Button>,
    #[debug(skip)]
    font: FontSlot,
}

impl Resources {
    /// Creates empty resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the nine-patch skins named by `source`, replacing the current ones.
    ///
    /// Skins that fail to load are left empty; the errors are returned.
    pub fn load_ninepatches(&mut self, source: &NinePatchSource) -> Vec<DecoError> {
        let mut errors = Vec::new();
        let mut load = |path: &Option<PathBuf>| match path.as_deref().map(ninepatch::load) {
            Some(Ok(patch)) => Some(Rc::new(patch)),
            Some(Err(e)) => {
                errors.push(e);
                None
            }
            None => None,
        };

        let (active_path, inactive_path) = source.resolve();
        let active = load(&active_path);
        let inactive = if inactive_path == active_path {
            active.clone()
        } else {
            load(&inactive_path)
        };
        self.skins = Skins::Loaded { active, inactive };

        errors
    }

    /// Forgets the skins, so they are loaded again on next use.
    pub fn reset_skins(&mut self) {
        self.skins = Skins::Unloaded;
    }

    /// Whether the skins were loaded since the last reset, successfully or not.
    pub fn skins_loaded(&self) -> bool {
        matches!(self.skins, Skins::Loaded { .. })
    }

    /// The skin for a focused or unfocused window.
    pub fn patch(&self, focused: bool) -> Option<&NinePatch> {
        match &self.skins {
            Skins::Loaded { active, .. } if focused => active.as_deref(),
            Skins::Loaded { inactive, .. } => inactive.as_deref(),
            Skins::Unloaded => None,
        }
    }

    /// The metadata of the skin for a focused or unfocused window.
    pub fn patch_info(&self, focused: bool) -> NinePatchInfo {
        self.patch(focused).map(|p| p.info).unwrap_or_default()
    }

    /// The metadata that sizes the frame: the active skin's if it is
    /// defined, else the inactive skin's.
    pub fn frame_info(&self) -> NinePatchInfo {
        match self.patch(true) {
            Some(active) if active.info.defined => active.info,
            _ => self.patch_info(false),
        }
    }

    /// Forgets every button.
    pub fn clear_buttons(&mut self) {
        self.buttons.clear();
    }

    /// Adds a button to the end of the row.
    pub fn add_button(&mut self, spec: ButtonSpec) {
        self.buttons.push(Button::new(spec));
    }

    /// The buttons, in layout order.
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// The sizes of the buttons, in layout order.
    pub fn button_sizes(&self) -> Vec<Size<f64, Logical>> {
        self.buttons.iter().map(Button::size).collect()
    }

    /// The commands of the buttons, in layout order.
    pub fn button_commands(&self) -> Vec<&str> {
        self.buttons.iter().map(Button::command).collect()
    }

    /// Forgets the font, so it is loaded again on next use.
    pub fn reset_font(&mut self) {
        self.font = FontSlot::Unloaded;
    }

    /// The title font, if it loaded.
    pub fn font(&self) -> Option<&Font> {
        match &self.font {
            FontSlot::Loaded(font) => Some(font),
            _ => None,
        }
    }

    /// Loads every resource that was not loaded yet, returning what failed.
    ///
    /// Skins and the font that fail are not retried until they are reset.
    /// Button textures that fail to load are logged and skipped rather than
    /// returned, since a button can fall back to its other states.
    pub fn prepare(&mut self, config: &BarConfig) -> Vec<DecoError> {
        let mut errors = Vec::new();

        if !self.skins_loaded() {
            errors.extend(self.load_ninepatches(&config.ninepatch));
        }

        for button in self.buttons.iter_mut().filter(|b| b.images.is_none()) {
            button.load();
        }

        if config.title_enabled && matches!(self.font, FontSlot::Unloaded) {
            self.font = match text::load_font(&config.font) {
                Ok(font) => FontSlot::Loaded(font),
                Err(e) => {
                    errors.push(e);
                    FontSlot::Failed
                }
            };
        }

        errors
    }
}
