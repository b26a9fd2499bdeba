//! Textures, the renderer interface, and composition of bar textures.
//!
//! Bar textures are composed on the CPU into [`Pixmap`]s and wrapped in a
//! [`Texture`], which carries a unique id. A host [`Renderer`] uploads a
//! texture the first time it sees its id; since a regenerated texture always
//! gets a new id, the id doubles as the texture's generation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use custom_debug_derive::Debug;
use tiny_skia::Pixmap;
use tracing::warn;

use crate::config::ButtonTextures;
use crate::core::ninepatch;
use crate::types::{Color, Filter, Physical, Rectangle, Size};

pub mod compose;
pub mod soft;
pub mod text;

#[doc(inline)]
pub use soft::SoftwareRenderer;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// A composed, immutable pixel buffer ready to be drawn.
#[derive(Debug)]
pub struct Texture {
    id: u64,
    #[debug(skip)]
    pixmap: Pixmap,
    filter: Filter,
}

impl Texture {
    /// Wraps a pixmap, giving it a fresh id.
    pub fn new(pixmap: Pixmap, filter: Filter) -> Self {
        Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            pixmap,
            filter,
        }
    }

    /// The unique id of this texture.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The size of the texture in pixels.
    pub fn size(&self) -> Size<i32, Physical> {
        Size::new(self.pixmap.width() as i32, self.pixmap.height() as i32)
    }

    /// The premultiplied RGBA pixels.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// The filter to sample the texture with when it is scaled.
    pub fn filter(&self) -> Filter {
        self.filter
    }
}

/// How a flat rectangle is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectStyle {
    /// Corner radius in physical pixels.
    pub rounding: f32,
    /// Exponent of the corner curve; 2.0 is circular.
    pub rounding_power: f32,
    /// Whether to blur what is behind the rectangle.
    pub blur: bool,
}

/// A rounded region the renderer must not draw into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutout {
    /// The excluded region.
    pub rect: Rectangle<i32, Physical>,
    /// Corner radius in physical pixels.
    pub radius: f32,
    /// Exponent of the corner curve.
    pub power: f32,
}

/// The drawing interface a host provides to the decorations.
///
/// All coordinates are physical pixels in the output being rendered.
pub trait Renderer {
    /// Draws `texture` stretched over `dest`, with its alpha multiplied by `alpha`.
    fn blit(&mut self, texture: &Texture, dest: Rectangle<i32, Physical>, alpha: f32);

    /// Fills `rect` with `color`.
    fn fill_rect(&mut self, rect: Rectangle<i32, Physical>, color: Color, style: &RectStyle);

    /// Restricts drawing to `rect`, or lifts the restriction.
    fn set_scissor(&mut self, rect: Option<Rectangle<i32, Physical>>);

    /// Excludes a rounded region from drawing, or lifts the exclusion.
    fn set_cutout(&mut self, cutout: Option<Cutout>);
}

/// The decoded textures of one button.
#[derive(Debug, Default)]
pub struct ButtonImages {
    #[debug(skip)]
    active: Option<Pixmap>,
    #[debug(skip)]
    inactive: Option<Pixmap>,
    #[debug(skip)]
    hover: Option<Pixmap>,
    #[debug(skip)]
    pressed: Option<Pixmap>,
}

impl ButtonImages {
    /// Decodes every texture of a button.
    ///
    /// Failures are logged and leave the slot empty. Paths shared between
    /// slots are decoded once.
    pub fn load(textures: &ButtonTextures) -> Self {
        let mut cache: HashMap<PathBuf, Option<Pixmap>> = HashMap::new();
        let mut load = |path: &Path| {
            cache
                .entry(path.to_path_buf())
                .or_insert_with(|| match ninepatch::decode_png(path) {
                    Ok(pixmap) => Some(pixmap),
                    Err(e) => {
                        warn!("could not load button texture: {e}");
                        None
                    }
                })
                .clone()
        };

        ButtonImages {
            active: load(&textures.active),
            inactive: load(&textures.inactive),
            hover: load(&textures.hover),
            pressed: load(&textures.pressed),
        }
    }

    /// The size of the active texture, if it loaded.
    pub fn natural_size(&self) -> Option<Size<f64, Physical>> {
        self.active
            .as_ref()
            .map(|p| Size::new(p.width() as f64, p.height() as f64))
    }

    /// Whether the active texture loaded. Buttons without one are never drawn.
    pub fn is_drawable(&self) -> bool {
        self.active.is_some()
    }

    /// Picks the texture for a button state.
    ///
    /// Pressed wins over hovered, which wins over the focus state. A slot that
    /// failed to load falls back to the active texture.
    pub fn select(&self, focused: bool, hovered: bool, pressed: bool) -> Option<&Pixmap> {
        let active = self.active.as_ref()?;
        let chosen = if pressed {
            self.pressed.as_ref()
        } else if hovered {
            self.hover.as_ref()
        } else if !focused {
            self.inactive.as_ref()
        } else {
            Some(active)
        };
        Some(chosen.unwrap_or(active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::ninepatch::tests::write_png;

    #[test]
    fn test_texture_ids_are_unique() {
        let a = Texture::new(Pixmap::new(1, 1).unwrap(), Filter::Linear);
        let b = Texture::new(Pixmap::new(1, 1).unwrap(), Filter::Linear);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.size(), Size::new(1, 1));
    }

    #[test]
    fn test_button_variant_selection() {
        let dir = tempfile::tempdir().unwrap();
        let active = dir.path().join("a.png");
        let hover = dir.path().join("h.png");
        write_png(&active, 2, 2, &[0xff; 16]);
        write_png(&hover, 3, 3, &[0xff; 36]);

        let images = ButtonImages::load(&ButtonTextures {
            active: active.clone(),
            inactive: dir.path().join("missing.png"),
            hover: hover.clone(),
            pressed: hover,
        });

        let width = |p: Option<&Pixmap>| p.map(|p| p.width());
        assert_eq!(width(images.select(true, false, false)), Some(2));
        // missing inactive falls back to active
        assert_eq!(width(images.select(false, false, false)), Some(2));
        assert_eq!(width(images.select(false, true, false)), Some(3));
        assert_eq!(width(images.select(true, false, true)), Some(3));
    }

    #[test]
    fn test_button_without_active_is_skipped() {
        let images = ButtonImages::load(&ButtonTextures {
            active: PathBuf::from("/nonexistent/a.png"),
            ..ButtonTextures::default()
        });
        assert!(!images.is_drawable());
        assert!(images.select(true, true, true).is_none());
    }
}
