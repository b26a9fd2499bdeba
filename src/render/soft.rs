//! A [`Renderer`] that draws into an in-memory [`Pixmap`].
//!
//! Used by the preview binary and the tests. Blur is not supported and is
//! silently ignored; rounded corners are drawn as quadratic curves whatever
//! their exponent.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use custom_debug_derive::Debug;
use tiny_skia::{FillRule, Mask, Paint, Path as SkPath, PathBuilder, Pixmap, PixmapPaint, Rect, Transform};
use tracing::{debug, trace};

use crate::types::{Color, Physical, Rectangle};
use crate::{DecoError, Result};

use super::{compose, Cutout, RectStyle, Renderer, Texture};

/// Renders decorations into a pixmap.
#[derive(Debug)]
pub struct SoftwareRenderer {
    #[debug(skip)]
    target: Pixmap,
    scissor: Option<Rectangle<i32, Physical>>,
    cutout: Option<Cutout>,
    #[debug(skip)]
    mask: Option<Mask>,
    seen: HashSet<u64>,
    uploads: usize,
}

impl SoftwareRenderer {
    /// Creates a renderer with a transparent target of the given size.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            target: Pixmap::new(width, height)?,
            scissor: None,
            cutout: None,
            mask: None,
            seen: HashSet::new(),
            uploads: 0,
        })
    }

    /// The render target.
    pub fn pixmap(&self) -> &Pixmap {
        &self.target
    }

    /// Fills the whole target, ignoring scissor and cutout.
    pub fn clear(&mut self, color: Color) {
        let (r, g, b, a) = color.rgba();
        self.target.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    /// How many distinct textures have been drawn so far.
    ///
    /// Since every regenerated texture has a new id, this counts texture
    /// regenerations as a GPU renderer would see them.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Writes the target to a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.target
            .save_png(path)
            .map_err(|e| DecoError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))
    }

    fn full_rect(&self) -> Option<Rect> {
        Rect::from_xywh(0., 0., self.target.width() as f32, self.target.height() as f32)
    }

    fn rebuild_mask(&mut self) {
        self.mask = None;
        if self.scissor.is_none() && self.cutout.is_none() {
            return
        }

        let Some(mut mask) = Mask::new(self.target.width(), self.target.height()) else {
            return
        };
        let Some(full) = self.full_rect() else {
            return
        };

        let region = self.scissor.and_then(to_rect).unwrap_or(full);
        mask.fill_path(&PathBuilder::from_rect(region), FillRule::Winding, false, Transform::identity());

        if let Some(cutout) = self.cutout {
            // everything but the rounded cutout
            let mut pb = PathBuilder::new();
            pb.push_rect(full);
            if let Some(hole) = to_rect(cutout.rect).and_then(|r| rounded_rect(r, cutout.radius)) {
                pb.push_path(&hole);
            }
            if let Some(path) = pb.finish() {
                mask.intersect_path(&path, FillRule::EvenOdd, true, Transform::identity());
            }
        }

        self.mask = Some(mask);
    }
}

fn to_rect(rect: Rectangle<i32, Physical>) -> Option<Rect> {
    Rect::from_xywh(
        rect.point.x as f32,
        rect.point.y as f32,
        rect.size.width as f32,
        rect.size.height as f32,
    )
}

/// A rectangle path with its corners rounded by `radius`.
fn rounded_rect(rect: Rect, radius: f32) -> Option<SkPath> {
    let r = radius.clamp(0., rect.width().min(rect.height()) / 2.);
    if r <= 0. {
        return Some(PathBuilder::from_rect(rect))
    }

    let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.quad_to(rt, t, rt, t + r);
    pb.line_to(rt, b - r);
    pb.quad_to(rt, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.quad_to(l, b, l, b - r);
    pb.line_to(l, t + r);
    pb.quad_to(l, t, l + r, t);
    pb.close();
    pb.finish()
}

impl Renderer for SoftwareRenderer {
    fn blit(&mut self, texture: &Texture, dest: Rectangle<i32, Physical>, alpha: f32) {
        if dest.is_empty() || alpha <= 0. {
            return
        }
        if self.seen.insert(texture.id()) {
            self.uploads += 1;
            debug!(id = texture.id(), "uploading texture");
        }

        let size = texture.size();
        let sx = dest.size.width as f32 / size.width as f32;
        let sy = dest.size.height as f32 / size.height as f32;
        let paint = PixmapPaint {
            opacity: alpha.min(1.),
            quality: compose::quality(texture.filter()),
            ..PixmapPaint::default()
        };

        trace!(id = texture.id(), ?dest, "blit");
        self.target.draw_pixmap(
            0,
            0,
            texture.pixmap().as_ref(),
            &paint,
            Transform::from_row(sx, 0., 0., sy, dest.point.x as f32, dest.point.y as f32),
            self.mask.as_ref(),
        );
    }

    fn fill_rect(&mut self, rect: Rectangle<i32, Physical>, color: Color, style: &RectStyle) {
        let Some(path) = to_rect(rect).and_then(|r| rounded_rect(r, style.rounding)) else {
            return
        };

        let (r, g, b, a) = color.rgba();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        self.target
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), self.mask.as_ref());
    }

    fn set_scissor(&mut self, rect: Option<Rectangle<i32, Physical>>) {
        if self.scissor != rect {
            self.scissor = rect;
            self.rebuild_mask();
        }
    }

    fn set_cutout(&mut self, cutout: Option<Cutout>) {
        if self.cutout != cutout {
            self.cutout = cutout;
            self.rebuild_mask();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::Filter;

    fn alpha_at(r: &SoftwareRenderer, x: u32, y: u32) -> u8 {
        r.pixmap().pixel(x, y).unwrap().alpha()
    }

    fn solid(width: u32, height: u32) -> Texture {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(tiny_skia::Color::WHITE);
        Texture::new(pixmap, Filter::Nearest)
    }

    #[test]
    fn test_scissor_limits_drawing() {
        let mut r = SoftwareRenderer::new(20, 20).unwrap();
        r.set_scissor(Some(Rectangle::new(0, 0, 10, 20)));
        r.fill_rect(Rectangle::new(0, 0, 20, 20), Color::WHITE, &RectStyle::default());

        assert_eq!(alpha_at(&r, 5, 5), 255);
        assert_eq!(alpha_at(&r, 15, 5), 0);
    }

    #[test]
    fn test_cutout_is_excluded() {
        let mut r = SoftwareRenderer::new(20, 20).unwrap();
        r.set_cutout(Some(Cutout {
            rect: Rectangle::new(5, 5, 10, 10),
            radius: 0.,
            power: 2.,
        }));
        r.fill_rect(Rectangle::new(0, 0, 20, 20), Color::WHITE, &RectStyle::default());

        assert_eq!(alpha_at(&r, 2, 2), 255);
        assert_eq!(alpha_at(&r, 10, 10), 0);

        r.set_cutout(None);
        r.fill_rect(Rectangle::new(0, 0, 20, 20), Color::WHITE, &RectStyle::default());
        assert_eq!(alpha_at(&r, 10, 10), 255);
    }

    #[test]
    fn test_blit_counts_uploads_once() {
        let mut r = SoftwareRenderer::new(10, 10).unwrap();
        let tex = solid(2, 2);

        r.blit(&tex, Rectangle::new(0, 0, 2, 2), 1.);
        r.blit(&tex, Rectangle::new(4, 4, 2, 2), 1.);
        assert_eq!(r.uploads(), 1);
        assert_eq!(alpha_at(&r, 5, 5), 255);

        r.blit(&solid(2, 2), Rectangle::new(0, 0, 2, 2), 1.);
        assert_eq!(r.uploads(), 2);
    }

    #[test]
    fn test_blit_alpha() {
        let mut r = SoftwareRenderer::new(4, 4).unwrap();
        r.blit(&solid(4, 4), Rectangle::new(0, 0, 4, 4), 0.5);

        let a = alpha_at(&r, 1, 1);
        assert!((126..=129).contains(&a), "alpha {a}");
    }
}
