//! CPU composition of the cached bar textures.
//!
//! Every function here produces a fresh [`Pixmap`] in physical pixels. The
//! caller decides when a texture is stale; nothing in this module caches.

use fontdue::Font;
use tiny_skia::{
    FilterQuality, IntRect, Paint, Pattern, Pixmap, PixmapPaint, Rect, SpreadMode, Transform,
};

use crate::core::NinePatch;
use crate::types::{Color, Filter, Physical, Placement, Point, Rectangle, Size};

use super::text;

/// Fraction of the bar thickness the app icon takes up.
pub const ICON_FRACTION: f64 = 0.6;
/// Fraction of the bar thickness left as a gap before the app icon.
pub const ICON_PAD_FRACTION: f64 = 0.2;

pub(crate) fn quality(filter: Filter) -> FilterQuality {
    match filter {
        Filter::Linear => FilterQuality::Bilinear,
        Filter::Nearest => FilterQuality::Nearest,
    }
}

fn new_pixmap(size: Size<i32, Physical>) -> Option<Pixmap> {
    if size.width < 1 || size.height < 1 {
        return None
    }
    Pixmap::new(size.width as u32, size.height as u32)
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Cell {
    fn is_empty(&self) -> bool {
        self.w <= 0. || self.h <= 0.
    }
}

/// How the nine-patch background is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundStyle {
    /// Alpha of the center cell; `None` draws it opaque, zero or less skips it.
    pub middle_alpha: Option<f32>,
    /// Whether the center cell tiles instead of stretching.
    pub repeat: bool,
    /// Sampling used when stretching.
    pub filter: Filter,
}

/// Composes a nine-patch skin into a background of `size`.
///
/// The skin is cut into a 3x3 grid along its stretch borders. Corners are
/// copied at `scale`, edge strips stretch along their edge, and the center
/// either stretches or tiles. Cells that end up empty are skipped.
pub fn compose_background(
    patch: &NinePatch,
    size: Size<i32, Physical>,
    scale: f64,
    style: &BackgroundStyle,
) -> Option<Pixmap> {
    let mut out = new_pixmap(size)?;

    let (sw, sh) = (patch.image.width() as f32, patch.image.height() as f32);
    let [bl, bt, br, bb] = patch.info.border.map(|b| b as f32);
    let scale = scale as f32;
    let (w, h) = (size.width as f32, size.height as f32);

    let sx = [0., bl, sw - br, sw];
    let sy = [0., bt, sh - bb, sh];
    let dx = [0., bl * scale, w - br * scale, w];
    let dy = [0., bt * scale, h - bb * scale, h];

    for i in 0..3 {
        for j in 0..3 {
            let center = i == 1 && j == 1;
            let alpha = if center { style.middle_alpha.unwrap_or(1.) } else { 1. };
            if alpha <= 0. {
                continue
            }

            let src = Cell { x: sx[i], y: sy[j], w: sx[i + 1] - sx[i], h: sy[j + 1] - sy[j] };
            let dst = Cell { x: dx[i], y: dy[j], w: dx[i + 1] - dx[i], h: dy[j + 1] - dy[j] };
            if src.is_empty() || dst.is_empty() {
                continue
            }

            let Some(cell) = IntRect::from_xywh(src.x as i32, src.y as i32, src.w as u32, src.h as u32)
                .and_then(|r| patch.image.clone_rect(r))
            else {
                continue
            };

            if center && style.repeat {
                tile(&mut out, &cell, dst, alpha.min(1.));
            } else {
                stretch(&mut out, &cell, src, dst, alpha.min(1.), quality(style.filter));
            }
        }
    }

    Some(out)
}

fn stretch(out: &mut Pixmap, cell: &Pixmap, src: Cell, dst: Cell, alpha: f32, quality: FilterQuality) {
    let paint = PixmapPaint {
        opacity: alpha,
        quality,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(
        0,
        0,
        cell.as_ref(),
        &paint,
        Transform::from_row(dst.w / src.w, 0., 0., dst.h / src.h, dst.x, dst.y),
        None,
    );
}

fn tile(out: &mut Pixmap, cell: &Pixmap, dst: Cell, alpha: f32) {
    let Some(rect) = Rect::from_xywh(dst.x, dst.y, dst.w, dst.h) else {
        return
    };
    let paint = Paint {
        shader: Pattern::new(
            cell.as_ref(),
            SpreadMode::Repeat,
            FilterQuality::Nearest,
            alpha,
            Transform::from_translate(dst.x, dst.y),
        ),
        ..Paint::default()
    };
    out.fill_rect(rect, &paint, Transform::identity(), None);
}

/// Where the title goes within the content rect.
///
/// All lengths are physical pixels along the primary axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleLayout {
    /// The edge the content rect is on.
    pub placement: Placement,
    /// Whether the button row sits at the far end.
    pub buttons_right: bool,
    /// Anchor of the title within its available space, from 0.0 to 1.0.
    pub align: f32,
    /// Uniform padding at either end.
    pub padding: f32,
    /// Space taken by the button row.
    pub buttons_span: f32,
    /// Space taken by the app icon.
    pub icon_reserved: f32,
}

impl TitleLayout {
    fn reserved(&self) -> f32 {
        2. * self.padding + self.buttons_span + self.icon_reserved
    }

    /// The width left for the title in a content rect `length` long.
    pub fn max_width(&self, length: f32) -> f32 {
        (length - self.reserved()).max(0.)
    }

    /// The start of a title `text_width` wide in a content rect `length` long.
    pub fn text_x(&self, length: f32, text_width: f32) -> f32 {
        let available = length - self.reserved();
        let before_buttons = if self.buttons_right { 0. } else { self.buttons_span };
        (self.padding + before_buttons + self.icon_reserved
            + (available - text_width) * self.align.clamp(0., 1.))
        .round()
    }
}

/// The text and style of a title.
#[derive(Debug, Clone, Copy)]
pub struct TitleText<'a> {
    /// The window title.
    pub text: &'a str,
    /// Font size in physical pixels.
    pub px: f32,
    /// The title color.
    pub color: Color,
}

/// Composes the title into a texture as large as the content rect.
///
/// Text is laid out horizontally, ellipsized to its available width, and
/// centered across the bar. For left/right bars it is rotated to read
/// bottom-up and top-down respectively.
pub fn compose_title(
    size: Size<i32, Physical>,
    font: &Font,
    title: &TitleText<'_>,
    layout: &TitleLayout,
) -> Option<Pixmap> {
    let vertical = layout.placement.is_vertical();
    let horizontal = if vertical { size.transposed() } else { size };
    let mut flat = new_pixmap(horizontal)?;

    let (length, thickness) = (horizontal.width as f32, horizontal.height as f32);
    let shown = text::ellipsize(font, title.text, title.px, layout.max_width(length));
    if !shown.is_empty() {
        let width = text::measure(font, &shown, title.px);
        let metrics = text::line_metrics(font, title.px);
        let x = layout.text_x(length, width);
        let top = ((thickness - metrics.height) / 2.).round();
        text::draw_text(&mut flat, font, &shown, title.px, x, top + metrics.ascent, title.color);
    }

    if vertical {
        rotate(&flat, layout.placement)
    } else {
        Some(flat)
    }
}

/// Rotates a horizontally laid out texture onto a vertical bar.
fn rotate(flat: &Pixmap, placement: Placement) -> Option<Pixmap> {
    let (lw, lh) = (flat.width() as f32, flat.height() as f32);
    let transform = match placement {
        Placement::Left => Transform::from_row(0., -1., 1., 0., 0., lw),
        Placement::Right => Transform::from_row(0., 1., -1., 0., lh, 0.),
        Placement::Top | Placement::Bottom => return Some(flat.clone()),
    };

    let mut out = Pixmap::new(flat.height(), flat.width())?;
    let paint = PixmapPaint {
        quality: FilterQuality::Nearest,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(0, 0, flat.as_ref(), &paint, transform, None);
    Some(out)
}

/// Composes the button row into a texture as large as the content rect.
///
/// Each entry is a button rect, relative to the content rect, and the image
/// to stretch into it.
pub fn compose_buttons<'a, I>(size: Size<i32, Physical>, buttons: I) -> Option<Pixmap>
where
    I: IntoIterator<Item = (Rectangle<f64, Physical>, &'a Pixmap)>,
{
    let mut out = new_pixmap(size)?;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };

    for (rect, image) in buttons {
        let rect = rect.round();
        if rect.size.width < 1 || rect.size.height < 1 {
            continue
        }
        let sx = rect.size.width as f32 / image.width() as f32;
        let sy = rect.size.height as f32 / image.height() as f32;
        out.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &paint,
            Transform::from_row(sx, 0., 0., sy, rect.point.x as f32, rect.point.y as f32),
            None,
        );
    }

    Some(out)
}

/// The thickness of a content rect, across its primary axis.
fn thickness(placement: Placement, content: &Rectangle<f64, Physical>) -> f64 {
    if placement.is_vertical() { content.size.width } else { content.size.height }
}

/// The side of the square app icon for a content rect.
pub fn icon_size(placement: Placement, content: &Rectangle<f64, Physical>) -> u32 {
    (thickness(placement, content) * ICON_FRACTION).max(0.) as u32
}

/// Where an icon of `icon` size is drawn within `content`.
///
/// The icon sits a fixed fraction of the bar thickness from the start of the
/// content rect, centered across it, and shifted by `offset`.
pub fn icon_rect(
    placement: Placement,
    content: &Rectangle<f64, Physical>,
    icon: Size<i32, Physical>,
    offset: Point<f64, Physical>,
) -> Rectangle<i32, Physical> {
    let pad = (thickness(placement, content) * ICON_PAD_FRACTION).round();
    let (x, y) = if placement.is_vertical() {
        (
            content.point.x + ((content.size.width - icon.width as f64) / 2.).round(),
            content.point.y + pad,
        )
    } else {
        (
            content.point.x + pad,
            content.point.y + ((content.size.height - icon.height as f64) / 2.).round(),
        )
    };

    let origin = Point::<f64, Physical>::new(x + offset.x, y + offset.y).round();
    Rectangle::new(origin.x, origin.y, icon.width, icon.height)
}
