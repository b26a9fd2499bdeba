//! Decoding of nine-patch skins and icons.
//!
//! A nine-patch is a PNG whose outermost 1px border carries opaque black marker
//! pixels. Markers on the top and left edges delimit the stretchable region of
//! the image, markers on the bottom and right edges delimit the content area.
//! Everything inside the border is the actual skin.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tiny_skia::{FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};
use tracing::{debug, instrument};

use crate::{DecoError, Result};

/// Stretch borders and content padding parsed out of a nine-patch image.
///
/// All values are in source pixels, ordered left, top, right, bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NinePatchInfo {
    /// Widths of the fixed (non-stretching) regions on each edge.
    pub border: [u32; 4],
    /// Content insets on each edge.
    pub padding: [u32; 4],
    /// Whether the image was large enough to carry markers at all.
    pub defined: bool,
}

/// A decoded nine-patch: the skin with its marker border removed, and the parsed metadata.
#[derive(Debug, Clone)]
pub struct NinePatch {
    /// The skin image, without the 1px marker border.
    pub image: Pixmap,
    /// The parsed metadata.
    pub info: NinePatchInfo,
}

/// Decodes a PNG file into a premultiplied pixmap.
pub fn decode_png(path: &Path) -> Result<Pixmap> {
    let decode_err = |reason: String| DecoError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| decode_err(e.to_string()))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(|e| decode_err(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).map_err(|e| decode_err(e.to_string()))?;
    buf.truncate(frame.buffer_size());

    let rgba: Vec<u8> = match frame.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 0xff])
            .collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Grayscale => buf
            .iter()
            .flat_map(|&g| [g, g, g, 0xff])
            .collect(),
        other => return Err(decode_err(format!("unsupported color type {other:?}"))),
    };

    pixmap_from_rgba(rgba, frame.width, frame.height)
        .ok_or_else(|| decode_err("image has no pixels".into()))
}

/// Builds a pixmap from straight-alpha RGBA bytes.
pub(crate) fn pixmap_from_rgba(mut rgba: Vec<u8>, width: u32, height: u32) -> Option<Pixmap> {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(rgba, IntSize::from_wh(width, height)?)
}

fn is_marker(image: &Pixmap, x: u32, y: u32) -> bool {
    image
        .pixel(x, y)
        .map(|px| px.alpha() == 0xff && px.red() == 0 && px.green() == 0 && px.blue() == 0)
        .unwrap_or(false)
}

/// Finds the first and last marked index along one edge, excluding the corners.
fn marker_span<F>(len: u32, marked: F) -> Option<(u32, u32)>
where
    F: Fn(u32) -> bool,
{
    let mut span = None;
    for i in 1..len.saturating_sub(1) {
        if marked(i) {
            span = match span {
                None => Some((i, i)),
                Some((first, _)) => Some((first, i)),
            };
        }
    }
    span
}

/// Parses the marker border of `image`.
///
/// Images smaller than 3x3 cannot carry markers and yield an undefined patch.
pub fn parse_markers(image: &Pixmap) -> NinePatchInfo {
    let (w, h) = (image.width(), image.height());
    if w < 3 || h < 3 {
        return NinePatchInfo::default()
    }

    // converts a span along an edge of `len` pixels into (near, far) insets
    // relative to the cropped image, which is `len - 2` long
    let insets = |span: Option<(u32, u32)>, len: u32| match span {
        Some((first, last)) => (first - 1, (len - 2) - last),
        None => (0, 0),
    };

    let (bl, br) = insets(marker_span(w, |x| is_marker(image, x, 0)), w);
    let (bt, bb) = insets(marker_span(h, |y| is_marker(image, 0, y)), h);
    let (pl, pr) = insets(marker_span(w, |x| is_marker(image, x, h - 1)), w);
    let (pt, pb) = insets(marker_span(h, |y| is_marker(image, w - 1, y)), h);

    NinePatchInfo {
        border: [bl, bt, br, bb],
        padding: [pl, pt, pr, pb],
        defined: true,
    }
}

/// Loads a nine-patch from a PNG file.
///
/// Images of at least 3x3 pixels have their marker border parsed and cropped
/// off. Smaller images are returned as-is, with an undefined patch.
#[instrument(level = "debug")]
pub fn load(path: &Path) -> Result<NinePatch> {
    let image = decode_png(path)?;
    let info = parse_markers(&image);

    if !info.defined {
        debug!("{} is too small to carry markers", path.display());
        return Ok(NinePatch { image, info })
    }

    let crop = tiny_skia::IntRect::from_xywh(1, 1, image.width() - 2, image.height() - 2)
        .and_then(|r| image.clone_rect(r))
        .ok_or_else(|| DecoError::Decode {
            path: path.to_path_buf(),
            reason: "nine-patch has no content inside its marker border".into(),
        })?;

    debug!(?info, "parsed nine-patch {}", path.display());
    Ok(NinePatch { image: crop, info })
}

/// Decodes an image and letterboxes it into a `target`x`target` square,
/// preserving its aspect ratio and centering it.
#[instrument(level = "debug")]
pub fn load_scaled_icon(path: &Path, target: u32) -> Result<Pixmap> {
    let source = decode_png(path)?;
    scale_into_square(&source, target).ok_or_else(|| DecoError::Decode {
        path: path.to_path_buf(),
        reason: format!("cannot scale icon into {target}x{target}"),
    })
}

pub(crate) fn scale_into_square(source: &Pixmap, target: u32) -> Option<Pixmap> {
    let mut out = Pixmap::new(target, target)?;

    let (w, h) = (source.width() as f32, source.height() as f32);
    let scale = target as f32 / w.max(h);
    let (sw, sh) = (w * scale, h * scale);
    let (dx, dy) = ((target as f32 - sw) / 2., (target as f32 - sh) / 2.);

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &paint,
        Transform::from_row(scale, 0., 0., scale, dx, dy),
        None,
    );
    Some(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::io::BufWriter;
    use std::path::PathBuf;

    /// Writes a straight-alpha RGBA buffer to `path` as a PNG.
    pub(crate) fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(rgba).unwrap();
    }

    /// Builds a nine-patch source image: a grey skin with markers at the given
    /// source columns/rows (inclusive ranges, in full-image coordinates).
    pub(crate) fn ninepatch_pixels(
        width: u32,
        height: u32,
        top: (u32, u32),
        left: (u32, u32),
        bottom: (u32, u32),
        right: (u32, u32),
    ) -> Vec<u8> {
        let mut buf = vec![0u8; (width * height * 4) as usize];
        let mut set = |x: u32, y: u32, px: [u8; 4]| {
            let i = ((y * width + x) * 4) as usize;
            buf[i..i + 4].copy_from_slice(&px);
        };
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                set(x, y, [0x80, 0x80, 0x80, 0xff]);
            }
        }
        for x in top.0..=top.1 {
            set(x, 0, [0, 0, 0, 0xff]);
        }
        for y in left.0..=left.1 {
            set(0, y, [0, 0, 0, 0xff]);
        }
        for x in bottom.0..=bottom.1 {
            set(x, height - 1, [0, 0, 0, 0xff]);
        }
        for y in right.0..=right.1 {
            set(width - 1, y, [0, 0, 0, 0xff]);
        }
        buf
    }

    fn fixture(dir: &Path) -> PathBuf {
        let path = dir.join("bar.9.png");
        let px = ninepatch_pixels(12, 10, (3, 8), (2, 6), (4, 7), (3, 5));
        write_png(&path, 12, 10, &px);
        path
    }

    #[test]
    fn test_parse_markers() {
        let dir = tempfile::tempdir().unwrap();
        let patch = load(&fixture(dir.path())).unwrap();

        assert!(patch.info.defined);
        // top: first 3, last 8 on a 12 wide image -> (2, 10 - 8)
        // left: first 2, last 6 on a 10 high image -> (1, 8 - 6)
        assert_eq!(patch.info.border, [2, 1, 2, 2]);
        // bottom: (4, 7) -> (3, 3); right: (3, 5) -> (2, 3)
        assert_eq!(patch.info.padding, [3, 2, 3, 3]);
        assert_eq!((patch.image.width(), patch.image.height()), (10, 8));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(dir.path());

        let first = load(&path).unwrap();
        let second = load(&path).unwrap();
        assert_eq!(first.info, second.info);
        assert_eq!(first.image.data(), second.image.data());
    }

    #[test]
    fn test_unmarked_edges_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        write_png(&path, 4, 4, &[0x80; 4 * 4 * 4]);

        let patch = load(&path).unwrap();
        assert!(patch.info.defined);
        assert_eq!(patch.info.border, [0; 4]);
        assert_eq!(patch.info.padding, [0; 4]);
    }

    #[test]
    fn test_tiny_image_is_undefined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        write_png(&path, 2, 2, &[0xff; 2 * 2 * 4]);

        let patch = load(&path).unwrap();
        assert!(!patch.info.defined);
        assert_eq!((patch.image.width(), patch.image.height()), (2, 2));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = load(Path::new("/nonexistent/decobar/missing.png")).unwrap_err();
        assert!(matches!(err, DecoError::Decode { .. }));
    }

    #[test]
    fn test_scaled_icon_letterboxes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        write_png(&path, 8, 4, &[0xff; 8 * 4 * 4]);

        let icon = load_scaled_icon(&path, 16).unwrap();
        assert_eq!((icon.width(), icon.height()), (16, 16));
        // 8x4 scales to 16x8, centered vertically: rows 0..4 are empty
        assert_eq!(icon.pixel(8, 1).unwrap().alpha(), 0);
        assert_eq!(icon.pixel(8, 8).unwrap().alpha(), 0xff);
    }
}
