//! Font lookup and text rasterization.
//!
//! Text is laid out on a single line with `fontdue`, using kerning where the
//! font provides it. There is no shaping beyond that.

use std::fs;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use tiny_skia::Pixmap;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::types::Color;
use crate::{decoerr, Result};

const ELLIPSIS: char = '\u{2026}';

/// Families tried, in order, for the generic `sans`/`sans-serif` family.
const SANS_FALLBACKS: &[&str] = &["dejavusans", "notosans", "liberationsans", "cantarell", "roboto"];

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [dirs::font_dir(), dirs::data_dir().map(|d| d.join("fonts"))]
        .into_iter()
        .flatten()
        .collect();
    if let Some(home) = dirs::home_dir() {
        dirs.push(home.join(".fonts"));
    }
    dirs.extend(["/usr/share/fonts", "/usr/local/share/fonts"].map(PathBuf::from));
    dirs
}

/// Normalizes a family or file name for comparison: lowercase, without
/// spaces, dashes or underscores.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf"))
}

/// Ranks a font file against a normalized family name; lower is better.
fn rank(stem: &str, family: &str) -> Option<u8> {
    let rest = stem.strip_prefix(family)?;
    match rest {
        "" | "regular" => Some(0),
        "book" | "roman" | "medium" => Some(1),
        _ if rest.contains("bold") || rest.contains("italic") || rest.contains("oblique") => Some(3),
        _ => Some(2),
    }
}

/// Finds the file of the regular face of `family` in the usual font directories.
pub fn find_font(family: &str) -> Option<PathBuf> {
    let family = normalize(family);
    let families: Vec<String> = if matches!(family.as_str(), "sans" | "sansserif") {
        SANS_FALLBACKS.iter().map(|s| s.to_string()).collect()
    } else {
        vec![family]
    };

    let candidates: Vec<PathBuf> = font_dirs()
        .into_iter()
        .flat_map(|dir| WalkDir::new(dir).follow_links(true).into_iter().filter_map(|e| e.ok()))
        .map(|entry| entry.into_path())
        .filter(|path| is_font_file(path))
        .collect();

    families.iter().find_map(|family| {
        candidates
            .iter()
            .filter_map(|path| {
                let stem = normalize(path.file_stem()?.to_str()?);
                rank(&stem, family).map(|r| (r, path))
            })
            .min_by_key(|(r, _)| *r)
            .map(|(_, path)| path.clone())
    })
}

/// Loads the font named by `spec`, which is either a path to a font file or
/// a family name.
#[instrument(level = "debug")]
pub fn load_font(spec: &str) -> Result<Font> {
    let direct = PathBuf::from(spec);
    let path = if direct.is_file() {
        direct
    } else {
        find_font(spec).ok_or_else(|| decoerr!(font: format!("no font file found for {spec:?}")))?
    };

    debug!("loading font from {}", path.display());
    let data = fs::read(&path)?;
    Font::from_bytes(data, FontSettings::default())
        .map_err(|e| decoerr!(font: format!("{}: {e}", path.display())))
}

/// Vertical metrics of a line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the line.
    pub ascent: f32,
    /// Height of the line.
    pub height: f32,
}

/// The line metrics of `font` at `px`.
pub fn line_metrics(font: &Font, px: f32) -> LineMetrics {
    match font.horizontal_line_metrics(px) {
        Some(m) => LineMetrics {
            ascent: m.ascent,
            height: m.ascent - m.descent,
        },
        None => LineMetrics { ascent: px, height: px },
    }
}

/// The advance width of `text` at `px`.
pub fn measure(font: &Font, text: &str, px: f32) -> f32 {
    let mut width = 0.;
    let mut prev = None;
    for ch in text.chars() {
        if let Some(prev) = prev {
            width += font.horizontal_kern(prev, ch, px).unwrap_or(0.);
        }
        width += font.metrics(ch, px).advance_width;
        prev = Some(ch);
    }
    width
}

/// Shortens `text` from the end, appending an ellipsis, until it fits in `max_width`.
///
/// Returns the text unchanged if it already fits, and an empty string if not
/// even the ellipsis fits.
pub fn ellipsize(font: &Font, text: &str, px: f32, max_width: f32) -> String {
    if measure(font, text, px) <= max_width {
        return text.to_string()
    }

    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().chain(Some(&ELLIPSIS)).collect();
        if measure(font, &candidate, px) <= max_width {
            return candidate
        }
    }

    let ellipsis = ELLIPSIS.to_string();
    if measure(font, &ellipsis, px) <= max_width {
        ellipsis
    } else {
        String::new()
    }
}

/// Draws `text` onto `target` with its baseline starting at (`x`, `baseline`).
pub fn draw_text(target: &mut Pixmap, font: &Font, text: &str, px: f32, x: f32, baseline: f32, color: Color) {
    let (r, g, b, a) = color.rgba_f32();
    let (tw, th) = (target.width() as i32, target.height() as i32);
    let stride = target.width() as usize;
    let data = target.data_mut();

    let mut pen = x;
    let mut prev = None;
    for ch in text.chars() {
        if let Some(prev) = prev {
            pen += font.horizontal_kern(prev, ch, px).unwrap_or(0.);
        }
        let (metrics, coverage) = font.rasterize(ch, px);

        let left = (pen + metrics.xmin as f32).round() as i32;
        let top = (baseline - metrics.ymin as f32 - metrics.height as f32).round() as i32;

        for gy in 0..metrics.height as i32 {
            let y = top + gy;
            if y < 0 || y >= th {
                continue
            }
            for gx in 0..metrics.width as i32 {
                let x = left + gx;
                if x < 0 || x >= tw {
                    continue
                }
                let cov = coverage[(gy as usize) * metrics.width + gx as usize] as f32 / 255.;
                let sa = a * cov;
                if sa <= 0. {
                    continue
                }
                let i = ((y as usize) * stride + x as usize) * 4;
                let px = &mut data[i..i + 4];
                // source-over onto premultiplied pixels
                let inv = 1. - sa;
                px[0] = (r * sa * 255. + px[0] as f32 * inv).round() as u8;
                px[1] = (g * sa * 255. + px[1] as f32 * inv).round() as u8;
                px[2] = (b * sa * 255. + px[2] as f32 * inv).round() as u8;
                px[3] = (sa * 255. + px[3] as f32 * inv).round() as u8;
            }
        }

        pen += metrics.advance_width;
        prev = Some(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("DejaVu Sans"), "dejavusans");
        assert_eq!(normalize("Noto_Sans-Regular"), "notosansregular");
    }

    #[test]
    fn test_rank_prefers_regular() {
        assert_eq!(rank("dejavusans", "dejavusans"), Some(0));
        assert_eq!(rank("dejavusansbold", "dejavusans"), Some(3));
        assert_eq!(rank("dejavusansmono", "dejavusans"), Some(2));
        assert_eq!(rank("roboto", "dejavusans"), None);
    }

    #[test]
    fn test_missing_font_is_an_error() {
        assert!(load_font("surely-no-such-font-family-exists").is_err());
    }
}
