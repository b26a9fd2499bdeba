//! Basic core types used throughout this crate at a high level.

pub mod geometry;

pub use geometry::*;

use std::str::FromStr;

use strum::{Display, EnumString, AsRefStr};

use crate::{DecoError, decoerr};

/// The edge of the window that the bar's content (title, icon, buttons) sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Placement {
    /// Along the top edge.
    #[default]
    Top,
    /// Along the bottom edge.
    Bottom,
    /// Along the left edge, with the text reading bottom to top.
    Left,
    /// Along the right edge, with the text reading top to bottom.
    Right,
}

impl Placement {
    /// Whether the primary (layout) axis of the bar is vertical.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Placement::Left | Placement::Right)
    }
}

/// Which end of the content rect the button row starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonAlignment {
    /// Buttons start at the near edge.
    Left,
    /// Buttons start at the far edge.
    #[default]
    Right,
}

/// The sampling filter to use when scaling a texture.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    #[default]
    Linear,
    Nearest,
}

/// A representation of a color, following the RGBA model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(u32);

impl Color {
    /// Fully opaque white.
    pub const WHITE: Color = Color(0xffffffff);

    /// Creates the Color from a 32-bit RGBA integer.
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex)
    }

    /// Creates the Color from its components.
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    /// Creates the Color from components expressed as proportions of max intensity.
    ///
    /// Components are clamped to `[0.0, 1.0]`.
    pub fn from_rgba_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        let conv = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::from_rgba(conv(r), conv(g), conv(b), conv(a))
    }

    /// Expresses the Color as a hex string.
    pub fn as_string(&self) -> String {
        format!("{:#010x}", self.as_u32())
    }

    /// Returns the (R, G, B, A) values of the Color
    /// as bytes.
    pub fn rgba(&self) -> (u8, u8, u8, u8) {
        let [r, g, b, a] = u32::to_be_bytes(self.0);
        (r, g, b, a)
    }

    /// Returns the (R, G, B, A) components of the Color
    /// as proportions of max intensity (255.0).
    pub fn rgba_f32(&self) -> (f32, f32, f32, f32) {
        let (r, g, b, a) = self.rgba();

        (
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// The alpha component as a proportion.
    pub fn alpha(&self) -> f32 {
        self.rgba_f32().3
    }

    /// Returns a copy of the Color with its alpha multiplied by `factor`.
    pub fn with_alpha_mul(&self, factor: f32) -> Self {
        let (r, g, b, a) = self.rgba_f32();
        Self::from_rgba_f32(r, g, b, a * factor)
    }

    /// Linearly interpolates each component between `self` and `other`.
    ///
    /// `t` is clamped to `[0.0, 1.0]`; 0 yields `self`, 1 yields `other`.
    pub fn lerp(&self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let (r1, g1, b1, a1) = self.rgba_f32();
        let (r2, g2, b2, a2) = other.rgba_f32();
        Self::from_rgba_f32(
            r1 + (r2 - r1) * t,
            g1 + (g2 - g1) * t,
            b1 + (b2 - b1) * t,
            a1 + (a2 - a1) * t,
        )
    }

    /// Returns the color as a u32.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Color {
    fn from(from: u32) -> Self {
        Self::from_hex(from)
    }
}

/// Parses the color formats accepted in configuration:
///
/// - `rgba(RRGGBBAA)`
/// - `rgb(RRGGBB)`, fully opaque
/// - `0xAARRGGBB`, alpha first
impl FromStr for Color {
    type Err = DecoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse_hex = |hex: &str, digits: usize| {
            if hex.len() != digits {
                return Err(decoerr!(config: format!("bad color literal {s:?}")));
            }
            u32::from_str_radix(hex, 16)
                .map_err(|_| decoerr!(config: format!("bad color literal {s:?}")))
        };

        if let Some(inner) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            Ok(Color(parse_hex(inner.trim(), 8)?))
        } else if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            Ok(Color((parse_hex(inner.trim(), 6)? << 8) | 0xff))
        } else if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let argb = parse_hex(hex, 8)?;
            Ok(Color(argb.rotate_left(8)))
        } else {
            Err(decoerr!(config: format!("unrecognised color {s:?}")))
        }
    }
}

/// A fixed-size set of button indices, used for hover tracking.
///
/// Indices past the capacity of the set are never reported as members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonSet(u64);

impl ButtonSet {
    /// The number of button indices the set can hold.
    pub const CAPACITY: usize = u64::BITS as usize;

    /// Creates an empty set.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Adds `idx` to the set, returning whether it was newly inserted.
    pub fn insert(&mut self, idx: usize) -> bool {
        if idx >= Self::CAPACITY {
            return false
        }
        let had = self.contains(idx);
        self.0 |= 1 << idx;
        !had
    }

    /// Removes `idx` from the set, returning whether it was present.
    pub fn remove(&mut self, idx: usize) -> bool {
        if idx >= Self::CAPACITY {
            return false
        }
        let had = self.contains(idx);
        self.0 &= !(1 << idx);
        had
    }

    /// Whether `idx` is in the set.
    pub fn contains(&self, idx: usize) -> bool {
        idx < Self::CAPACITY && self.0 & (1 << idx) != 0
    }

    /// Removes every index.
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
