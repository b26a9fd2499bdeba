//! Button declarations.
//!
//! A button is declared with a single config line of comma-separated fields:
//!
//! ```text
//! size, command, active[, inactive[, hover[, pressed]]]
//! ```
//!
//! With exactly one texture, the texture is a base name and each variant is
//! found by suffix probing (see [`paths`](super::paths)).

use std::path::PathBuf;

use tracing::debug;

use crate::types::{Logical, Size};
use crate::{decoerr, Result};

use super::paths;

/// The size a button takes if neither its declaration nor its texture gives it one.
pub const DEFAULT_BUTTON_SIZE: f64 = 20.;

/// The four texture slots of a button, already resolved through their
/// fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonTextures {
    /// Drawn on focused windows, and the fallback for every other slot.
    pub active: PathBuf,
    /// Drawn on unfocused windows. Falls back to `active`.
    pub inactive: PathBuf,
    /// Drawn while hovered. Falls back to `active`.
    pub hover: PathBuf,
    /// Drawn while pressed. Falls back to `hover`.
    pub pressed: PathBuf,
}

/// A single declared button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonSpec {
    /// The declared size. Non-positive sizes are replaced with the size of
    /// the active texture, or [`DEFAULT_BUTTON_SIZE`], once it is first drawn.
    pub size: Size<f64, Logical>,
    /// The shell command run when the button is clicked.
    pub command: String,
    /// The texture paths of each state.
    pub textures: ButtonTextures,
}

impl ButtonSpec {
    /// Parses a button declaration line.
    ///
    /// Fails with [`DecoError::ConfigParse`](crate::DecoError::ConfigParse)
    /// if the size, command or first texture is empty, or the size is not a number.
    pub fn parse(line: &str) -> Result<ButtonSpec> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        let field = |i: usize| fields.get(i).copied().filter(|f| !f.is_empty());

        let (Some(size), Some(command), Some(texture)) = (field(0), field(1), field(2)) else {
            return Err(decoerr!(config: "size, command and active texture cannot be empty".into()));
        };

        let size: f64 = size
            .parse()
            .map_err(|_| decoerr!(config: format!("failed to parse button size {size:?}")))?;

        let textures = if fields.len() == 3 {
            Self::probe_textures(texture)
        } else {
            let active = PathBuf::from(texture);
            let inactive = field(3).map(PathBuf::from).unwrap_or_else(|| active.clone());
            let hover = field(4).map(PathBuf::from).unwrap_or_else(|| active.clone());
            let pressed = field(5).map(PathBuf::from).unwrap_or_else(|| hover.clone());
            ButtonTextures { active, inactive, hover, pressed }
        };

        debug!(size, command, ?textures, "parsed button");
        Ok(ButtonSpec {
            size: Size::new(size, size),
            command: command.to_string(),
            textures,
        })
    }

    fn probe_textures(base: &str) -> ButtonTextures {
        let base = PathBuf::from(base);
        let active = paths::probe(&base, paths::BUTTON_ACTIVE).unwrap_or_else(|| base.clone());
        let inactive = paths::probe(&base, paths::BUTTON_INACTIVE).unwrap_or_else(|| active.clone());
        let hover = paths::probe(&base, paths::BUTTON_HOVER).unwrap_or_else(|| active.clone());
        let pressed = paths::probe(&base, paths::BUTTON_PRESSED).unwrap_or_else(|| hover.clone());

        ButtonTextures { active, inactive, hover, pressed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::DecoError;

    #[test]
    fn test_parse_explicit_textures() {
        let button = ButtonSpec::parse("18, notify-send closing, close.png, close_dim.png").unwrap();

        assert_eq!(button.size, Size::new(18., 18.));
        assert_eq!(button.command, "notify-send closing");
        assert_eq!(button.textures.active, PathBuf::from("close.png"));
        assert_eq!(button.textures.inactive, PathBuf::from("close_dim.png"));
        assert_eq!(button.textures.hover, PathBuf::from("close.png"));
        assert_eq!(button.textures.pressed, PathBuf::from("close.png"));
    }

    #[test]
    fn test_pressed_falls_back_to_hover() {
        let button = ButtonSpec::parse("0, cmd, a.png, b.png, c.png").unwrap();
        assert_eq!(button.textures.pressed, PathBuf::from("c.png"));
    }

    #[test]
    fn test_parse_probes_single_texture() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("max.png"), b"").unwrap();
        fs::write(dir.path().join("max_hover.png"), b"").unwrap();

        let base = dir.path().join("max");
        let button = ButtonSpec::parse(&format!("20, cmd, {}", base.display())).unwrap();

        assert_eq!(button.textures.active, dir.path().join("max.png"));
        assert_eq!(button.textures.inactive, dir.path().join("max.png"));
        assert_eq!(button.textures.hover, dir.path().join("max_hover.png"));
        assert_eq!(button.textures.pressed, dir.path().join("max_hover.png"));
    }

    #[test]
    fn test_parse_errors() {
        for line in ["", "20, , a.png", ", cmd, a.png", "20, cmd", "big, cmd, a.png"] {
            let err = ButtonSpec::parse(line).unwrap_err();
            assert!(matches!(err, DecoError::ConfigParse(_)), "{line:?} gave {err:?}");
        }
    }
}
