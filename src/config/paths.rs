//! Resolution of texture base names into concrete files.
//!
//! Skins and button textures can be given as a base name instead of a full
//! path, in which case each variant is found by trying a list of suffixes
//! in order, both as-is and with a `.png` extension.

use std::path::{Path, PathBuf};

use tracing::trace;

/// Suffixes probed for the skin used on focused windows.
pub const NINEPATCH_ACTIVE: &[&str] = &["_active", "_focused", "active", ""];
/// Suffixes probed for the skin used on unfocused windows.
pub const NINEPATCH_INACTIVE: &[&str] = &["_inactive", "_unfocused", "inactive"];

/// Suffixes probed for a button's default texture.
pub const BUTTON_ACTIVE: &[&str] = &["", "_normal", "_active", "_focused"];
/// Suffixes probed for a button's texture on unfocused windows.
pub const BUTTON_INACTIVE: &[&str] = &["_unfocused", "_inactive"];
/// Suffixes probed for a button's hover texture.
pub const BUTTON_HOVER: &[&str] = &["_hover"];
/// Suffixes probed for a button's pressed texture.
pub const BUTTON_PRESSED: &[&str] = &["_pressed", "_clicked"];

/// Expands a leading `~/` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Returns the first existing file formed by appending one of `suffixes`
/// to `base`, trying each suffix as-is and then with `.png`.
pub fn probe(base: &Path, suffixes: &[&str]) -> Option<PathBuf> {
    let base = expand_home(base);
    let stem = base.as_os_str();

    suffixes
        .iter()
        .flat_map(|suffix| [String::from(*suffix), format!("{suffix}.png")])
        .map(|suffix| {
            let mut candidate = stem.to_os_string();
            candidate.push(suffix);
            PathBuf::from(candidate)
        })
        .find(|candidate| {
            let found = candidate.is_file();
            trace!(found, "probing {}", candidate.display());
            found
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_probe_prefers_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("close_focused.png"), b"").unwrap();
        fs::write(dir.path().join("close_active"), b"").unwrap();

        let found = probe(&dir.path().join("close"), BUTTON_ACTIVE).unwrap();
        assert_eq!(found, dir.path().join("close_active"));
    }

    #[test]
    fn test_probe_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("close_hover.png"), b"").unwrap();

        let found = probe(&dir.path().join("close"), BUTTON_HOVER);
        assert_eq!(found, Some(dir.path().join("close_hover.png")));
        assert_eq!(probe(&dir.path().join("close"), BUTTON_PRESSED), None);
    }
}
