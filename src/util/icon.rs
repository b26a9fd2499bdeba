//! The app id is looked up as `<app id>.desktop` in the XDG application
//! directories, flatpak exports included. The `Icon=` key of that entry is
//! either an absolute path or a name to look up in the icon themes. Only PNG
//! icons are used.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use freedesktop_desktop_entry::{DesktopEntry, Iter as DesktopIter};
use tracing::{debug, instrument};

const LOCALES: &[&str] = &["en_US", "en"];

/// The directories `.desktop` files are searched in, in order of preference.
pub fn application_dirs() -> Vec<PathBuf> {
    let mut ret = Vec::new();

    let data_home = env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")));
    if let Some(data_home) = data_home {
        ret.push(data_home.join("applications"));
    }

    let data_dirs = env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "/usr/local/share:/usr/share".into());
    ret.extend(
        data_dirs
            .split(':')
            .filter(|d| !d.is_empty())
            .map(|d| Path::new(d).join("applications")),
    );

    if let Some(home) = dirs::home_dir() {
        ret.push(home.join(".local/share/flatpak/exports/share/applications"));
    }
    ret.push(PathBuf::from("/var/lib/flatpak/exports/share/applications"));
    ret
}

/// Finds the `.desktop` file of `app_id` in `dirs`.
///
/// An exact file name match wins; otherwise the app id is matched against
/// file stems case-insensitively, since some clients report lowercase ids.
pub fn find_desktop_entry(app_id: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    if app_id.is_empty() {
        return None
    }

    let file = format!("{app_id}.desktop");
    dirs.iter()
        .map(|d| d.join(&file))
        .find(|p| p.is_file())
        .or_else(|| {
            DesktopIter::new(dirs.iter().cloned()).find(|p| {
                p.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.eq_ignore_ascii_case(app_id))
            })
        })
}

/// Reads the `Icon=` key of a `.desktop` file.
pub fn icon_key(entry: &Path) -> Option<String> {
    let bytes = fs::read_to_string(entry).ok()?;
    let desktop = DesktopEntry::from_str(entry, &bytes, Some(LOCALES)).ok()?;
    desktop
        .icon()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Resolves an `Icon=` value to a PNG file.
///
/// Absolute paths are used as they are; names are looked up in the icon
/// themes at `size`, then in `/usr/share/pixmaps`.
pub fn resolve_icon(key: &str, size: u16) -> Option<PathBuf> {
    let path = Path::new(key);
    if path.is_absolute() {
        return (path.is_file() && is_png(path)).then(|| path.to_path_buf())
    }

    linicon::lookup_icon(key)
        .with_size(size)
        .filter_map(|r| r.ok())
        .map(|found| found.path)
        .find(|p| is_png(p))
        .or_else(|| {
            let pixmap = PathBuf::from(format!("/usr/share/pixmaps/{key}.png"));
            pixmap.is_file().then_some(pixmap)
        })
}

/// Finds the PNG icon of the application with id `app_id`.
#[instrument(level = "debug")]
pub fn find_app_icon(app_id: &str, size: u16) -> Option<PathBuf> {
    let entry = find_desktop_entry(app_id, &application_dirs())?;
    let key = icon_key(&entry)?;
    let found = resolve_icon(&key, size);
    debug!(?found, "resolved icon {key:?}");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::ninepatch::tests::write_png;

    fn desktop_file(dir: &Path, name: &str, icon: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(
            &path,
            format!("[Desktop Entry]\nType=Application\nName=Test\nExec=true\nIcon={icon}\n"),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_find_desktop_entry() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = vec![dir.path().join("missing"), dir.path().to_path_buf()];
        let exact = desktop_file(dir.path(), "org.example.Foo.desktop", "foo");

        assert_eq!(find_desktop_entry("org.example.Foo", &dirs), Some(exact.clone()));
        assert_eq!(find_desktop_entry("org.example.foo", &dirs), Some(exact));
        assert_eq!(find_desktop_entry("bar", &dirs), None);
        assert_eq!(find_desktop_entry("", &dirs), None);
    }

    #[test]
    fn test_icon_key() {
        let dir = tempfile::tempdir().unwrap();
        let entry = desktop_file(dir.path(), "a.desktop", " firefox ");
        assert_eq!(icon_key(&entry).as_deref(), Some("firefox"));
    }

    #[test]
    fn test_absolute_icons_must_be_png() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("icon.png");
        write_png(&png, 1, 1, &[0xff; 4]);
        let svg = dir.path().join("icon.svg");
        fs::write(&svg, "<svg/>").unwrap();

        assert_eq!(resolve_icon(png.to_str().unwrap(), 32), Some(png));
        assert_eq!(resolve_icon(svg.to_str().unwrap(), 32), None);
    }
}
