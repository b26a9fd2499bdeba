//! The bar configuration snapshot and its builder.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::{ButtonAlignment, Color, Placement, Point, Logical};
use crate::{Result, DecoError::InvalidConfig};

use super::paths;

/// Where the nine-patch skin comes from.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NinePatchSource {
    /// A base name, resolved into active/inactive variants by suffix.
    pub texture: Option<PathBuf>,
    /// An explicit skin for focused windows.
    pub active: Option<PathBuf>,
    /// An explicit skin for unfocused windows.
    pub inactive: Option<PathBuf>,
}

impl NinePatchSource {
    /// Whether any source is configured at all.
    pub fn is_configured(&self) -> bool {
        self.texture.is_some() || self.active.is_some() || self.inactive.is_some()
    }

    /// Resolves the (active, inactive) file paths.
    ///
    /// Explicit paths win over the base name. The inactive skin falls back
    /// to the active one.
    pub fn resolve(&self) -> (Option<PathBuf>, Option<PathBuf>) {
        let from_base = |suffixes: &[&str]| {
            self.texture
                .as_deref()
                .and_then(|base| paths::probe(base, suffixes))
        };

        let active = self
            .active
            .clone()
            .or_else(|| from_base(paths::NINEPATCH_ACTIVE));
        let inactive = self
            .inactive
            .clone()
            .or_else(|| from_base(paths::NINEPATCH_INACTIVE))
            .or_else(|| active.clone());

        (active, inactive)
    }
}

/// An immutable snapshot of every tunable of the bar.
///
/// A `BarConfig` is owned by the `DecorationRegistry` and shared read-only
/// with every decoration; it is replaced wholesale on reload and never
/// mutated in place.
///
/// # Construction
///
/// Use [`BarConfig::builder`], or [`BarConfig::default`] for the stock look.
///
/// ```rust
/// use decobar::config::{BarConfig, no_checks};
/// use decobar::types::Placement;
///
/// let config = BarConfig::builder()
///     .placement(Placement::Left)
///     .padding(4)
///     .finish(no_checks)
///     .expect("invalid config");
///
/// assert_eq!(config.padding, 4);
/// ```
#[derive(Debug, Clone)]
pub struct BarConfig {
    /// Whether decorations are drawn and interactive at all.
    pub enabled: bool,
    /// The flat bar color, used when no nine-patch is configured.
    pub bar_color: Color,
    /// How long the bar takes to fade to a new color.
    pub color_transition: Duration,
    /// Whether to ask the renderer to blur behind a translucent bar.
    pub blur: bool,
    /// Whether the bar counts as part of the window for input and layering.
    pub part_of_window: bool,
    /// Whether the bar is positioned outside of the window border.
    pub precedence_over_border: bool,
    /// Whether the bar is drawn above the window instead of below it.
    pub render_above: bool,
    /// Whether the host should reserve space for the bar (false), or let it
    /// overlap the window (true).
    pub inset: bool,

    /// The edge that holds the title, icon and buttons.
    pub placement: Placement,
    /// The end of the content rect the button row starts from.
    pub buttons_alignment: ButtonAlignment,
    /// Uniform padding added inside every edge.
    pub padding: i32,
    /// Gap between adjacent buttons.
    pub button_padding: i32,
    /// Extra offset on the left edge.
    pub offset_left: i32,
    /// Extra offset on the top edge.
    pub offset_top: i32,
    /// Extra offset on the right edge.
    pub offset_right: i32,
    /// Extra offset on the bottom edge.
    pub offset_bottom: i32,

    /// Whether the window title is drawn.
    pub title_enabled: bool,
    /// The title color.
    pub text_color: Color,
    /// The title font size.
    pub title_size: f32,
    /// The title font family, or a path to a font file.
    pub font: String,
    /// Where the title sits in its available space, from 0.0 (start) to 1.0 (end).
    pub title_align: f32,

    /// Command run on a double click on the bar background.
    pub double_click: Option<String>,

    /// The nine-patch skin.
    pub ninepatch: NinePatchSource,
    /// Alpha applied to the center cell of the nine-patch. The center is drawn
    /// opaque when unset, and skipped when zero.
    pub ninepatch_middle_alpha: Option<f32>,
    /// Whether the center cell tiles instead of stretching.
    pub ninepatch_repeat: bool,
    /// Whether the skin is sampled with linear filtering.
    pub ninepatch_linear_filtering: bool,

    /// Whether the application icon is drawn.
    pub appicon_enabled: bool,
    /// Extra offset applied to the application icon.
    pub appicon_offset: Point<i32, Logical>,
}

impl Default for BarConfig {
    fn default() -> Self {
        BarConfig {
            enabled: true,
            bar_color: Color::from_hex(0x33333388),
            color_transition: Duration::from_millis(300),
            blur: false,
            part_of_window: true,
            precedence_over_border: false,
            render_above: false,
            inset: false,

            placement: Placement::Top,
            buttons_alignment: ButtonAlignment::Right,
            padding: 7,
            button_padding: 5,
            offset_left: 0,
            offset_top: 0,
            offset_right: 0,
            offset_bottom: 0,

            title_enabled: true,
            text_color: Color::WHITE,
            title_size: 10.,
            font: String::from("Sans"),
            title_align: 0.5,

            double_click: None,

            ninepatch: NinePatchSource::default(),
            ninepatch_middle_alpha: None,
            ninepatch_repeat: false,
            ninepatch_linear_filtering: true,

            appicon_enabled: true,
            appicon_offset: Point::zeroed(),
        }
    }
}

/// A const function that simply returns Ok. Pass this into validate if you have no
/// user-defined checks to run.
pub const fn no_checks(_: &BarConfig) -> Result<()> {
    Ok(())
}

impl BarConfig {
    /// Returns a [`BarConfigBuilder`] to build your config with the
    /// 'builder' idiom.
    pub fn builder() -> BarConfigBuilder {
        BarConfigBuilder::new()
    }

    /// Checks the configuration to verify that all invariants are upheld.
    ///
    /// Additional user-defined checks can be supplied with `checks`; pass
    /// [`no_checks`] if you have none.
    pub fn validate<F>(&self, checks: F) -> Result<()>
    where
        F: FnOnce(&BarConfig) -> Result<()>,
    {
        let offsets = [
            ("offset_left", self.offset_left),
            ("offset_top", self.offset_top),
            ("offset_right", self.offset_right),
            ("offset_bottom", self.offset_bottom),
            ("padding", self.padding),
            ("button_padding", self.button_padding),
        ];
        for (name, value) in offsets {
            if value < 0 {
                return Err(InvalidConfig(format!("{name} must not be negative")));
            }
        }
        if !(0.0..=1.0).contains(&self.title_align) {
            return Err(InvalidConfig("title_align must be within 0.0 and 1.0".into()));
        }
        if self.title_size <= 0. {
            return Err(InvalidConfig("title_size must be positive".into()));
        }
        if let Some(alpha) = self.ninepatch_middle_alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(InvalidConfig("ninepatch_middle_alpha must be within 0.0 and 1.0".into()));
            }
        }
        checks(self)?;
        Ok(())
    }

    /// The double click command, if one is configured and non-empty.
    pub fn double_click_command(&self) -> Option<&str> {
        self.double_click.as_deref().filter(|cmd| !cmd.is_empty())
    }

    /// Whether a nine-patch skin is configured.
    pub fn uses_ninepatch(&self) -> bool {
        self.ninepatch.is_configured()
    }
}

/// A helper type to construct a [`BarConfig`].
#[derive(Debug, Default)]
pub struct BarConfigBuilder {
    inner: BarConfig,
}

macro_rules! __builder_setters {
    {$($(#[$outer:meta])* $field:ident: $ty:ty),+ $(,)?} => {
        $(
            $(#[$outer])*
            pub fn $field(mut self, $field: $ty) -> Self {
                self.inner.$field = $field;
                self
            }
        )+
    };
}

impl BarConfigBuilder {
    /// Creates a new `BarConfigBuilder` seeded with the defaults.
    pub fn new() -> Self {
        Self {
            inner: BarConfig::default(),
        }
    }

    __builder_setters!{
        /// Sets whether decorations are enabled.
        enabled: bool,
        /// Sets the flat bar color.
        bar_color: Color,
        /// Sets the bar color fade duration.
        color_transition: Duration,
        /// Sets whether translucent bars request blur.
        blur: bool,
        /// Sets whether the bar counts as part of the window.
        part_of_window: bool,
        /// Sets whether the bar sits outside the window border.
        precedence_over_border: bool,
        /// Sets whether the bar is drawn above the window.
        render_above: bool,
        /// Sets whether the bar overlaps the window instead of reserving space.
        inset: bool,
        /// Sets the edge holding the bar content.
        placement: Placement,
        /// Sets the button row alignment.
        buttons_alignment: ButtonAlignment,
        /// Sets the uniform padding.
        padding: i32,
        /// Sets the gap between buttons.
        button_padding: i32,
        /// Sets the left offset.
        offset_left: i32,
        /// Sets the top offset.
        offset_top: i32,
        /// Sets the right offset.
        offset_right: i32,
        /// Sets the bottom offset.
        offset_bottom: i32,
        /// Sets whether the title is drawn.
        title_enabled: bool,
        /// Sets the title color.
        text_color: Color,
        /// Sets the title font size.
        title_size: f32,
        /// Sets the title alignment fraction.
        title_align: f32,
        /// Sets whether the skin center tiles.
        ninepatch_repeat: bool,
        /// Sets whether the skin is linearly filtered.
        ninepatch_linear_filtering: bool,
        /// Sets whether the application icon is drawn.
        appicon_enabled: bool,
        /// Sets the application icon offset.
        appicon_offset: Point<i32, Logical>,
    }

    /// Sets the title font family or font file.
    pub fn font<S: Into<String>>(mut self, font: S) -> Self {
        self.inner.font = font.into();
        self
    }

    /// Sets the command run on a double click.
    pub fn double_click<S: Into<String>>(mut self, cmd: S) -> Self {
        self.inner.double_click = Some(cmd.into());
        self
    }

    /// Sets the nine-patch skin source.
    pub fn ninepatch(mut self, source: NinePatchSource) -> Self {
        self.inner.ninepatch = source;
        self
    }

    /// Sets the alpha of the nine-patch center cell.
    pub fn ninepatch_middle_alpha(mut self, alpha: f32) -> Self {
        self.inner.ninepatch_middle_alpha = Some(alpha);
        self
    }

    /// Finishes construction, validates the config and returns
    /// it if validation is successful.
    ///
    /// You can supply an additional `check` to run
    /// additional code to validate your config.
    pub fn finish<F>(self, check: F) -> Result<BarConfig>
    where
        F: FnOnce(&BarConfig) -> Result<()>,
    {
        let config = self.inner;
        config.validate(check)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        BarConfig::default().validate(no_checks).unwrap();
        assert!(!BarConfig::default().uses_ninepatch());
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        assert!(BarConfig::builder().padding(-1).finish(no_checks).is_err());
        assert!(BarConfig::builder().title_align(1.5).finish(no_checks).is_err());
        assert!(BarConfig::builder().ninepatch_middle_alpha(2.).finish(no_checks).is_err());
    }

    #[test]
    fn test_user_checks_run() {
        let res = BarConfig::builder()
            .finish(|cfg| match cfg.double_click_command() {
                Some(_) => Ok(()),
                None => Err(InvalidConfig("need a double click command".into())),
            });
        assert!(res.is_err());
    }

    #[test]
    fn test_empty_double_click_is_none() {
        let config = BarConfig::builder().double_click("").finish(no_checks).unwrap();
        assert_eq!(config.double_click_command(), None);
    }

    #[test]
    fn test_ninepatch_inactive_falls_back() {
        let source = NinePatchSource {
            active: Some(PathBuf::from("/skins/bar.png")),
            ..NinePatchSource::default()
        };
        let (active, inactive) = source.resolve();
        assert_eq!(active, inactive);
    }
}
