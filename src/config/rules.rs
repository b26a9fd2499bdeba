//! Per-window overrides of the bar configuration.
//!
//! Overrides are evaluated by the host's window rule engine; the core only
//! reads their results back through [`RuleSource`] by key.

use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use tracing::warn;

use crate::core::WindowId;
use crate::types::Color;

/// The rule keys the bar reads for each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum RuleKey {
    /// Hides the bar entirely. A boolean.
    NoBar,
    /// Overrides the bar color. A color literal.
    BarColor,
    /// Overrides the title color. A color literal.
    TitleColor,
}

/// A generic key/value lookup of window rule results.
pub trait RuleSource {
    /// Looks up the value of `key` for `window`, if any rule set it.
    fn rule(&self, window: WindowId, key: RuleKey) -> Option<String>;
}

/// The overrides currently in effect for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowOverrides {
    /// Whether the bar is hidden on this window.
    pub no_bar: bool,
    /// A replacement for the configured bar color.
    pub bar_color: Option<Color>,
    /// A replacement for the configured title color.
    pub title_color: Option<Color>,
}

impl WindowOverrides {
    /// Reads every override of `window` from `source`.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn resolve<R: RuleSource + ?Sized>(source: &R, window: WindowId) -> Self {
        let mut ret = WindowOverrides::default();

        for key in RuleKey::iter() {
            let Some(value) = source.rule(window, key) else {
                continue
            };
            let value = value.trim();
            match key {
                RuleKey::NoBar => ret.no_bar = parse_bool(value),
                RuleKey::BarColor | RuleKey::TitleColor => match value.parse::<Color>() {
                    Ok(color) if key == RuleKey::BarColor => ret.bar_color = Some(color),
                    Ok(color) => ret.title_color = Some(color),
                    Err(e) => warn!("ignoring {key} rule on {window}: {e}"),
                },
            }
        }

        ret
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "" | "1" | "true" | "on" | "yes")
}
