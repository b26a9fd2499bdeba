//! Configuration of the bar.
//!
//! The configuration is split into the global [`BarConfig`] snapshot, the
//! repeatable [`ButtonSpec`] declarations, and per-window [`rules`].

pub mod bar;
pub mod button;
pub mod paths;
pub mod rules;

#[doc(inline)]
pub use bar::{BarConfig, BarConfigBuilder, NinePatchSource, no_checks};
#[doc(inline)]
pub use button::{ButtonSpec, ButtonTextures, DEFAULT_BUTTON_SIZE};
#[doc(inline)]
pub use rules::{RuleKey, RuleSource, WindowOverrides};
