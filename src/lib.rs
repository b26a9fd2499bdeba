//! # Decobar - title bars for compositor-managed windows
//!
//! Decobar draws a skinnable title bar around the windows of a compositor and
//! turns pointer and touch input on that bar into window management requests.
//! It does not talk to any display server itself: everything it needs to know
//! about windows and monitors, and everything it wants done to them, goes
//! through the [`Host`] trait, which the embedding compositor implements.
//!
//! ## Design
//!
//! The crate is organised in layers:
//!
//! - [`core`] holds the pure parts: geometry, nine-patch decoding, layout,
//!   hit testing and the input gesture state machine. None of it touches the
//!   host.
//! - [`render`] composes the bar textures (background, title, icon and
//!   buttons) on the CPU and hands them to a [`Renderer`].
//! - [`manager`] ties it all together. A [`DecorationRegistry`] owns the
//!   configuration and shared resources, and one [`DecorationInstance`] per
//!   window. Host events go through a typed event bus.
//! - [`config`] holds the configuration snapshot, button declarations and
//!   per-window rule overrides.
//!
//! Windows and monitors are never referenced directly. The core holds
//! integer handles and resolves them through the host on every use, so a
//! window that disappears in the middle of a drag simply turns every further
//! operation on it into a no-op.
//!
//! ## Threading
//!
//! Everything runs on the host's render and input thread. Nothing here is
//! `Send`, and nothing needs to be.
//!
//! [`Host`]: crate::platform::Host
//! [`Renderer`]: crate::render::Renderer
//! [`DecorationRegistry`]: crate::manager::DecorationRegistry
//! [`DecorationInstance`]: crate::manager::DecorationInstance

#![warn(
    missing_debug_implementations,
    missing_copy_implementations,
    missing_docs
)]

#[macro_use]
extern crate bitflags;

pub mod config;
pub mod core;
pub mod manager;
pub mod platform;
pub mod render;
pub mod util;

pub use crate::core::types;
#[doc(inline)]
pub use crate::manager::{DecorationRegistry, DecorationInstance};
#[doc(inline)]
pub use crate::config::BarConfig;
#[doc(inline)]
pub use crate::platform::Host;

use crate::core::{Expired, StaleKind};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that could possibly go wrong while decorating windows.
///
/// None of these are fatal: the worst outcome of any of them is a missing
/// piece of a bar.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DecoError {
    /// An image file is missing or could not be decoded.
    #[error("could not decode {}: {reason}", .path.display())]
    Decode {
        /// The file that failed to decode.
        path: PathBuf,
        /// Why it failed.
        reason: String,
    },

    /// A configuration value or button declaration could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// A window, monitor or decoration handle no longer resolves.
    #[error("stale {0} reference")]
    StaleReference(StaleKind),

    /// The title font could not be found or loaded.
    #[error("font error: {0}")]
    Font(String),

    /// An IO error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// One or more configuration invariants was not upheld.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Quickly construct a DecoError.
#[macro_export]
macro_rules! decoerr {
    // ConfigParse
    (config: $t:expr) => {
        $crate::DecoError::ConfigParse($t)
    };
    // Font
    (font: $t:expr) => {
        $crate::DecoError::Font($t)
    };
    // StaleReference
    (stale: $t:expr) => {
        $crate::DecoError::StaleReference($t)
    };
    // Decode
    (decode: $path:expr, $reason:expr) => {
        $crate::DecoError::Decode { path: $path, reason: $reason }
    };
    // InvalidConfig
    (invalidcfg: $t:expr) => {
        $crate::DecoError::InvalidConfig($t)
    };
}

impl From<Expired> for DecoError {
    fn from(e: Expired) -> DecoError {
        DecoError::StaleReference(e.kind)
    }
}

/// The general result type used by Decobar.
pub type Result<T> = ::core::result::Result<T, DecoError>;

/// An error handler that can be used to handle an error type.
///
/// The registry hands every non-fatal error to its handler and carries on.
/// Typically this would be a logging function, but it can be anything.
pub trait ErrorHandler {
    /// Calls the error handler.
    fn call(&self, err: DecoError);
}
