//! Stable handles into tables owned by the host or the registry.
//!
//! Windows and monitors are owned by the host compositor and can disappear
//! at any point, including in the middle of a drag. The core never holds
//! references to them; instead it holds a `Copy` handle and asks the host
//! to resolve it every time, getting back [`Expired`] if the object is gone.

use std::fmt;

use thiserror::Error;

macro_rules! __handle {
    {$(#[$outer:meta])* $name:ident, $prefix:literal} => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u64);

        impl $name {
            /// Creates the handle from its raw table index.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw table index.
            pub const fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(from: u64) -> Self {
                Self(from)
            }
        }
    };
}

__handle!{
    /// A handle to a window managed by the host.
    WindowId, "window"
}
__handle!{
    /// A handle to a monitor managed by the host.
    MonitorId, "monitor"
}
__handle!{
    /// A handle to a decoration tracked by a `DecorationRegistry`.
    DecorationId, "decoration"
}

/// The kind of object a stale handle referred to.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaleKind {
    Window,
    Monitor,
    Decoration,
}

impl fmt::Display for StaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleKind::Window => f.write_str("window"),
            StaleKind::Monitor => f.write_str("monitor"),
            StaleKind::Decoration => f.write_str("decoration"),
        }
    }
}

/// Returned when a handle no longer resolves to a live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{kind} {raw} has expired")]
pub struct Expired {
    /// What the handle referred to.
    pub kind: StaleKind,
    /// The raw index of the handle.
    pub raw: u64,
}

impl Expired {
    /// An expired window handle.
    pub fn window(id: WindowId) -> Self {
        Self { kind: StaleKind::Window, raw: id.raw() }
    }

    /// An expired monitor handle.
    pub fn monitor(id: MonitorId) -> Self {
        Self { kind: StaleKind::Monitor, raw: id.raw() }
    }

    /// An expired decoration handle.
    pub fn decoration(id: DecorationId) -> Self {
        Self { kind: StaleKind::Decoration, raw: id.raw() }
    }
}

/// The result of resolving a handle.
pub type Lookup<T> = Result<T, Expired>;
