//! Miscellaneous utilities.

/// Error handling utilities.
pub mod log;
/// Finding application icons.
pub mod icon;

#[doc(inline)]
pub use log::DefaultErrorHandler;
