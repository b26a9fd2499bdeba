//! Decoration management: the registry, the decorations it holds, and the
//! event bus the host drives them through.
//!
//! A [`DecorationRegistry`] is the single context object of the crate. The
//! host creates one, calls [`init`](DecorationRegistry::init) once its
//! windows exist, and from then on forwards its events through
//! [`handle_event`](DecorationRegistry::handle_event). Rendering goes
//! through [`draw`](DecorationRegistry::draw) and
//! [`render_pass`](DecorationRegistry::render_pass), and positioning through
//! [`positioning`](DecorationRegistry::positioning) and
//! [`assign_box`](DecorationRegistry::assign_box).

/// Events the host delivers.
pub mod event;
/// The typed event bus.
pub mod hooks;

mod instance;
mod registry;
mod resources;

#[doc(inline)]
pub use event::{EventKind, HostEvent};
#[doc(inline)]
pub use hooks::{EventBus, Hook, Hooks};
#[doc(inline)]
pub use instance::{DecorationInstance, Dirty, Shared, TextureIds};
#[doc(inline)]
pub use registry::DecorationRegistry;
#[doc(inline)]
pub use resources::{Button, Resources};
