//! The decoration core: geometry, hit testing, gestures and nine-patches.
//!
//! Everything in this module is free of host interaction. The modules here
//! are pure functions and small state machines that the
//! [`manager`](crate::manager) module drives.

pub mod anim;
pub mod gesture;
pub mod handle;
pub mod hit;
pub mod layout;
pub mod ninepatch;
pub mod types;

#[doc(inline)]
pub use handle::{DecorationId, Expired, Lookup, MonitorId, StaleKind, WindowId};
#[doc(inline)]
pub use gesture::{Action, EventInfo, GestureController, GestureEnv, GesturePhase, InputSource};
#[doc(inline)]
pub use hit::{BarFrame, Hit};
#[doc(inline)]
pub use ninepatch::{NinePatch, NinePatchInfo};
