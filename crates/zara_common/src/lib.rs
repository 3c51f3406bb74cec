//! Shared types for the Zara assistant.
//!
//! Everything the daemon and the CLI both need: the error taxonomy, the
//! capability table produced by the hardware probe, and the action/result
//! envelope returned by the router.

pub mod capability;
pub mod envelope;
pub mod error;

pub use capability::{CapabilityDetail, CapabilityStatus, CapabilityTable, ResourceKind};
pub use envelope::{ActionData, ActionKind, ActionRequest, ActionResult, MethodKind, MethodTier};
pub use error::ZaraError;
