//! Request bridge for the textile engine.
//!
//! Clients send one JSON object per request. The bridge parses it into
//! exactly one [`FabricOperation`], validates the parameters, executes it
//! against the shared engine and sensor hub, and returns a structured
//! payload. Every request, accepted or not, lands in the audit log.

pub mod error;
pub mod ops;
pub mod protocol;
pub mod response;

pub use error::{BridgeError, BridgeResult};
pub use ops::FabricOperation;
pub use protocol::{AuditEntry, Bridge, BridgeRequest};
pub use response::{BridgeResponse, OperationResult, RecyclingPayload};
