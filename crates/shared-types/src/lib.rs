//! # Shared Types Crate
//!
//! Wire-level types shared by the replica core, its collaborators and peer
//! replicas.
//!
//! ## Design Principles
//!
//! - **Stable field names**: every type here serialises to JSON with the
//!   field names existing peers expect. Renaming a field is a wire break.
//! - **Deterministic encoding**: maps use `BTreeMap` so the same message
//!   always encodes to the same bytes, which signing depends on.
//! - **No behaviour**: hashing and signing live in `shared-crypto` and the
//!   core crate; this crate only carries data.

pub mod codes;
pub mod entities;
pub mod errors;
pub mod execute;
pub mod messages;

pub use codes::ResultCode;
pub use entities::{Digest, PeerId};
pub use errors::*;
pub use execute::{ExecuteRequest, ExecutionResult, Parameter, RuntimeOutput};
pub use messages::{ExecuteResponse, PbftResultInfo};
