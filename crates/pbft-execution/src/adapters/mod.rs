//! Adapters layer (Hexagonal Architecture)
//!
//! Concrete implementations around the ports: the executor wrapper, result
//! routing, the liveness timer, Ed25519 signing and in-process transports.

mod cluster_bus;
mod dissemination;
mod executor;
mod signer;
mod timer;
mod transport;

pub use dissemination::ResultDisseminator;
pub use executor::ExecutorAdapter;
pub use signer::{sign_response, verify_response, Ed25519ResultSigner};
pub use timer::{LivenessTimer, SignalSource};
pub use transport::{DeliveredMessage, InMemoryNetwork, InMemoryTransport};
