//! Port definitions for external systems.
//!
//! Ports carry no implementation details and use only domain types.

mod engine;

pub use engine::{EngineBackend, RawHandle};
