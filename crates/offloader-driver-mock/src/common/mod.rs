//! Common infrastructure for the mock DAQ.
//!
//! - **errors**: Fault injection per device operation
//! - **rng**: Seeded random number generator

pub mod errors;
pub mod rng;

// Re-export commonly used types
pub use errors::{ErrorConfig, ErrorScenario, Operation};
pub use rng::MockRng;
