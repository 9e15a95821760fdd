//! Stressor lifecycle management
//!
//! The [`Stressor`] owns the whole worker population for one load session:
//! it normalizes the configuration, wires every worker to one
//! [`StartGate`](crate::gate::StartGate) and one
//! [`StopSignal`](crate::signal::StopSignal), holds the caller until the
//! load is actually present, and exposes the idempotent stop operation.
//!
//! # Example
//!
//! ```ignore
//! use stressor::{Stressor, StressorConfig};
//!
//! let stressor = Stressor::start(StressorConfig::default()).await;
//!
//! // Run the code being benchmarked while the machine is busy.
//!
//! stressor.stop();
//! ```

mod executor;

pub use executor::Stressor;
