//! stressor: synthetic load for benchmarking under contention
//!
//! Saturates the host's processors, allocator and task scheduler so that a
//! benchmark running alongside measures behavior on a busy machine instead
//! of an idle one. The crate provides:
//!
//! - The [`Stressor`] lifecycle: start a configured worker population and
//!   return only once all of it is producing load; stop it cooperatively
//! - Three worker families: allocate-and-discard churn, token-bouncing
//!   channel pairs, and repeated short sleeps
//! - The coordination primitives behind them: a one-shot [`StartGate`] and
//!   a broadcast [`StopSignal`]
//!
//! This is a deliberately simple load source: it does not adapt to the
//! system's response, pin itself to processors, or coordinate across
//! processes. Termination is cooperative; pressure may linger briefly after
//! a stop while in-flight iterations and reclaimable memory drain.
//!
//! # Example
//!
//! ```ignore
//! use stressor::{Stressor, StressorConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let stressor = Stressor::start(StressorConfig::default()).await;
//!
//!     // Main code, now running under contention.
//!
//!     stressor.stop();
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod gate;
pub mod signal;

mod stressor;
mod worker;

pub use config::{
    default_worker_count, ConfigError, StressorConfig, DEFAULT_ALLOCATION_SIZE,
    DEFAULT_SLEEP_DURATION,
};
pub use gate::StartGate;
pub use signal::StopSignal;
pub use stressor::Stressor;
