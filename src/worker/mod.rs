//! Load-generating worker families.
//!
//! Three kinds of worker, each producing a different kind of pressure:
//!
//! 1. [`Allocator`] — allocate-and-discard churn against the allocator
//! 2. [`Forwarder`]/[`Backwarder`] — a token bounced over paired channels,
//!    exercising the scheduler's blocking and waking fast path
//! 3. [`Sleeper`] — repeated short sleeps, exercising the timer path
//!
//! Every worker follows the same lifecycle: report ready on its
//! [`StartGate`](crate::gate::StartGate), await release, loop until the
//! shared [`StopSignal`](crate::signal::StopSignal) is raised. Workers do no
//! meaningful work and report no errors; when cancelled they simply stop
//! looping.

mod allocator;
mod lockers;
mod sleeper;

pub(crate) use allocator::Allocator;
pub(crate) use lockers::{Backwarder, Forwarder};
pub(crate) use sleeper::Sleeper;

#[cfg(test)]
mod tests;
