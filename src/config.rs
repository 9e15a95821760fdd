//! Stressor configuration types
//!
//! Sizing is deliberately forgiving: a zero (unset) field is replaced by
//! its documented default during [`StressorConfig::normalize`], and no
//! upper bound is enforced anywhere. With large enough values the host
//! stays under load effectively forever, which is the point.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Allocation size, in bytes, used when the configured size is zero.
pub const DEFAULT_ALLOCATION_SIZE: usize = 1;

/// Sleeper interval used when the configured duration is zero.
pub const DEFAULT_SLEEP_DURATION: Duration = Duration::from_nanos(1);

const ENV_ALLOCATORS: &str = "STRESSOR_ALLOCATORS";
const ENV_ALLOCATION_SIZE: &str = "STRESSOR_ALLOCATION_SIZE";
const ENV_LOCKER_PAIRS: &str = "STRESSOR_LOCKER_PAIRS";
const ENV_SCHEDULED: &str = "STRESSOR_SCHEDULED";
const ENV_SLEEP_DURATION: &str = "STRESSOR_SLEEP_DURATION";

/// Worker count used when a configured count is zero: one worker of that
/// kind per logical processor.
pub fn default_worker_count() -> usize {
    num_cpus::get()
}

/// Stressor configuration
///
/// Defines how many workers of each kind to run and how they behave. A
/// zero field means "unset" and is resolved by [`StressorConfig::normalize`];
/// counts default to the number of logical processors, the allocation size
/// and sleep interval default to the minimum useful values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StressorConfig {
    /// Number of workers churning the allocator. Loads memory reclamation.
    #[serde(default)]
    pub allocators: usize,

    /// Size in bytes of each allocated-and-discarded block.
    #[serde(default)]
    pub allocation_size: usize,

    /// Number of forwarder/backwarder pairs bouncing a token over paired
    /// channels. Loads the scheduler's blocking and waking fast path.
    #[serde(default)]
    pub locker_pairs: usize,

    /// Number of workers repeatedly sleeping. Loads the timer path.
    #[serde(default)]
    pub scheduled: usize,

    /// Sleep interval of the scheduled workers.
    #[serde(default, with = "humantime_serde")]
    pub sleep_duration: Duration,
}

impl StressorConfig {
    /// Creates an all-unset configuration; [`StressorConfig::normalize`]
    /// turns it into the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the allocator worker count.
    pub fn with_allocators(mut self, count: usize) -> Self {
        self.allocators = count;
        self
    }

    /// Sets the per-iteration allocation size in bytes.
    pub fn with_allocation_size(mut self, bytes: usize) -> Self {
        self.allocation_size = bytes;
        self
    }

    /// Sets the number of forwarder/backwarder pairs.
    pub fn with_locker_pairs(mut self, count: usize) -> Self {
        self.locker_pairs = count;
        self
    }

    /// Sets the scheduled-sleeper worker count.
    pub fn with_scheduled(mut self, count: usize) -> Self {
        self.scheduled = count;
        self
    }

    /// Sets the sleeper interval.
    pub fn with_sleep_duration(mut self, interval: Duration) -> Self {
        self.sleep_duration = interval;
        self
    }

    /// Replaces every unset (zero) field with its default.
    ///
    /// Identity for configurations whose fields are all set. Invalid values
    /// are never rejected: the resulting configuration is always runnable.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.allocators == 0 {
            self.allocators = default_worker_count();
        }

        if self.allocation_size == 0 {
            self.allocation_size = DEFAULT_ALLOCATION_SIZE;
        }

        if self.locker_pairs == 0 {
            self.locker_pairs = default_worker_count();
        }

        if self.scheduled == 0 {
            self.scheduled = default_worker_count();
        }

        if self.sleep_duration.is_zero() {
            self.sleep_duration = DEFAULT_SLEEP_DURATION;
        }

        self
    }

    /// Total number of workers a stressor built from this configuration
    /// spawns: each locker pair contributes two.
    pub fn total_workers(&self) -> usize {
        self.allocators + 2 * self.locker_pairs + self.scheduled
    }

    /// Builds a configuration from `STRESSOR_*` environment variables.
    ///
    /// Unset variables leave the corresponding field unset (defaulted on
    /// normalization). `STRESSOR_SLEEP_DURATION` accepts humantime syntax,
    /// e.g. `10ns` or `1ms`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending variable when a set
    /// value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            allocators: read_count(ENV_ALLOCATORS)?,
            allocation_size: read_count(ENV_ALLOCATION_SIZE)?,
            locker_pairs: read_count(ENV_LOCKER_PAIRS)?,
            scheduled: read_count(ENV_SCHEDULED)?,
            sleep_duration: read_duration(ENV_SLEEP_DURATION)?,
        })
    }
}

fn read_count(var: &'static str) -> Result<usize, ConfigError> {
    let Ok(value) = env::var(var) else {
        return Ok(0);
    };

    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidCount { var, value, source })
}

fn read_duration(var: &'static str) -> Result<Duration, ConfigError> {
    let Ok(value) = env::var(var) else {
        return Ok(Duration::ZERO);
    };

    humantime::parse_duration(value.trim())
        .map_err(|source| ConfigError::InvalidDuration { var, value, source })
}

/// Environment configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A worker count or size variable did not parse as an integer.
    #[error("invalid value {value:?} for {var}: {source}")]
    InvalidCount {
        /// Name of the offending environment variable.
        var: &'static str,
        /// The rejected raw value.
        value: String,
        /// Parse failure reported by the integer parser.
        source: std::num::ParseIntError,
    },

    /// A duration variable did not parse as a humantime duration.
    #[error("invalid duration {value:?} for {var}: {source}")]
    InvalidDuration {
        /// Name of the offending environment variable.
        var: &'static str,
        /// The rejected raw value.
        value: String,
        /// Parse failure reported by the duration parser.
        source: humantime::DurationError,
    },
}

/// Serializes access to the process environment across the test suite;
/// `std::env` mutations are process-global.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
