//! Run configuration.
//!
//! - [`RunConfig`] - Top-level configuration for one concolic run
//! - [`RunLimits`] - Instruction budget and timeout
//! - [`TracingConfig`] - Which decisions are logged
//!
//! # Presets
//!
//! - [`RunConfig::exploration()`] - Tolerates path diversion, logs forks
//! - [`RunConfig::strict()`] - A path diversion ends the run
//! - [`RunConfig::unlimited()`] - No budget, no timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use concolic_trace::concolic::{RunConfig, RunLimits};
//!
//! let config = RunConfig {
//!     limits: RunLimits::new()
//!         .with_max_instructions(100_000)
//!         .with_timeout_ms(5_000),
//!     ..RunConfig::strict()
//! };
//! ```

/// Configuration for one concolic run.
///
/// # Default Configuration
///
/// - 1 million traced events
/// - No timeout
/// - Path diversion tolerated
/// - Diversions logged, events and forks silent
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Budget checked at every traced event.
    pub limits: RunLimits,

    /// Whether a path diversion degrades to concrete execution.
    ///
    /// When `true`, the diverged state's model is marked dead and the target
    /// keeps running without symbolic bookkeeping. When `false`, the run ends
    /// with [`Error::PathDiversion`](crate::Error::PathDiversion).
    pub allow_path_diversion: bool,

    /// Logging of protocol decisions.
    pub tracing: TracingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            limits: RunLimits::default(),
            allow_path_diversion: true,
            tracing: TracingConfig::default(),
        }
    }
}

impl RunConfig {
    /// Exploration preset: diversion tolerated, forks logged.
    #[must_use]
    pub fn exploration() -> Self {
        RunConfig {
            tracing: TracingConfig {
                log_forks: true,
                ..TracingConfig::default()
            },
            ..RunConfig::default()
        }
    }

    /// Strict preset: any diversion ends the run.
    #[must_use]
    pub fn strict() -> Self {
        RunConfig {
            allow_path_diversion: false,
            ..RunConfig::default()
        }
    }

    /// No instruction budget and no timeout.
    #[must_use]
    pub fn unlimited() -> Self {
        RunConfig {
            limits: RunLimits::new().with_max_instructions(0).with_timeout_ms(0),
            ..RunConfig::default()
        }
    }

    /// Sets the limits.
    #[must_use]
    pub fn with_limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets whether path diversion is tolerated.
    #[must_use]
    pub fn with_path_diversion(mut self, allow: bool) -> Self {
        self.allow_path_diversion = allow;
        self
    }

    /// Sets the tracing options.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }
}

/// Budget of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunLimits {
    /// Maximum traced events.
    ///
    /// Set to 0 for unlimited. With a budget of `k`, at most `k` events run
    /// their operation; the run aborts at the boundary of event `k + 1`.
    pub max_instructions: u64,

    /// Timeout in milliseconds.
    ///
    /// Set to 0 for no timeout. Checked at event boundaries only.
    pub timeout_ms: u64,
}

impl Default for RunLimits {
    fn default() -> Self {
        RunLimits {
            max_instructions: 1_000_000,
            timeout_ms: 0,
        }
    }
}

impl RunLimits {
    /// Creates limits with default values.
    ///
    /// ```rust,ignore
    /// use concolic_trace::concolic::RunLimits;
    ///
    /// let limits = RunLimits::new()
    ///     .with_max_instructions(5_000)
    ///     .with_timeout_ms(1_000);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum traced event count.
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum events to trace (0 for unlimited)
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_max_instructions(mut self, max: u64) -> Self {
        self.max_instructions = max;
        self
    }

    /// Sets the timeout.
    ///
    /// # Arguments
    ///
    /// * `ms` - Timeout in milliseconds (0 for none)
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }
}

/// Logging of protocol decisions through the `log` facade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingConfig {
    /// Log every traced event at `trace` level.
    ///
    /// Very high volume; one line per intercepted operation.
    pub log_events: bool,

    /// Log forks at `debug` level.
    pub log_forks: bool,

    /// Log path diversions at `warn` level. Enabled by default.
    pub log_diversions: bool,

    /// Log mock consumption at `debug` level.
    pub log_mocks: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        TracingConfig {
            log_events: false,
            log_forks: false,
            log_diversions: true,
            log_mocks: false,
        }
    }
}

impl TracingConfig {
    /// Everything enabled.
    #[must_use]
    pub fn full() -> Self {
        TracingConfig {
            log_events: true,
            log_forks: true,
            log_diversions: true,
            log_mocks: true,
        }
    }

    /// Everything disabled.
    #[must_use]
    pub fn silent() -> Self {
        TracingConfig {
            log_events: false,
            log_forks: false,
            log_diversions: false,
            log_mocks: false,
        }
    }
}
