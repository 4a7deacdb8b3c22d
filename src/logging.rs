//! Subscriber setup for the graph's diagnostics
//!
//! The graph emits `tracing` events under the `inject_graph` target when the
//! `logging` feature is on. This module installs a `tracing-subscriber`
//! pipeline for them; installing needs `logging-json` or `logging-pretty`.
//!
//! # Example
//!
//! ```rust,ignore
//! use inject_graph::logging;
//!
//! // JSON with logging-json, pretty with logging-pretty
//! logging::init();
//!
//! // Only this crate's events, at TRACE, one line each
//! logging::builder().graph_only().trace().compact().init();
//! ```

use tracing::Level;

/// Target every graph event is emitted under.
pub const TARGET: &str = "inject_graph";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event (`logging-json`)
    Json,
    /// Multi-line, human-oriented output
    Pretty,
    /// Single-line output
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(feature = "logging-json") {
            LogFormat::Json
        } else if cfg!(feature = "logging-pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        }
    }
}

/// Builder for the subscriber pipeline
#[derive(Debug, Clone)]
#[cfg_attr(
    not(any(feature = "logging-json", feature = "logging-pretty")),
    allow(dead_code)
)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    graph_only: bool,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::default(),
            graph_only: false,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
        }
    }
}

impl LoggingBuilder {
    /// Start from DEBUG in the feature-selected format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Shorthand for `level(Level::TRACE)`; shows every lookup.
    pub fn trace(self) -> Self {
        self.level(Level::TRACE)
    }

    /// Shorthand for `level(Level::DEBUG)`.
    pub fn debug(self) -> Self {
        self.level(Level::DEBUG)
    }

    /// Shorthand for `level(Level::INFO)`.
    pub fn info(self) -> Self {
        self.level(Level::INFO)
    }

    /// Drop events from every target but [`TARGET`].
    pub fn graph_only(mut self) -> Self {
        self.graph_only = true;
        self
    }

    /// Include source file names.
    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    /// Include source line numbers.
    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    /// Include thread ids.
    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    /// Emit JSON.
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Emit multi-line pretty output.
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Emit single-line output.
    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// The `EnvFilter` directive this configuration installs.
    pub fn directive(&self) -> String {
        let level = self.level.to_string().to_ascii_lowercase();
        if self.graph_only {
            format!("{TARGET}={level}")
        } else {
            level
        }
    }

    /// Install the subscriber as the global default.
    ///
    /// Fails when a global default is already set. JSON output falls back
    /// to compact when `logging-json` is off.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn try_init(self) -> Result<(), tracing_subscriber::util::TryInitError> {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::new(self.directive());
        let layer = fmt::layer()
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_thread_ids(self.with_thread_ids)
            .with_target(true);
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => registry.with(layer.json()).try_init(),
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            _ => registry.with(layer.compact()).try_init(),
        }
    }

    /// Install the subscriber, keeping any default that is already set.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// No subscriber is available without `logging-json` or `logging-pretty`.
    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Create a new logging builder.
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Install DEBUG logging in the feature-selected format.
pub fn init() {
    builder().init();
}

/// Install DEBUG logging for this crate's events only.
pub fn init_graph_only() {
    builder().graph_only().init();
}
