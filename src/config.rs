//! # Console Configuration
//!
//! Capacity constants shared by the line reader, the tokenizer and the
//! session record, plus the runtime options for the reader and the logger.

use embassy_time::Duration;

/// Size of the line buffer, terminator slot included.
pub const LINE_CAPACITY: usize = 128;
/// Longest line the reader will hand back (room is kept for the terminator).
pub const MAX_LINE_LEN: usize = LINE_CAPACITY - 1;

/// Maximum number of sub-topics a topic is split into.
pub const MAX_SUB_TOPIC: usize = 10;
/// Size of one sub-topic slot, terminator included.
pub const MAX_TOPIC_LENGTH: usize = 40;
/// Maximum number of sub-payloads a payload is split into.
pub const MAX_SUB_PAYLOAD: usize = 10;
/// Size of one sub-payload slot, terminator included.
pub const MAX_PAYLOAD_LENGTH: usize = 40;

/// Storage for the last topic seen or entered.
pub const TOPIC_CAPACITY: usize = 100;
/// Storage for the last payload seen or entered.
pub const PAYLOAD_CAPACITY: usize = 256;

/// Largest diagnostic message body; longer output is cut.
pub const LOG_LINE_CAPACITY: usize = 512;
/// Width of the `[tag]` column, brackets included.
pub const TAG_FIELD_WIDTH: usize = 25;

/// Options for [`LineReader`](crate::line::LineReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// How long a single poll waits for a byte.
    pub poll_interval: Duration,
    /// Pause between two polls.
    pub settle_delay: Duration,
    /// Give up after this long without a keystroke. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            settle_delay: Duration::from_millis(10),
            idle_timeout: None,
        }
    }
}

impl ReaderConfig {
    /// Create a new reader configuration with the default timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long a single poll waits for a key.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the pause taken after each handled keystroke.
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Enables the idle timeout. A read that sees no keystroke for `timeout`
    /// completes as a cancel.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }
}

/// Options for [`DiagnosticLogger`](crate::diag::DiagnosticLogger).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoggerConfig {
    /// Core (or task) number printed next to the source line.
    pub core_id: u8,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core_id(mut self, core_id: u8) -> Self {
        self.core_id = core_id;
        self
    }
}
