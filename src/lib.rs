//! # Serial Console Toolkit for Embedded MQTT Clients
//!
//! `picow-mqtt-console` is a `no_std`, `no_alloc` crate with the console-side
//! pieces an MQTT demo firmware needs around its MQTT client: reading lines
//! from a serial terminal, splitting topics and payloads into their
//! slash-separated parts, and printing aligned diagnostic lines.
//!
//! ## Core Features
//!
//! - **Bounded everything:** Lines, segments and log messages live in
//!   `heapless` buffers. Overflow truncates; nothing here panics or allocates.
//! - **Line input with editing:** Backspace, `<Esc>` to cancel, `<Enter>` on
//!   an empty line as a distinct answer, optional idle timeout.
//! - **Topic / payload tokenizer:** Fixed number of fixed-length segments,
//!   with the same truncation rules for topics and payloads.
//! - **Diagnostic logger:** `[line core] [tag] - message` lines, VT100
//!   `home` / `cls` shortcuts, silent while no terminal is attached.
//! - **Transport Agnostic:** Everything goes through the [`Console`] trait;
//!   [`SerialConsole`] adapts any `embedded-io-async` stream (UART, USB CDC).
//!
//! ## Usage
//!
//! ```ignore
//! use picow_mqtt_console::{diag, MqttSession, ParseUnit, SerialConsole, Terminal};
//!
//! let mut term = Terminal::with_defaults(SerialConsole::<_, 256>::new(uart));
//! let mut session = MqttSession::new();
//!
//! let line = term.prompt(line!(), "menu", format_args!("Enter topic: ")).await;
//! if !line.is_cancel() && !line.is_blank() {
//!     session.set_topic(line.as_str().unwrap_or_default());
//!     session.parse(ParseUnit::Topic, &mut term);
//!     let sink = &mut term;
//!     diag!(sink, "menu", "first level: <{}>\r", &session.sub_topics()[0]);
//! }
//! ```
//!
//! The MQTT client itself is not part of this crate. Requests built from
//! console input are handed over through [`outbox`].

#![cfg_attr(not(test), no_std)]
pub mod config;
pub mod console;
pub mod diag;
pub mod error;
pub mod line;
pub mod outbox;
pub mod session;
pub mod terminal;
pub mod tokenizer;
pub mod util;

// Re-export key types for easier access at the crate root.
pub use config::{LoggerConfig, ReaderConfig};
pub use console::{Clock, Console, EmbassyClock, SerialConsole};
pub use diag::{DiagnosticLogger, DiagnosticSink};
pub use error::{ConsoleError, ParseUnitError};
pub use line::{InputLine, LineReader};
pub use outbox::{BufferedOutbox, MqttRequest, QoS, RequestOutbox, RequestSender};
pub use session::MqttSession;
pub use terminal::Terminal;
pub use tokenizer::{ParseUnit, PayloadTokens, TokenSet, TopicTokens};
