//! # Diagnostic Logger
//!
//! Writes labelled lines to the console:
//!
//! ```text
//! [   42 0] [parse_topic]            - Topic string: <home/lamp>
//! ```
//!
//! The first bracket holds the source line and the core number, the second
//! the caller's tag padded (or cut, with a `~`) to a fixed column so the
//! messages line up. Two whole-message mnemonics are recognised in any case:
//! `home` becomes the VT100 cursor-home sequence and `cls` the clear-screen
//! sequence, both written without a prefix. Messages starting with `\r` are
//! written once verbatim before the labelled copy, which gives a blank line
//! above the entry.
//!
//! Nothing is written, and nothing fails, while the console is detached.

use core::fmt::{self, Write as _};

use heapless::String;

use crate::config::{LOG_LINE_CAPACITY, LoggerConfig, TAG_FIELD_WIDTH};
use crate::console::Console;
use crate::util::format_truncated;

/// VT100 cursor home.
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
/// VT100 clear screen.
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";

/// Characters of tag text that fit between the brackets.
const TAG_TEXT_WIDTH: usize = TAG_FIELD_WIDTH - 2;

/// Something that accepts diagnostic lines.
///
/// Object-safe, so session code can take `&mut dyn DiagnosticSink` without
/// knowing which console sits behind it.
pub trait DiagnosticSink {
    fn log(&mut self, line: u32, tag: &str, args: fmt::Arguments<'_>);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn log(&mut self, line: u32, tag: &str, args: fmt::Arguments<'_>) {
        (**self).log(line, tag, args)
    }
}

/// Logs through a `&mut` [`DiagnosticSink`], filling in the source line.
///
/// ```ignore
/// diag!(sink, "parse_topic", "Topic string: <{}>\r", topic);
/// ```
#[macro_export]
macro_rules! diag {
    ($sink:expr, $tag:expr, $($arg:tt)+) => {
        $crate::diag::DiagnosticSink::log(&mut *$sink, line!(), $tag, format_args!($($arg)+))
    };
}

/// Formats and emits diagnostic lines on a [`Console`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticLogger {
    config: LoggerConfig,
}

impl DiagnosticLogger {
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Emits one entry. Best effort; always returns.
    pub fn log<C>(&self, console: &mut C, line: u32, tag: &str, args: fmt::Arguments<'_>)
    where
        C: Console + ?Sized,
    {
        if !console.is_attached() {
            return;
        }

        let message: String<LOG_LINE_CAPACITY> = format_truncated(args);

        if let Some(control) = expand_mnemonic(&message) {
            console.write(control);
            return;
        }

        if message.starts_with('\r') {
            console.write(message.as_bytes());
        }

        let mut prefix: String<16> = String::new();
        let _ = write!(prefix, "[{:5} {}] ", line, self.config.core_id);
        console.write(prefix.as_bytes());
        console.write(format_tag(tag).as_bytes());
        console.write(b"- ");
        console.write(message.as_bytes());
    }

    /// Binds the logger to a console, giving a [`DiagnosticSink`].
    pub fn bind<'a, C>(&'a self, console: &'a mut C) -> ConsoleLog<'a, C>
    where
        C: Console + ?Sized,
    {
        ConsoleLog {
            logger: self,
            console,
        }
    }
}

/// A logger borrowed together with its console.
pub struct ConsoleLog<'a, C: ?Sized> {
    logger: &'a DiagnosticLogger,
    console: &'a mut C,
}

impl<C: Console + ?Sized> DiagnosticSink for ConsoleLog<'_, C> {
    fn log(&mut self, line: u32, tag: &str, args: fmt::Arguments<'_>) {
        self.logger.log(self.console, line, tag, args)
    }
}

/// The control sequence for a `home` or `cls` message, if it is one.
pub fn expand_mnemonic(message: &str) -> Option<&'static [u8]> {
    if message.eq_ignore_ascii_case("home") {
        Some(CURSOR_HOME)
    } else if message.eq_ignore_ascii_case("cls") {
        Some(CLEAR_SCREEN)
    } else {
        None
    }
}

/// Renders `[tag]` into a column of exactly [`TAG_FIELD_WIDTH`] characters.
pub fn format_tag(tag: &str) -> String<{ TAG_FIELD_WIDTH * 4 }> {
    let mut out = String::new();
    let _ = out.push('[');

    let width = tag.chars().count();
    if width > TAG_TEXT_WIDTH {
        for c in tag.chars().take(TAG_TEXT_WIDTH - 1) {
            let _ = out.push(c);
        }
        let _ = out.push_str("~]");
    } else {
        let _ = out.push_str(tag);
        let _ = out.push(']');
        for _ in width..TAG_TEXT_WIDTH {
            let _ = out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::mock::MockConsole;

    fn emit(console: &mut MockConsole, line: u32, tag: &str, args: fmt::Arguments<'_>) {
        DiagnosticLogger::default().log(console, line, tag, args);
    }

    #[test]
    fn test_prefixed_line() {
        let mut console = MockConsole::new();
        emit(&mut console, 42, "parse", format_args!("hello {}\r", 7));

        let expected = std::format!("[   42 0] [parse]{}- hello 7\r", " ".repeat(18));
        assert_eq!(console.output_str(), expected);
    }

    #[test]
    fn test_core_id_is_printed() {
        let mut console = MockConsole::new();
        let logger = DiagnosticLogger::new(LoggerConfig::new().with_core_id(1));
        logger.log(&mut console, 7, "x", format_args!("m"));
        assert!(console.output_str().starts_with("[    7 1] [x]"));
    }

    #[test]
    fn test_tag_column_is_fixed_width() {
        let short = format_tag("a");
        let exact = format_tag("abcdefghijklmnopqrstuvw");
        let long = format_tag("mqtt_incoming_publish_callback");

        assert_eq!(short.chars().count(), TAG_FIELD_WIDTH);
        assert_eq!(exact.as_str(), "[abcdefghijklmnopqrstuvw]");
        assert_eq!(long.as_str(), "[mqtt_incoming_publish_~]");
        assert_eq!(long.chars().count(), TAG_FIELD_WIDTH);
    }

    #[test]
    fn test_cls_mnemonic_any_case() {
        for msg in ["cls", "CLS", "Cls"] {
            let mut console = MockConsole::new();
            emit(&mut console, 1, "whatever_tag", format_args!("{}", msg));
            assert_eq!(console.output, CLEAR_SCREEN);
        }
    }

    #[test]
    fn test_home_mnemonic() {
        let mut console = MockConsole::new();
        emit(&mut console, 1, "menu", format_args!("HoMe"));
        assert_eq!(console.output, CURSOR_HOME);
    }

    #[test]
    fn test_mnemonic_must_match_whole_message() {
        assert_eq!(expand_mnemonic("cls\r"), None);
        assert_eq!(expand_mnemonic("home sweet home"), None);
    }

    #[test]
    fn test_detached_console_gets_nothing() {
        let mut console = MockConsole::detached();
        emit(&mut console, 1, "tag", format_args!("message\r"));
        emit(&mut console, 2, "tag", format_args!("cls"));
        assert!(console.output.is_empty());
    }

    #[test]
    fn test_leading_return_emits_blank_line_first() {
        let mut console = MockConsole::new();
        emit(&mut console, 3, "t", format_args!("\rnext\r"));

        let out = console.output_str();
        assert!(out.starts_with("\rnext\r[    3 0] [t]"));
        assert!(out.ends_with("- \rnext\r"));
    }

    #[test]
    fn test_long_message_is_cut() {
        let mut console = MockConsole::new();
        let body = "z".repeat(600);
        emit(&mut console, 1, "t", format_args!("{}", body));

        let out = console.output_str();
        let message = out.split("- ").nth(1).unwrap();
        assert_eq!(message.len(), LOG_LINE_CAPACITY);
    }

    #[test]
    fn test_macro_fills_in_line() {
        let mut console = MockConsole::new();
        let logger = DiagnosticLogger::default();
        let mut sink = logger.bind(&mut console);
        let sink = &mut sink;

        let expected_line = line!() + 1;
        crate::diag!(sink, "macro", "n={}", 3);

        let out = console.output_str();
        assert!(out.starts_with(&std::format!("[{:5} 0] [macro]", expected_line)));
        assert!(out.ends_with("- n=3"));
    }
}
