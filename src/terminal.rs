//! The console session context.
//!
//! [`Terminal`] owns the console and the pieces that use it, so application
//! code holds one value instead of threading a console, a clock and a delay
//! through every call. It is also the usual [`DiagnosticSink`].

use core::fmt;

use embassy_time::Delay;
use embedded_hal_async::delay::DelayNs;

use crate::config::{LoggerConfig, ReaderConfig};
use crate::console::{Clock, Console, EmbassyClock};
use crate::diag::{DiagnosticLogger, DiagnosticSink};
use crate::line::{InputLine, LineReader};

/// A console together with the line reader and logger that use it.
pub struct Terminal<C, K = EmbassyClock, D = Delay> {
    console: C,
    reader: LineReader<K, D>,
    logger: DiagnosticLogger,
}

impl<C: Console> Terminal<C> {
    /// A terminal on the Embassy clock and delay with default settings.
    pub fn with_defaults(console: C) -> Self {
        Self::new(
            console,
            ReaderConfig::default(),
            LoggerConfig::default(),
            EmbassyClock,
            Delay,
        )
    }
}

impl<C, K, D> Terminal<C, K, D>
where
    C: Console,
    K: Clock,
    D: DelayNs,
{
    pub fn new(
        console: C,
        reader_config: ReaderConfig,
        logger_config: LoggerConfig,
        clock: K,
        delay: D,
    ) -> Self {
        Self {
            console,
            reader: LineReader::new(reader_config, clock, delay),
            logger: DiagnosticLogger::new(logger_config),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.console.is_attached()
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Writes bytes without a log prefix, if a console is attached.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        if self.console.is_attached() {
            self.console.write(bytes);
        }
    }

    pub async fn flush(&mut self) {
        self.console.flush().await;
    }

    /// Reads one line of input.
    pub async fn read_line(&mut self) -> InputLine {
        self.reader.read_line(&mut self.console).await
    }

    /// Logs a prompt, flushes it and reads the answer.
    pub async fn prompt(&mut self, line: u32, tag: &str, args: fmt::Arguments<'_>) -> InputLine {
        self.logger.log(&mut self.console, line, tag, args);
        self.console.flush().await;
        self.read_line().await
    }
}

impl<C, K, D> DiagnosticSink for Terminal<C, K, D>
where
    C: Console,
{
    fn log(&mut self, line: u32, tag: &str, args: fmt::Arguments<'_>) {
        self.logger.log(&mut self.console, line, tag, args);
    }
}
