//! # Line Reader
//!
//! Collects keystrokes from a [`Console`] into a bounded [`InputLine`],
//! echoing what is accepted since the terminal on the other side is not
//! assumed to echo locally.
//!
//! Editing rules:
//!
//! - `<Backspace>` (or `<Del>`) removes the last character and erases it on
//!   screen. On an empty line it does nothing.
//! - `<Esc>` as the very first key completes the read with the line `{ESC}`.
//!   Later on it is ignored.
//! - `<Enter>` completes the read. On an empty line the result is `{CR}`.
//! - Anything printable is appended. When the line reaches
//!   [`MAX_LINE_LEN`] the read completes on its own.
//!
//! A poll that yields nothing simply polls again. With an idle timeout
//! configured, a read that sees no key for that long completes as `{ESC}`.

use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::config::{LINE_CAPACITY, MAX_LINE_LEN, ReaderConfig};
use crate::console::{Clock, Console};

pub const BACKSPACE: u8 = 0x08;
pub const DELETE: u8 = 0x7F;
pub const ESCAPE: u8 = 0x1B;
pub const ENTER: u8 = 0x0D;

const ERASE: &[u8] = b"\x08 \x08";

/// A completed line of input, at most [`MAX_LINE_LEN`] bytes.
///
/// The terminator is implicit; [`InputLine::to_terminated`] produces the
/// NUL-terminated form for C-side consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    bytes: Vec<u8, MAX_LINE_LEN>,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a line from raw bytes, dropping whatever exceeds the capacity.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut line = Self::new();
        for &b in bytes {
            if !line.push(b) {
                break;
            }
        }
        line
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The line as text, or `None` if it is not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.bytes.len() >= MAX_LINE_LEN
    }

    pub fn first(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// `<Esc>` was pressed on an empty line, or the idle timer expired.
    pub fn is_cancel(&self) -> bool {
        self.bytes.as_slice() == [ESCAPE]
    }

    /// `<Enter>` was pressed on an empty line.
    pub fn is_blank(&self) -> bool {
        self.bytes.as_slice() == [ENTER]
    }

    /// The line followed by a single NUL byte.
    pub fn to_terminated(&self) -> Vec<u8, LINE_CAPACITY> {
        let mut out = Vec::new();
        // MAX_LINE_LEN + 1 == LINE_CAPACITY, both always fit.
        let _ = out.extend_from_slice(&self.bytes);
        let _ = out.push(0);
        out
    }

    fn push(&mut self, byte: u8) -> bool {
        self.bytes.push(byte).is_ok()
    }

    fn pop(&mut self) -> Option<u8> {
        self.bytes.pop()
    }

    fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// Reads lines from a console, one keystroke per poll.
///
/// The reader keeps no state between calls apart from its configuration and
/// collaborators. The clock drives the optional idle timer and the delay
/// paces the loop after each keystroke.
pub struct LineReader<K, D> {
    config: ReaderConfig,
    clock: K,
    delay: D,
}

impl<K, D> LineReader<K, D>
where
    K: Clock,
    D: DelayNs,
{
    pub fn new(config: ReaderConfig, clock: K, delay: D) -> Self {
        Self {
            config,
            clock,
            delay,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Blocks until a line is complete and returns it.
    pub async fn read_line<C>(&mut self, console: &mut C) -> InputLine
    where
        C: Console + ?Sized,
    {
        let mut line = InputLine::new();
        let mut idle_since = self.clock.now();

        loop {
            let byte = match console.poll_byte(self.config.poll_interval).await {
                Some(0) | None => {
                    if self.idle_expired(idle_since) {
                        #[cfg(feature = "log")]
                        log::debug!("input idle timeout, discarding {} bytes", line.len());

                        line.clear();
                        line.push(ESCAPE);
                        console.write(b"\r");
                        break;
                    }
                    continue;
                }
                Some(byte) => byte,
            };
            idle_since = self.clock.now();

            match byte {
                BACKSPACE | DELETE => {
                    if line.pop().is_some() {
                        console.write(ERASE);
                    }
                }
                ESCAPE => {
                    if line.is_empty() {
                        line.push(ESCAPE);
                        console.write(b"\r");
                        break;
                    }
                }
                ENTER => {
                    if line.is_empty() {
                        line.push(ENTER);
                    }
                    console.write(b"\r");
                    break;
                }
                b if b >= b' ' => {
                    line.push(b);
                    console.write(&[b]);
                    if line.is_full() {
                        #[cfg(feature = "log")]
                        log::trace!("input line full at {} bytes", line.len());
                        break;
                    }
                }
                _ => {}
            }

            self.delay.delay_us(self.settle_micros()).await;
        }

        console.flush().await;
        line
    }

    /// Settle pause in microseconds, saturating at `u32::MAX`.
    fn settle_micros(&self) -> u32 {
        self.config
            .settle_delay
            .as_micros()
            .min(u64::from(u32::MAX)) as u32
    }

    fn idle_expired(&self, idle_since: Instant) -> bool {
        match self.config.idle_timeout {
            Some(limit) => self.clock.now().saturating_duration_since(idle_since) >= limit,
            None => false,
        }
    }
}
