//! # Console Abstraction
//!
//! The [`Console`] trait is the only way the reader and the logger touch the
//! outside world. It does not care whether bytes travel over a UART, USB CDC
//! or a test vector.
//!
//! Writes are synchronous so that logging can stay synchronous too. An
//! adapter over an async byte stream, like [`SerialConsole`], queues the bytes
//! and pushes them out on the next [`Console::flush`] or poll.

use embassy_time::{Duration, Instant, Timer};
use embedded_io_async::{Read, Write};
use heapless::Vec;

use crate::error::ConsoleError;

/// A character console: an output sink plus a polled input source.
#[allow(async_fn_in_trait)]
pub trait Console {
    /// Whether somebody is listening. Output is pointless otherwise.
    fn is_attached(&self) -> bool;

    /// Queues bytes for output. Never fails; a broken sink drops them.
    fn write(&mut self, bytes: &[u8]);

    /// Waits up to `timeout` for one input byte.
    async fn poll_byte(&mut self, timeout: Duration) -> Option<u8>;

    /// Pushes queued output to the device.
    async fn flush(&mut self) {}
}

impl<C: Console + ?Sized> Console for &mut C {
    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }

    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes)
    }

    async fn poll_byte(&mut self, timeout: Duration) -> Option<u8> {
        (**self).poll_byte(timeout).await
    }

    async fn flush(&mut self) {
        (**self).flush().await
    }
}

/// A monotonic time source for the reader's idle timer.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by the Embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A [`Console`] over any `embedded-io-async` byte stream.
///
/// Output is staged in a `TX`-byte queue; bytes that do not fit are counted
/// and dropped. A transport error while flushing marks the console detached,
/// which in turn silences the diagnostic logger.
pub struct SerialConsole<T, const TX: usize = 256> {
    io: T,
    attached: bool,
    tx: Vec<u8, TX>,
    dropped: usize,
}

impl<T, const TX: usize> SerialConsole<T, TX>
where
    T: Read + Write,
{
    /// Wraps `io`. The console starts out attached.
    pub fn new(io: T) -> Self {
        Self {
            io,
            attached: true,
            tx: Vec::new(),
            dropped: 0,
        }
    }

    /// Updates the attached flag, e.g. from a USB DTR line.
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
        if !attached {
            self.tx.clear();
        }
    }

    /// Number of output bytes lost to a full queue or a detached console.
    pub fn dropped_bytes(&self) -> usize {
        self.dropped
    }

    /// Number of bytes waiting to be flushed.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }

    pub fn into_inner(self) -> T {
        self.io
    }

    /// Flushes the output queue and reports transport failures.
    pub async fn try_flush(&mut self) -> Result<(), ConsoleError<T::Error>> {
        if !self.attached {
            return Err(ConsoleError::Detached);
        }
        if self.tx.is_empty() {
            return Ok(());
        }

        let result = match self.io.write_all(&self.tx).await {
            Ok(()) => self.io.flush().await,
            Err(e) => Err(e),
        };
        self.tx.clear();

        result.map_err(|e| {
            #[cfg(feature = "esp32-log")]
            esp_println::println!("console write error: {:?}", e);
            #[cfg(feature = "log")]
            log::warn!("console write error, marking detached");

            self.attached = false;
            ConsoleError::Transport(e)
        })
    }

    /// Reads a single byte, racing the read against a timer.
    ///
    /// Always takes the full `timeout` unless a byte arrives, so a stream
    /// that reports end-of-file or an error still paces the caller.
    async fn read_with_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<u8>, ConsoleError<T::Error>> {
        let deadline = Instant::now() + timeout;
        let mut byte = [0u8; 1];

        let outcome = {
            let read_fut = self.io.read(&mut byte);
            let timer = Timer::at(deadline);
            match futures::future::select(core::pin::pin!(read_fut), core::pin::pin!(timer)).await
            {
                futures::future::Either::Left((result, _)) => Some(result),
                futures::future::Either::Right(((), _)) => None,
            }
        };

        match outcome {
            None => Ok(None),
            Some(Ok(0)) => {
                Timer::at(deadline).await;
                Ok(None)
            }
            Some(Ok(_)) => Ok(Some(byte[0])),
            Some(Err(e)) => {
                Timer::at(deadline).await;
                Err(e.into())
            }
        }
    }
}

impl<T, const TX: usize> Console for SerialConsole<T, TX>
where
    T: Read + Write,
{
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn write(&mut self, bytes: &[u8]) {
        if !self.attached {
            self.dropped += bytes.len();
            return;
        }
        let room = TX - self.tx.len();
        let take = bytes.len().min(room);
        // `take` never exceeds the free room, so this cannot fail.
        let _ = self.tx.extend_from_slice(&bytes[..take]);
        self.dropped += bytes.len() - take;
    }

    async fn poll_byte(&mut self, timeout: Duration) -> Option<u8> {
        let _ = self.try_flush().await;
        match self.read_with_timeout(timeout).await {
            Ok(byte) => byte,
            Err(_e) => {
                #[cfg(feature = "esp32-log")]
                esp_println::println!("console read error: {:?}", _e);
                None
            }
        }
    }

    async fn flush(&mut self) {
        let _ = self.try_flush().await;
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Host-side stand-ins for the console, the clock and the delay.

    use core::cell::Cell;
    use std::collections::VecDeque;
    use std::vec::Vec;

    use embassy_time::{Duration, Instant};

    use super::{Clock, Console};

    /// Scripted input, captured output. `None` entries are poll timeouts.
    pub struct MockConsole {
        pub input: VecDeque<Option<u8>>,
        pub output: Vec<u8>,
        pub attached: bool,
        pub polls: usize,
    }

    impl MockConsole {
        pub fn new() -> Self {
            Self {
                input: VecDeque::new(),
                output: Vec::new(),
                attached: true,
                polls: 0,
            }
        }

        pub fn with_keys(keys: &[u8]) -> Self {
            let mut console = Self::new();
            console.input.extend(keys.iter().copied().map(Some));
            console
        }

        pub fn detached() -> Self {
            let mut console = Self::new();
            console.attached = false;
            console
        }

        pub fn output_str(&self) -> &str {
            core::str::from_utf8(&self.output).unwrap()
        }
    }

    impl Console for MockConsole {
        fn is_attached(&self) -> bool {
            self.attached
        }

        fn write(&mut self, bytes: &[u8]) {
            self.output.extend_from_slice(bytes);
        }

        async fn poll_byte(&mut self, _timeout: Duration) -> Option<u8> {
            self.polls += 1;
            self.input.pop_front().flatten()
        }
    }

    /// Advances by `step` every time it is read.
    pub struct StepClock {
        now: Cell<u64>,
        step: u64,
    }

    impl StepClock {
        pub fn new(step_ms: u64) -> Self {
            Self {
                now: Cell::new(0),
                step: step_ms,
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> Instant {
            let now = self.now.get();
            self.now.set(now + self.step);
            Instant::from_millis(now)
        }
    }

    /// A delay that returns immediately and records what it was asked for.
    #[derive(Default)]
    pub struct NoDelay {
        pub calls: usize,
        pub total_ns: u64,
    }

    impl embedded_hal_async::delay::DelayNs for NoDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.total_ns += u64::from(ns);
        }
    }
}
