//! # Bounded Text Helpers
//!
//! Small utilities for working with `heapless` strings where overflow must
//! truncate instead of failing.

use core::fmt;

use heapless::String;

/// A `fmt::Write` adapter that keeps as much text as fits and drops the rest.
///
/// `heapless::String` rejects a `write_str` that does not fit as a whole;
/// this wrapper instead copies characters until the buffer is full, so a long
/// `format_args!` still yields its leading part.
pub struct Truncating<'a, const N: usize> {
    buf: &'a mut String<N>,
    truncated: bool,
}

impl<'a, const N: usize> Truncating<'a, N> {
    /// Create a new writer appending to `buf`.
    pub fn new(buf: &'a mut String<N>) -> Self {
        Self {
            buf,
            truncated: false,
        }
    }
}

impl<const N: usize> fmt::Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        if self.buf.push_str(s).is_ok() {
            return Ok(());
        }
        for c in s.chars() {
            if self.buf.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        // Reporting an error here would abort the surrounding `write!`.
        Ok(())
    }
}

/// Renders `args` into a fresh bounded string, cutting what does not fit.
pub fn format_truncated<const N: usize>(args: fmt::Arguments<'_>) -> String<N> {
    let mut out = String::new();
    let _ = fmt::write(&mut Truncating::new(&mut out), args);
    out
}

/// Copies as much of `src` as fits into `dst`, ending on a character boundary.
///
/// Returns `false` when something was cut.
pub fn copy_truncated<const N: usize>(dst: &mut String<N>, src: &str) -> bool {
    dst.clear();
    let mut end = src.len().min(N);
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    // `end` is at most `N` bytes and lies on a boundary.
    let _ = dst.push_str(&src[..end]);
    end == src.len()
}

/// The longest valid UTF-8 prefix of `bytes`.
pub fn utf8_prefix(bytes: &[u8]) -> &str {
    match core::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let valid = &bytes[..e.valid_up_to()];
            // `valid_up_to` marks the end of a verified prefix.
            core::str::from_utf8(valid).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncating_keeps_prefix() {
        let s: String<8> = format_truncated(format_args!("value={}", 123456));
        assert_eq!(s.as_str(), "value=12");
    }

    #[test]
    fn test_truncating_fits() {
        let s: String<16> = format_truncated(format_args!("{}-{}", "a", 1));
        assert_eq!(s.as_str(), "a-1");
    }

    #[test]
    fn test_copy_truncated_respects_char_boundary() {
        let mut dst: String<4> = String::new();
        assert!(!copy_truncated(&mut dst, "abcé"));
        assert_eq!(dst.as_str(), "abc");

        assert!(copy_truncated(&mut dst, "ok"));
        assert_eq!(dst.as_str(), "ok");
    }

    #[test]
    fn test_utf8_prefix_stops_at_invalid_byte() {
        assert_eq!(utf8_prefix(b"temp\xff22"), "temp");
        assert_eq!(utf8_prefix(b"22.5"), "22.5");
    }
}
