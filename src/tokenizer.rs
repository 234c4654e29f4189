//! # Delimiter Tokenizer
//!
//! Splits a slash-delimited topic or payload into a fixed number of bounded
//! segments. Nothing here fails: extra segments are dropped and over-long
//! segments are cut.
//!
//! Scanning rules:
//!
//! - A `/` in the very first position is skipped, so `/a/b` and `a/b` split
//!   the same way. Only that one leading delimiter is absorbed.
//! - Any other `/` moves on to the next segment. Once the segment index
//!   reaches the set's capacity, the rest of the input is ignored.
//! - When a segment reaches its length limit and the next character is not
//!   a `/`, everything up to the next `/` (or the end) is discarded.
//! - Slots that receive nothing stay empty, which is also how a trailing `/`
//!   shows up.

use core::ops::Index;

use heapless::String;

use crate::config::{MAX_PAYLOAD_LENGTH, MAX_SUB_PAYLOAD, MAX_SUB_TOPIC, MAX_TOPIC_LENGTH};
use crate::error::ParseUnitError;

/// Separator between topic levels and payload fields.
pub const DELIMITER: char = '/';

/// Raw selector for [`ParseUnit::Topic`].
pub const PARSE_TOPIC: u8 = 1;
/// Raw selector for [`ParseUnit::Payload`].
pub const PARSE_PAYLOAD: u8 = 2;

/// Which string of a session is being split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseUnit {
    Topic,
    Payload,
}

impl ParseUnit {
    /// Segment-count and segment-length limits for this unit, the length
    /// including the terminator slot.
    pub const fn limits(self) -> (usize, usize) {
        match self {
            ParseUnit::Topic => (MAX_SUB_TOPIC, MAX_TOPIC_LENGTH),
            ParseUnit::Payload => (MAX_SUB_PAYLOAD, MAX_PAYLOAD_LENGTH),
        }
    }

    /// Get the raw selector value for this unit.
    pub const fn code(self) -> u8 {
        match self {
            ParseUnit::Topic => PARSE_TOPIC,
            ParseUnit::Payload => PARSE_PAYLOAD,
        }
    }

    /// Get the name used for this unit in log lines.
    pub const fn label(self) -> &'static str {
        match self {
            ParseUnit::Topic => "Topic",
            ParseUnit::Payload => "Payload",
        }
    }
}

impl TryFrom<u8> for ParseUnit {
    type Error = ParseUnitError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            PARSE_TOPIC => Ok(ParseUnit::Topic),
            PARSE_PAYLOAD => Ok(ParseUnit::Payload),
            other => Err(ParseUnitError::Invalid(other)),
        }
    }
}

/// `COUNT` segments of at most `LEN` bytes each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet<const COUNT: usize, const LEN: usize> {
    segments: [String<LEN>; COUNT],
}

/// Token set for topics: 10 segments of up to 39 bytes.
pub type TopicTokens = TokenSet<MAX_SUB_TOPIC, { MAX_TOPIC_LENGTH - 1 }>;
/// Token set for payloads: 10 segments of up to 39 bytes.
pub type PayloadTokens = TokenSet<MAX_SUB_PAYLOAD, { MAX_PAYLOAD_LENGTH - 1 }>;

impl<const COUNT: usize, const LEN: usize> Default for TokenSet<COUNT, LEN> {
    fn default() -> Self {
        Self {
            segments: core::array::from_fn(|_| String::new()),
        }
    }
}

impl<const COUNT: usize, const LEN: usize> TokenSet<COUNT, LEN> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `source` into a fresh set.
    pub fn from_source(source: &str) -> Self {
        let mut set = Self::new();
        set.parse(source);
        set
    }

    /// Empties every segment.
    pub fn clear(&mut self) {
        for segment in self.segments.iter_mut() {
            segment.clear();
        }
    }

    /// Replaces the contents of this set with the segments of `source`.
    pub fn parse(&mut self, source: &str) {
        self.clear();
        if COUNT == 0 {
            return;
        }

        let mut item = 0;
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            if c == DELIMITER {
                if pos == 0 {
                    continue;
                }
                item += 1;
                if item >= COUNT {
                    break;
                }
                continue;
            }

            let segment = &mut self.segments[item];
            let stored = segment.push(c).is_ok();
            let at_limit = !stored || segment.len() >= LEN;

            if at_limit && chars.peek().map(|&(_, next)| next) != Some(DELIMITER) {
                while chars.next_if(|&(_, next)| next != DELIMITER).is_some() {}
            }
        }

        #[cfg(feature = "log")]
        log::trace!("split {} bytes into {} segments", source.len(), self.occupied());
    }

    /// Segment `index`, or `""` past the end.
    pub fn segment(&self, index: usize) -> &str {
        self.segments.get(index).map(|s| s.as_str()).unwrap_or("")
    }

    /// Every slot in order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.as_str())
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        COUNT
    }

    /// Longest segment this set can hold, in bytes.
    pub const fn segment_limit(&self) -> usize {
        LEN
    }

    /// Number of slots holding something.
    pub fn occupied(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.is_empty())
    }

    /// Joins the segments back with `/`, leaving out trailing empty slots.
    ///
    /// Returns `false` when `out` was too small.
    pub fn join_into<const N: usize>(&self, out: &mut String<N>) -> bool {
        out.clear();
        let used = self
            .segments
            .iter()
            .rposition(|s| !s.is_empty())
            .map_or(0, |last| last + 1);

        for (i, segment) in self.segments[..used].iter().enumerate() {
            if i > 0 && out.push(DELIMITER).is_err() {
                return false;
            }
            if out.push_str(segment).is_err() {
                return false;
            }
        }
        true
    }
}

impl<const COUNT: usize, const LEN: usize> Index<usize> for TokenSet<COUNT, LEN> {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        self.segments[index].as_str()
    }
}

/// Splits a topic with the topic limits.
pub fn tokenize_topic(source: &str) -> TopicTokens {
    TopicTokens::from_source(source)
}

/// Splits a payload with the payload limits.
pub fn tokenize_payload(source: &str) -> PayloadTokens {
    PayloadTokens::from_source(source)
}
