//! The MQTT session record.
//!
//! One [`MqttSession`] holds the last topic and payload that went through the
//! console, in or out, together with their split forms. It is owned by the
//! console task and passed by reference into every operation.

use heapless::String;

use crate::config::{PAYLOAD_CAPACITY, TOPIC_CAPACITY};
use crate::diag;
use crate::diag::DiagnosticSink;
use crate::outbox::MqttRequest;
use crate::tokenizer::{ParseUnit, PayloadTokens, TopicTokens};
use crate::util::{copy_truncated, utf8_prefix};

const RULE: &str = "================================================================";

/// Payload marker recorded for a subscribe request.
pub const SUBSCRIBE_MARKER: &str = "1";
/// Payload marker recorded for an unsubscribe request.
pub const UNSUBSCRIBE_MARKER: &str = "0";

#[derive(Debug, Clone, Default)]
pub struct MqttSession {
    topic: String<TOPIC_CAPACITY>,
    payload: String<PAYLOAD_CAPACITY>,
    payload_len: usize,
    sub_topics: TopicTokens,
    sub_payloads: PayloadTokens,
    total_errors: u32,
}

impl MqttSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the last topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Get the last payload, cut to fit.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Length of the last payload as received, before any truncation.
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// Get the segments of the last parsed topic.
    pub fn sub_topics(&self) -> &TopicTokens {
        &self.sub_topics
    }

    /// Get the segments of the last parsed payload.
    pub fn sub_payloads(&self) -> &PayloadTokens {
        &self.sub_payloads
    }

    /// Get the number of errors recorded so far.
    pub fn total_errors(&self) -> u32 {
        self.total_errors
    }

    /// Stores `topic`, cut to fit. Returns `false` when it was cut.
    pub fn set_topic(&mut self, topic: &str) -> bool {
        copy_truncated(&mut self.topic, topic)
    }

    /// Stores `payload`, cut to fit. Returns `false` when it was cut.
    pub fn set_payload(&mut self, payload: &str) -> bool {
        self.payload_len = payload.len();
        copy_truncated(&mut self.payload, payload)
    }

    pub fn record_error(&mut self) {
        self.total_errors = self.total_errors.saturating_add(1);
    }

    /// Records an incoming publish from the MQTT client.
    ///
    /// A payload that is not UTF-8 is kept up to its first invalid byte.
    pub fn on_incoming_publish(&mut self, topic: &str, payload: &[u8], sink: &mut dyn DiagnosticSink) {
        self.set_topic(topic);
        self.set_payload(utf8_prefix(payload));
        self.payload_len = payload.len();
        diag!(
            sink,
            "on_incoming_publish",
            "********** Topic: [{}]   Message: [{}]\r",
            self.topic,
            self.payload
        );
    }

    /// Notes what a request is about, the way the console did before handing
    /// it over: the topic, plus the payload or a subscribe marker.
    pub fn record_request<const T: usize, const P: usize>(&mut self, request: &MqttRequest<T, P>) {
        self.set_topic(request.topic());
        match request {
            MqttRequest::Subscribe { .. } => {
                self.set_payload(SUBSCRIBE_MARKER);
            }
            MqttRequest::Unsubscribe { .. } => {
                self.set_payload(UNSUBSCRIBE_MARKER);
            }
            MqttRequest::Publish { payload, .. } => {
                self.set_payload(utf8_prefix(payload));
                self.payload_len = payload.len();
            }
        }
    }

    /// Splits the stored topic or payload into its token set.
    pub fn parse(&mut self, unit: ParseUnit, sink: &mut dyn DiagnosticSink) {
        match unit {
            ParseUnit::Topic => {
                diag!(sink, "parse", "{} string: <{}>\r", unit.label(), self.topic);
                self.sub_topics.parse(&self.topic);
            }
            ParseUnit::Payload => {
                diag!(sink, "parse", "{} string: <{}>\r", unit.label(), self.payload);
                self.sub_payloads.parse(&self.payload);
            }
        }
    }

    /// Like [`parse`](Self::parse) with a raw selector. An unknown selector
    /// is logged and leaves both token sets as they were.
    pub fn parse_raw(&mut self, unit: u8, sink: &mut dyn DiagnosticSink) {
        match ParseUnit::try_from(unit) {
            Ok(unit) => self.parse(unit, sink),
            Err(_) => {
                diag!(sink, "parse", "Invalid parameter passed as ParseUnit: {}\r", unit);
            }
        }
    }

    /// Logs every slot of both token sets.
    pub fn display_tokens(&self, sink: &mut dyn DiagnosticSink) {
        diag!(sink, "display_tokens", "Display Topic and SubTopics:\r");
        diag!(sink, "display_tokens", "============================\r");
        for (i, segment) in self.sub_topics.iter().enumerate() {
            diag!(sink, "display_tokens", "SubTopic {:2}: <{}>\r", i, segment);
        }

        diag!(sink, "display_tokens", "\rDisplay Payload and SubPayloads:\r");
        diag!(sink, "display_tokens", "================================\r");
        for (i, segment) in self.sub_payloads.iter().enumerate() {
            diag!(sink, "display_tokens", "SubPayload {:2}: <{}>\r", i, segment);
        }
    }

    /// Logs a summary of the session.
    pub fn report(&self, sink: &mut dyn DiagnosticSink) {
        diag!(sink, "report", "{}\r", RULE);
        diag!(sink, "report", "                        MQTT information\r");
        diag!(sink, "report", "{}\r", RULE);
        diag!(sink, "report", "   Total unique error count: {}\r", self.total_errors);
        diag!(sink, "report", "   Last Topic:              <{}>\r", self.topic);
        diag!(sink, "report", "   Last Payload:            <{}>\r", self.payload);
        diag!(sink, "report", "   Last PayloadLength:      <{}>\r", self.payload_len);

        diag!(sink, "report", "{}\r", RULE);
        diag!(sink, "report", "   Last Topic details:\r");
        for (i, segment) in self.sub_topics.iter().enumerate() {
            diag!(sink, "report", "   [{:2}] <{}>\r", i, segment);
        }

        diag!(sink, "report", "{}\r", RULE);
        diag!(sink, "report", "   Last Payload details:\r");
        for (i, segment) in self.sub_payloads.iter().enumerate() {
            diag!(sink, "report", "   [{:2}] <{}>\r", i, segment);
        }
        diag!(sink, "report", "{}\r", RULE);
    }
}

#[cfg(test)]
mod tests {
    use core::fmt;
    use std::string::String as StdString;
    use std::vec::Vec as StdVec;

    use super::*;
    use crate::diag::DiagnosticLogger;
    use crate::console::mock::MockConsole;

    /// Captures rendered messages without the console prefix.
    #[derive(Default)]
    struct Recorder {
        lines: StdVec<(StdString, StdString)>,
    }

    impl DiagnosticSink for Recorder {
        fn log(&mut self, _line: u32, tag: &str, args: fmt::Arguments<'_>) {
            self.lines.push((tag.into(), std::format!("{}", args)));
        }
    }

    #[test]
    fn test_parse_topic_and_payload() {
        let mut session = MqttSession::new();
        let mut sink = Recorder::default();

        session.set_topic("/home/kitchen/light");
        session.set_payload("on/75");
        session.parse(ParseUnit::Topic, &mut sink);
        session.parse(ParseUnit::Payload, &mut sink);

        assert_eq!(&session.sub_topics()[0], "home");
        assert_eq!(&session.sub_topics()[2], "light");
        assert_eq!(&session.sub_payloads()[1], "75");
        assert_eq!(sink.lines[0].1, "Topic string: </home/kitchen/light>\r");
        assert_eq!(sink.lines[1].1, "Payload string: <on/75>\r");
    }

    #[test]
    fn test_invalid_unit_leaves_tokens_alone() {
        let mut session = MqttSession::new();
        let mut sink = Recorder::default();

        session.set_topic("a/b");
        session.parse_raw(crate::tokenizer::PARSE_TOPIC, &mut sink);
        session.set_topic("c/d");
        session.parse_raw(9, &mut sink);

        assert_eq!(&session.sub_topics()[0], "a");
        assert_eq!(
            sink.lines.last().unwrap().1,
            "Invalid parameter passed as ParseUnit: 9\r"
        );
    }

    #[test]
    fn test_incoming_publish_is_stored() {
        let mut session = MqttSession::new();
        let mut sink = Recorder::default();

        session.on_incoming_publish("sensors/temp", b"21.5\xff", &mut sink);

        assert_eq!(session.topic(), "sensors/temp");
        assert_eq!(session.payload(), "21.5");
        assert_eq!(session.payload_len(), 5);
        assert!(sink.lines[0].1.contains("Topic: [sensors/temp]"));
    }

    #[test]
    fn test_long_topic_is_cut() {
        let mut session = MqttSession::new();
        let long = "t".repeat(150);
        assert!(!session.set_topic(&long));
        assert_eq!(session.topic().len(), TOPIC_CAPACITY);
    }

    #[test]
    fn test_requests_leave_markers() {
        let mut session = MqttSession::new();

        session.record_request(&MqttRequest::<32, 32>::subscribe("a/b").unwrap());
        assert_eq!(session.payload(), SUBSCRIBE_MARKER);

        session.record_request(&MqttRequest::<32, 32>::unsubscribe("a/b").unwrap());
        assert_eq!(session.payload(), UNSUBSCRIBE_MARKER);

        session.record_request(&MqttRequest::<32, 32>::publish("c", b"go").unwrap());
        assert_eq!(session.topic(), "c");
        assert_eq!(session.payload(), "go");
    }

    #[test]
    fn test_error_counter_saturates() {
        let mut session = MqttSession::new();
        session.total_errors = u32::MAX - 1;
        session.record_error();
        session.record_error();
        assert_eq!(session.total_errors(), u32::MAX);
    }

    #[test]
    fn test_display_tokens_lists_every_slot() {
        let mut session = MqttSession::new();
        let mut sink = Recorder::default();
        session.set_topic("x/y");
        session.parse(ParseUnit::Topic, &mut sink);
        sink.lines.clear();

        session.display_tokens(&mut sink);

        let topic_lines: StdVec<_> = sink
            .lines
            .iter()
            .filter(|(_, m)| m.starts_with("SubTopic"))
            .collect();
        assert_eq!(topic_lines.len(), 10);
        assert_eq!(topic_lines[1].1, "SubTopic  1: <y>\r");
    }

    #[test]
    fn test_report_through_console() {
        let mut session = MqttSession::new();
        session.set_topic("a");
        session.record_error();

        let mut console = MockConsole::new();
        let logger = DiagnosticLogger::default();
        session.report(&mut logger.bind(&mut console));

        let out = console.output_str();
        assert!(out.contains("[report]"));
        assert!(out.contains("Total unique error count: 1"));
        assert!(out.contains("Last Topic:              <a>"));
    }
}
