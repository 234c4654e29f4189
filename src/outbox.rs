//! Requests for the MQTT client.
//!
//! The console never talks to the broker itself. What the user enters is
//! packed into owned [`MqttRequest`]s and handed to whatever drives the MQTT
//! client, either through a [`RequestOutbox`] collected synchronously or
//! through a [`RequestSender`] over an Embassy channel.

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::{Channel, Receiver, Sender};
use heapless::{String, Vec};

use crate::config::{PAYLOAD_CAPACITY, TOPIC_CAPACITY};
use crate::line::InputLine;

/// Quality of Service levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum QoS {
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

/// A subscribe, publish or unsubscribe request with inline storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttRequest<const TOPIC: usize = TOPIC_CAPACITY, const PAYLOAD: usize = PAYLOAD_CAPACITY> {
    Subscribe {
        topic: String<TOPIC>,
        qos: QoS,
    },
    Publish {
        topic: String<TOPIC>,
        payload: Vec<u8, PAYLOAD>,
        qos: QoS,
        retain: bool,
    },
    Unsubscribe {
        topic: String<TOPIC>,
    },
}

impl<const TOPIC: usize, const PAYLOAD: usize> MqttRequest<TOPIC, PAYLOAD> {
    /// Subscribe at QoS 1. `None` if the topic does not fit.
    pub fn subscribe(topic: &str) -> Option<Self> {
        Some(Self::Subscribe {
            topic: String::try_from(topic).ok()?,
            qos: QoS::AtLeastOnce,
        })
    }

    /// Publish at QoS 0 without retain. `None` if either part does not fit.
    pub fn publish(topic: &str, payload: &[u8]) -> Option<Self> {
        Some(Self::Publish {
            topic: String::try_from(topic).ok()?,
            payload: Vec::from_slice(payload).ok()?,
            qos: QoS::AtMostOnce,
            retain: false,
        })
    }

    /// Unsubscribe from `topic`. `None` if the topic does not fit.
    pub fn unsubscribe(topic: &str) -> Option<Self> {
        Some(Self::Unsubscribe {
            topic: String::try_from(topic).ok()?,
        })
    }

    /// Builds a publish from two console lines. Cancelled, blank or non-UTF-8
    /// topics are refused.
    pub fn publish_from_lines(topic: &InputLine, payload: &InputLine) -> Option<Self> {
        let topic = usable_topic(topic)?;
        let payload = if payload.is_blank() || payload.is_cancel() {
            &[][..]
        } else {
            payload.as_bytes()
        };
        Self::publish(topic, payload)
    }

    /// Builds a subscribe from a console line. Cancelled, blank or non-UTF-8
    /// lines are refused.
    pub fn subscribe_from_line(topic: &InputLine) -> Option<Self> {
        Self::subscribe(usable_topic(topic)?)
    }

    /// Builds an unsubscribe from a console line, refusing the same lines as
    /// [`subscribe_from_line`](Self::subscribe_from_line).
    pub fn unsubscribe_from_line(topic: &InputLine) -> Option<Self> {
        Self::unsubscribe(usable_topic(topic)?)
    }

    pub fn topic(&self) -> &str {
        match self {
            Self::Subscribe { topic, .. }
            | Self::Publish { topic, .. }
            | Self::Unsubscribe { topic } => topic.as_str(),
        }
    }
}

fn usable_topic(line: &InputLine) -> Option<&str> {
    if line.is_blank() || line.is_cancel() {
        return None;
    }
    line.as_str()
}

/// Object-safe sink for requests.
pub trait RequestOutbox<const TOPIC: usize = TOPIC_CAPACITY, const PAYLOAD: usize = PAYLOAD_CAPACITY>
{
    /// Queues a request. Returns `false` if it was dropped.
    fn submit(&mut self, request: MqttRequest<TOPIC, PAYLOAD>) -> bool;
}

/// Collects requests until the MQTT side drains them.
pub struct BufferedOutbox<
    const CAPACITY: usize,
    const TOPIC: usize = TOPIC_CAPACITY,
    const PAYLOAD: usize = PAYLOAD_CAPACITY,
> {
    requests: Vec<MqttRequest<TOPIC, PAYLOAD>, CAPACITY>,
}

impl<const CAPACITY: usize, const TOPIC: usize, const PAYLOAD: usize>
    BufferedOutbox<CAPACITY, TOPIC, PAYLOAD>
{
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
        }
    }

    /// Removes and yields the queued requests in submission order.
    pub fn drain(&mut self) -> impl Iterator<Item = MqttRequest<TOPIC, PAYLOAD>> + '_ {
        self.requests.drain(..)
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}

impl<const CAPACITY: usize, const TOPIC: usize, const PAYLOAD: usize> Default
    for BufferedOutbox<CAPACITY, TOPIC, PAYLOAD>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAPACITY: usize, const TOPIC: usize, const PAYLOAD: usize> RequestOutbox<TOPIC, PAYLOAD>
    for BufferedOutbox<CAPACITY, TOPIC, PAYLOAD>
{
    fn submit(&mut self, request: MqttRequest<TOPIC, PAYLOAD>) -> bool {
        self.requests.push(request).is_ok()
    }
}

pub type RequestChannel<const DEPTH: usize, M = CriticalSectionRawMutex> =
    Channel<M, MqttRequest, DEPTH>;

pub type RequestReceiver<'a, const DEPTH: usize, M = CriticalSectionRawMutex> =
    Receiver<'a, M, MqttRequest, DEPTH>;

/// Cloneable handle the console task uses to reach the MQTT task.
pub struct RequestSender<'a, const DEPTH: usize, M: RawMutex = CriticalSectionRawMutex> {
    tx: Sender<'a, M, MqttRequest, DEPTH>,
}

impl<M: RawMutex, const DEPTH: usize> Clone for RequestSender<'_, DEPTH, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, const DEPTH: usize> Copy for RequestSender<'_, DEPTH, M> {}

impl<'a, M: RawMutex, const DEPTH: usize> RequestSender<'a, DEPTH, M> {
    pub fn new(channel: &'a Channel<M, MqttRequest, DEPTH>) -> Self {
        Self {
            tx: channel.sender(),
        }
    }

    /// Sends a request, waiting while the channel is full.
    pub async fn send(&self, request: MqttRequest) {
        self.tx.send(request).await;
    }
}

impl<M: RawMutex, const DEPTH: usize> RequestOutbox for RequestSender<'_, DEPTH, M> {
    fn submit(&mut self, request: MqttRequest) -> bool {
        self.tx.try_send(request).is_ok()
    }
}
