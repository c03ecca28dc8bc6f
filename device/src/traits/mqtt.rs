/// MQTT delivery guarantee of a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    /// Fire and forget.
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// A message ready to be handed to a [`PublishClient`].
#[derive(Debug, Clone, Copy)]
pub struct Publish<'m> {
    pub topic: &'m str,
    pub payload: &'m [u8],
    pub qos: QoS,
    /// Ignored by the broker for [`QoS::AtMostOnce`].
    pub packet_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishError {
    /// The underlying connection failed.
    Network,
    /// The broker or the client refused the request, with the MQTT reason code.
    Rejected(u8),
    NotConnected,
}

/// The operations the telemetry loop needs from an MQTT client.
///
/// Connection handshake and packet encoding are the client's business; implementations are
/// expected to run on top of a [`Transport`](crate::network::transport::Transport).
pub trait PublishClient {
    async fn connect(&mut self) -> Result<(), PublishError>;

    /// Allocate the identifier for the next outgoing packet. Never returns 0.
    fn next_packet_id(&mut self) -> u16;

    async fn publish(&mut self, message: Publish<'_>) -> Result<(), PublishError>;
}

impl<P: PublishClient> PublishClient for &mut P {
    async fn connect(&mut self) -> Result<(), PublishError> {
        P::connect(self).await
    }

    fn next_packet_id(&mut self) -> u16 {
        P::next_packet_id(self)
    }

    async fn publish(&mut self, message: Publish<'_>) -> Result<(), PublishError> {
        P::publish(self, message).await
    }
}

/// Packet identifier sequence: 1, 2, .., 65535, 1, ..
#[derive(Debug, Default, Clone, Copy)]
pub struct PacketIds {
    last: u16,
}

impl PacketIds {
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    pub fn next_id(&mut self) -> u16 {
        self.last = self.last.checked_add(1).unwrap_or(1);
        self.last
    }
}
