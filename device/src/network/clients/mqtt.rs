//! [`PublishClient`] on top of the `rust-mqtt` v5 client.

use crate::config::TelemetryConfig;
use crate::traits::mqtt::{PacketIds, Publish, PublishClient, PublishError, QoS};
use embedded_io_async::{Read, Write};
use rand_core::RngCore;
use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::packet::v5::reason_codes::ReasonCode;

/// Client configuration for `config`: client id, keep-alive and a clean session.
pub fn client_config<'a, const MAX_PROPERTIES: usize, R: RngCore>(
    config: &TelemetryConfig<'a>,
    max_packet_size: u32,
    rng: R,
) -> ClientConfig<'a, MAX_PROPERTIES, R> {
    let mut client_config = ClientConfig::new(MqttVersion::MQTTv5, rng);
    client_config.add_client_id(config.client_id);
    client_config.keep_alive = config.keep_alive_secs;
    client_config.max_packet_size = max_packet_size;
    client_config
}

pub struct MqttPublisher<'a, T, const MAX_PROPERTIES: usize, R>
where
    T: Read + Write,
    R: RngCore,
{
    client: MqttClient<'a, T, MAX_PROPERTIES, R>,
    packet_ids: PacketIds,
    connected: bool,
}

impl<'a, T, const MAX_PROPERTIES: usize, R> MqttPublisher<'a, T, MAX_PROPERTIES, R>
where
    T: Read + Write,
    R: RngCore,
{
    pub fn new(client: MqttClient<'a, T, MAX_PROPERTIES, R>) -> Self {
        Self {
            client,
            packet_ids: PacketIds::new(),
            connected: false,
        }
    }
}

impl<'a, T, const MAX_PROPERTIES: usize, R> PublishClient
    for MqttPublisher<'a, T, MAX_PROPERTIES, R>
where
    T: Read + Write,
    R: RngCore,
{
    async fn connect(&mut self) -> Result<(), PublishError> {
        self.client.connect_to_broker().await.map_err(to_error)?;
        self.connected = true;
        Ok(())
    }

    fn next_packet_id(&mut self) -> u16 {
        self.packet_ids.next_id()
    }

    async fn publish(&mut self, message: Publish<'_>) -> Result<(), PublishError> {
        if !self.connected {
            return Err(PublishError::NotConnected);
        }
        // rust-mqtt assigns its own packet identifiers on the wire.
        self.client
            .send_message(
                message.topic,
                message.payload,
                quality_of_service(message.qos),
                false,
            )
            .await
            .map_err(to_error)
    }
}

fn quality_of_service(qos: QoS) -> QualityOfService {
    match qos {
        QoS::AtMostOnce => QualityOfService::QoS0,
        QoS::AtLeastOnce => QualityOfService::QoS1,
        QoS::ExactlyOnce => QualityOfService::QoS2,
    }
}

fn to_error(code: ReasonCode) -> PublishError {
    if matches!(code, ReasonCode::NetworkError) {
        PublishError::Network
    } else {
        PublishError::Rejected(code.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_mqtt::utils::rng_generator::CountingRng;

    #[test]
    fn test_client_config() {
        let config = TelemetryConfig::default();
        let client = client_config::<5, _>(&config, 2048, CountingRng(0));
        assert_eq!(60, client.keep_alive);
        assert_eq!(2048, client.max_packet_size);
        assert_eq!("lab4-iot-client", client.client_id.string);
        assert_eq!(15, client.client_id.len);

        let config = TelemetryConfig {
            client_id: "bench",
            keep_alive_secs: 30,
            ..TelemetryConfig::default()
        };
        let client = client_config::<5, _>(&config, 1024, CountingRng(0));
        assert_eq!(30, client.keep_alive);
        assert_eq!("bench", client.client_id.string);
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(PublishError::Network, to_error(ReasonCode::NetworkError));
        assert_eq!(
            PublishError::Rejected(0x87),
            to_error(ReasonCode::NotAuthorized)
        );
    }

    #[test]
    fn test_qos() {
        assert_eq!(QualityOfService::QoS0, quality_of_service(QoS::AtMostOnce));
        assert_eq!(QualityOfService::QoS1, quality_of_service(QoS::AtLeastOnce));
        assert_eq!(QualityOfService::QoS2, quality_of_service(QoS::ExactlyOnce));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_publish_requires_connect() {
        use crate::testutil::TestSocket;
        use futures::executor::block_on;

        let config = TelemetryConfig::default();
        let mut write_buffer = [0; 128];
        let mut recv_buffer = [0; 128];
        let client = MqttClient::<_, 5, _>::new(
            TestSocket::new(),
            &mut write_buffer,
            128,
            &mut recv_buffer,
            128,
            client_config(&config, 128, CountingRng(0)),
        );
        let mut publisher = MqttPublisher::new(client);

        let message = Publish {
            topic: config.topic,
            payload: b"{}",
            qos: QoS::AtMostOnce,
            packet_id: publisher.next_packet_id(),
        };
        assert_eq!(1, message.packet_id);
        assert_eq!(
            Err(PublishError::NotConnected),
            block_on(publisher.publish(message))
        );
    }
}
