//! Runtime configuration for the sensor drivers and the telemetry loop.
//!
//! Defaults reproduce the settings the firmware shipped with. A configuration can also be loaded
//! from a JSON document using kebab-case keys, for example:
//!
//! ```json
//! { "topic": "site/lab/env", "interval-ms": 10000, "sensor": { "poll-timeout-ms": 250 } }
//! ```
//!
//! Missing keys keep their default value.

use embassy_time::Duration;
use serde::Deserialize;

/// Size of the MQTT send buffer shared by the payload and the protocol framing.
pub const SEND_BUFFER_SIZE: usize = 2048;

/// Worst-case MQTT framing around a QoS 0 PUBLISH: fixed header, topic length prefix and a
/// v5 property block.
pub const PUBLISH_OVERHEAD: usize = 16;

/// What the publish loop does when a cycle fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the loop and hand the error to the caller.
    #[default]
    Halt,
    /// Report the error and try again on the next cycle.
    SkipCycle,
}

/// Timing shared by both sensor drivers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default, rename_all = "kebab-case")]
pub struct DriverConfig {
    /// Delay after each power-state change, in milliseconds.
    pub settle_ms: u64,
    /// Upper bound for the data-ready poll, in milliseconds. `None` waits forever.
    pub poll_timeout_ms: Option<u64>,
}

impl DriverConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            poll_timeout_ms: None,
        }
    }
}

/// Configuration of the telemetry publisher.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default, rename_all = "kebab-case")]
pub struct TelemetryConfig<'a> {
    /// Topic every sample is published on.
    pub topic: &'a str,
    /// MQTT client identifier.
    pub client_id: &'a str,
    /// MQTT keep-alive, in seconds.
    pub keep_alive_secs: u16,
    /// Delay between two publish cycles, in milliseconds.
    pub interval_ms: u64,
    /// Subtracted from every calibrated HTS221 temperature, in °C.
    pub temperature_offset: f32,
    pub sensor: DriverConfig,
    pub failure_policy: FailurePolicy,
}

impl<'a> Default for TelemetryConfig<'a> {
    fn default() -> Self {
        Self {
            topic: "arm/edx/lab4",
            client_id: "lab4-iot-client",
            keep_alive_secs: 60,
            interval_ms: 5000,
            temperature_offset: 5.0,
            sensor: DriverConfig::default(),
            failure_policy: FailurePolicy::Halt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The document is not valid JSON or has a field of the wrong type.
    Malformed,
    EmptyTopic,
    /// The topic leaves no room for a full payload in the send buffer.
    TopicTooLong,
    ZeroInterval,
}

impl<'a> TelemetryConfig<'a> {
    /// Parse a configuration document. The returned configuration borrows its strings from `json`.
    pub fn from_json(json: &'a [u8]) -> Result<Self, ConfigError> {
        let (config, _) =
            serde_json_core::from_slice::<Self>(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that a publish built from this configuration fits the send buffer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if self.topic.len() + crate::domain::telemetry::PAYLOAD_CAPACITY + PUBLISH_OVERHEAD
            > SEND_BUFFER_SIZE
        {
            return Err(ConfigError::TopicTooLong);
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
