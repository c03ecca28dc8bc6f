#![macro_use]
#![cfg_attr(not(feature = "std"), no_std)]
#![allow(async_fn_in_trait)]
//! Environmental telemetry for the STM32 IoT Discovery board (B-L475E-IOT01A).
//!
//! The crate samples the on-board HTS221 (temperature and relative humidity) and LPS22HB
//! (barometric pressure) sensors over I2C, converts the raw register values into physical units
//! and publishes them as a JSON document over MQTT on a fixed cadence.
//!
//! The bus, the network socket and the MQTT client are external collaborators: the drivers are
//! written against [`embedded_hal_async::i2c::I2c`], the transport adapter against
//! [`embedded_io_async`], and the publish loop against the [`traits::mqtt::PublishClient`] trait.
//!
//! # Example
//!
//! ```ignore
//! let config = TelemetryConfig::default();
//! let mut publisher = TelemetryPublisher::initialize(board.i2c2, client, config).await?;
//! publisher.connect().await?;
//! match publisher.run().await {
//!     Ok(never) => match never {},
//!     Err(e) => telemetry::halt(e).await,
//! }
//! ```

pub(crate) mod fmt;

pub mod config;
pub use config::{DriverConfig, FailurePolicy, TelemetryConfig};

pub mod traits;

pub mod drivers;

pub mod domain;

pub mod network;

pub mod telemetry;
pub use telemetry::{Stage, TelemetryError, TelemetryPublisher};

#[cfg(feature = "std")]
pub mod testutil;
