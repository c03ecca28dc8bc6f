//! Periodic sampling and publishing of the board's environmental sensors.

use crate::config::{ConfigError, FailurePolicy, TelemetryConfig};
use crate::domain::telemetry::{FormatError, TelemetryPayload, PAYLOAD_CAPACITY};
use crate::domain::PhysicalSample;
use crate::drivers::sensors::hts221::{register::calibration::Calibration, Hts221};
use crate::drivers::sensors::lps22hb::Lps22hb;
use crate::drivers::sensors::SensorError;
use crate::traits::mqtt::{Publish, PublishClient, PublishError, QoS};
use core::convert::Infallible;
use embassy_time::Timer;
use embedded_hal::i2c::Error as _;
use embedded_hal_async::i2c::I2c;

/// The operation a [`TelemetryError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    InitializeHts221,
    InitializeLps22hb,
    Calibrate,
    Trigger,
    ReadTemperature,
    ReadHumidity,
    ReadPressure,
    Format,
    Connect,
    Publish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError<E> {
    Config(ConfigError),
    Sensor(Stage, SensorError<E>),
    Format(FormatError),
    Publish(Stage, PublishError),
}

impl<E: embedded_hal::i2c::Error> TelemetryError<E> {
    /// The failing operation. Configuration errors happen before any operation runs.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TelemetryError::Config(_) => None,
            TelemetryError::Sensor(stage, _) | TelemetryError::Publish(stage, _) => Some(*stage),
            TelemetryError::Format(_) => Some(Stage::Format),
        }
    }

    /// Log a diagnostic naming the failing operation and its error code.
    pub fn report(&self) {
        match self {
            TelemetryError::Config(e) => error!("invalid configuration: {:?}", e),
            TelemetryError::Sensor(stage, SensorError::Bus(e)) => {
                error!("{:?} failed: I2C error {:?}", stage, e.kind())
            }
            TelemetryError::Sensor(stage, SensorError::Timeout) => {
                error!("{:?} failed: data-ready poll timed out", stage)
            }
            TelemetryError::Sensor(stage, SensorError::NotCalibrated) => {
                error!("{:?} failed: sensor not calibrated", stage)
            }
            TelemetryError::Format(e) => error!("Format failed: {:?}", e),
            TelemetryError::Publish(stage, e) => error!("{:?} failed: {:?}", stage, e),
        }
    }
}

/// Owns the bus, the sensors and the publish client, and drives the sample/publish cycle.
pub struct TelemetryPublisher<'a, I, P>
where
    I: I2c,
    P: PublishClient,
{
    i2c: I,
    client: P,
    hts221: Hts221,
    lps22hb: Lps22hb,
    calibration: Calibration,
    config: TelemetryConfig<'a>,
}

impl<'a, I, P> TelemetryPublisher<'a, I, P>
where
    I: I2c,
    P: PublishClient,
{
    /// Validate `config`, bring both sensors into one-shot mode and read the HTS221 calibration.
    pub async fn initialize(
        mut i2c: I,
        client: P,
        config: TelemetryConfig<'a>,
    ) -> Result<Self, TelemetryError<I::Error>> {
        config.validate().map_err(TelemetryError::Config)?;

        let mut hts221 = Hts221::with_config(config.sensor)
            .with_temperature_offset(config.temperature_offset);
        let mut lps22hb = Lps22hb::with_config(config.sensor);

        hts221
            .initialize(&mut i2c)
            .await
            .map_err(|e| TelemetryError::Sensor(Stage::InitializeHts221, e))?;
        let calibration = hts221
            .read_calibration(&mut i2c)
            .await
            .map_err(|e| TelemetryError::Sensor(Stage::Calibrate, e))?;
        lps22hb
            .initialize(&mut i2c)
            .await
            .map_err(|e| TelemetryError::Sensor(Stage::InitializeLps22hb, e))?;

        info!("Sensors initialized");
        Ok(Self {
            i2c,
            client,
            hts221,
            lps22hb,
            calibration,
            config,
        })
    }

    pub fn config(&self) -> &TelemetryConfig<'a> {
        &self.config
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Open the MQTT session.
    pub async fn connect(&mut self) -> Result<(), TelemetryError<I::Error>> {
        info!("Connecting to broker as {}", self.config.client_id);
        self.client
            .connect()
            .await
            .map_err(|e| TelemetryError::Publish(Stage::Connect, e))?;
        info!("Connected to broker");
        Ok(())
    }

    /// Run one conversion on each sensor.
    pub async fn sample(&mut self) -> Result<PhysicalSample, TelemetryError<I::Error>> {
        let i2c = &mut self.i2c;
        self.hts221
            .trigger_and_wait(i2c)
            .await
            .map_err(|e| TelemetryError::Sensor(Stage::Trigger, e))?;
        let temperature = self
            .hts221
            .read_temperature(i2c, &self.calibration)
            .await
            .map_err(|e| TelemetryError::Sensor(Stage::ReadTemperature, e))?;
        let humidity = self
            .hts221
            .read_humidity(i2c, &self.calibration)
            .await
            .map_err(|e| TelemetryError::Sensor(Stage::ReadHumidity, e))?;
        let pressure = self
            .lps22hb
            .read_pressure(i2c)
            .await
            .map_err(|e| TelemetryError::Sensor(Stage::ReadPressure, e))?;

        let sample = PhysicalSample {
            temperature,
            humidity,
            pressure,
        };
        info!("Sample: {:?}", sample);
        Ok(sample)
    }

    /// Publish `sample` on the configured topic, at most once.
    pub async fn publish(
        &mut self,
        sample: &PhysicalSample,
    ) -> Result<(), TelemetryError<I::Error>> {
        let payload = TelemetryPayload::<PAYLOAD_CAPACITY>::format(sample)
            .map_err(TelemetryError::Format)?;
        let message = Publish {
            topic: self.config.topic,
            payload: payload.as_bytes(),
            qos: QoS::AtMostOnce,
            packet_id: self.client.next_packet_id(),
        };
        debug!(
            "Publishing {} bytes to {}",
            message.payload.len(),
            message.topic
        );
        self.client
            .publish(message)
            .await
            .map_err(|e| TelemetryError::Publish(Stage::Publish, e))
    }

    /// Sample and publish forever, waiting the configured interval after every cycle.
    ///
    /// Only returns when a cycle fails under [`FailurePolicy::Halt`].
    pub async fn run(&mut self) -> Result<Infallible, TelemetryError<I::Error>> {
        loop {
            if let Err(e) = self.cycle().await {
                match self.config.failure_policy {
                    FailurePolicy::Halt => return Err(e),
                    FailurePolicy::SkipCycle => {
                        e.report();
                        warn!("Skipping cycle");
                    }
                }
            }
            Timer::after(self.config.interval()).await;
        }
    }

    async fn cycle(&mut self) -> Result<(), TelemetryError<I::Error>> {
        let sample = self.sample().await?;
        self.publish(&sample).await
    }

    /// Give back the bus and the client.
    pub fn release(self) -> (I, P) {
        (self.i2c, self.client)
    }
}

/// Report `error` and park the calling task for good.
pub async fn halt<E: embedded_hal::i2c::Error>(error: TelemetryError<E>) -> ! {
    error.report();
    error!("Telemetry halted");
    match core::future::pending::<Infallible>().await {}
}
