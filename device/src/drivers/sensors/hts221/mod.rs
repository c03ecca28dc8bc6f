//! Driver for the ST HTS221 relative humidity and temperature sensor.

pub mod register;

use super::{Deadline, SensorError, SensorState};
use crate::config::DriverConfig;
use crate::domain::{
    temperature::{Celsius, Temperature},
    SensorAcquisition,
};
use crate::traits::i2c::{I2cAddress, RegisterBus};
use embassy_time::Timer;
use register::calibration::Calibration;
use register::ctrl1::Ctrl1;
use register::ctrl2::Ctrl2;
use register::h_out::Hout;
use register::status::Status;
use register::t_out::Tout;
use register::who_am_i::WhoAmI;

pub use register::who_am_i::HTS221_ID;

pub const ADDR: u8 = 0x5F;

/// Default correction subtracted from every temperature, in °C. Compensates the heat the board
/// dissipates into the sensor.
pub const DEFAULT_TEMPERATURE_OFFSET: f32 = 5.0;

pub struct Hts221 {
    address: I2cAddress,
    config: DriverConfig,
    temperature_offset: f32,
    calibration: Option<Calibration>,
    state: SensorState,
}

impl Default for Hts221 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hts221 {
    pub fn new() -> Self {
        Self::with_config(DriverConfig::default())
    }

    pub fn with_config(config: DriverConfig) -> Self {
        Self {
            address: I2cAddress::new(ADDR),
            config,
            temperature_offset: DEFAULT_TEMPERATURE_OFFSET,
            calibration: None,
            state: SensorState::Uninitialized,
        }
    }

    pub fn with_temperature_offset(mut self, offset: f32) -> Self {
        self.temperature_offset = offset;
        self
    }

    pub fn address(&self) -> I2cAddress {
        self.address
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    pub fn temperature_offset(&self) -> f32 {
        self.temperature_offset
    }

    /// Calibration stored by the last [`read_calibration`](Self::read_calibration).
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Power-cycle the device into one-shot mode.
    pub async fn initialize<I: RegisterBus>(
        &mut self,
        i2c: &mut I,
    ) -> Result<(), SensorError<I::Error>> {
        Ctrl1::write(self.address, i2c, Ctrl1::power_down())
            .await
            .map_err(SensorError::Bus)?;
        Timer::after(self.config.settle()).await;

        Ctrl1::write(self.address, i2c, Ctrl1::one_shot())
            .await
            .map_err(SensorError::Bus)?;
        Timer::after(self.config.settle()).await;

        self.state = SensorState::Idle;
        debug!("HTS221 at 0x{:x} initialized", u8::from(self.address));
        Ok(())
    }

    pub async fn read_calibration<I: RegisterBus>(
        &mut self,
        i2c: &mut I,
    ) -> Result<Calibration, SensorError<I::Error>> {
        let calibration = Calibration::read(self.address, i2c)
            .await
            .map_err(SensorError::Bus)?;
        info!("HTS221 calibration: {:?}", calibration);
        if calibration.is_degenerate() {
            warn!("HTS221 calibration anchors coincide, conversions will not be finite");
        }
        self.calibration.replace(calibration);
        Ok(calibration)
    }

    /// Start a one-shot conversion and wait until both outputs are ready.
    pub async fn trigger_and_wait<I: RegisterBus>(
        &mut self,
        i2c: &mut I,
    ) -> Result<(), SensorError<I::Error>> {
        Ctrl2::one_shot(self.address, i2c)
            .await
            .map_err(SensorError::Bus)?;

        let deadline = Deadline::after(self.config.poll_timeout());
        loop {
            let status = Status::read(self.address, i2c)
                .await
                .map_err(SensorError::Bus)?;
            if status.data_ready() {
                break;
            }
            if deadline.expired() {
                warn!("HTS221 data-ready poll timed out");
                return Err(SensorError::Timeout);
            }
            embassy_futures::yield_now().await;
        }

        self.state = SensorState::DataReady;
        Ok(())
    }

    pub async fn read_temperature<I: RegisterBus>(
        &self,
        i2c: &mut I,
        calibration: &Calibration,
    ) -> Result<Temperature<Celsius>, SensorError<I::Error>> {
        let t_out = Tout::read(self.address, i2c)
            .await
            .map_err(SensorError::Bus)?;
        Ok(calibration.calibrated_temperature(t_out) - self.temperature_offset)
    }

    /// Relative humidity in %RH.
    pub async fn read_humidity<I: RegisterBus>(
        &self,
        i2c: &mut I,
        calibration: &Calibration,
    ) -> Result<f32, SensorError<I::Error>> {
        let h_out = Hout::read(self.address, i2c)
            .await
            .map_err(SensorError::Bus)?;
        Ok(calibration.calibrated_humidity(h_out))
    }

    /// Trigger a conversion and convert both outputs with the stored calibration.
    pub async fn read<I: RegisterBus>(
        &mut self,
        i2c: &mut I,
    ) -> Result<SensorAcquisition<Celsius>, SensorError<I::Error>> {
        let calibration = self.calibration.ok_or(SensorError::NotCalibrated)?;
        self.trigger_and_wait(i2c).await?;
        Ok(SensorAcquisition {
            temperature: self.read_temperature(i2c, &calibration).await?,
            relative_humidity: self.read_humidity(i2c, &calibration).await?,
        })
    }

    pub async fn who_am_i<I: RegisterBus>(&self, i2c: &mut I) -> Result<u8, SensorError<I::Error>> {
        WhoAmI::read(self.address, i2c)
            .await
            .map_err(SensorError::Bus)
    }
}
