//! Driver for the ST LPS22HB barometric pressure sensor.

pub mod register;

use super::{Deadline, SensorError, SensorState};
use crate::config::DriverConfig;
use crate::traits::i2c::{I2cAddress, RegisterBus};
use embassy_time::Timer;
use register::ctrl1::Ctrl1;
use register::ctrl2::Ctrl2;
use register::press_out::{to_hpa, PressOut};
use register::status::Status;
use register::who_am_i::WhoAmI;

pub use register::who_am_i::LPS22HB_ID;

/// 7-bit form of the board's 8-bit address 0xBA.
pub const ADDR: u8 = 0x5D;

pub struct Lps22hb {
    address: I2cAddress,
    config: DriverConfig,
    state: SensorState,
}

impl Default for Lps22hb {
    fn default() -> Self {
        Self::new()
    }
}

impl Lps22hb {
    pub fn new() -> Self {
        Self::with_config(DriverConfig::default())
    }

    pub fn with_config(config: DriverConfig) -> Self {
        Self {
            address: I2cAddress::new(ADDR),
            config,
            state: SensorState::Uninitialized,
        }
    }

    pub fn address(&self) -> I2cAddress {
        self.address
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

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
        debug!("LPS22HB at 0x{:x} initialized", u8::from(self.address));
        Ok(())
    }

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
            if status.pressure_available() {
                break;
            }
            if deadline.expired() {
                warn!("LPS22HB data-ready poll timed out");
                return Err(SensorError::Timeout);
            }
            embassy_futures::yield_now().await;
        }

        self.state = SensorState::DataReady;
        Ok(())
    }

    /// Run a one-shot conversion and return the pressure in hPa.
    pub async fn read_pressure<I: RegisterBus>(
        &mut self,
        i2c: &mut I,
    ) -> Result<f32, SensorError<I::Error>> {
        self.trigger_and_wait(i2c).await?;
        let raw = PressOut::read(self.address, i2c)
            .await
            .map_err(SensorError::Bus)?;
        Ok(to_hpa(raw))
    }

    pub async fn who_am_i<I: RegisterBus>(&self, i2c: &mut I) -> Result<u8, SensorError<I::Error>> {
        WhoAmI::read(self.address, i2c)
            .await
            .map_err(SensorError::Bus)
    }
}
