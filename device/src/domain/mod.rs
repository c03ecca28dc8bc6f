pub mod telemetry;
pub mod temperature;

use core::fmt::{Debug, Formatter};
use temperature::*;

/// Output of one HTS221 conversion.
#[derive(Copy, Clone, PartialEq)]
pub struct SensorAcquisition<S: TemperatureScale> {
    pub temperature: Temperature<S>,
    pub relative_humidity: f32,
}

impl<S: TemperatureScale> Debug for SensorAcquisition<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SensorAcquisition")
            .field("temperature", &self.temperature)
            .field("relative_humidity", &self.relative_humidity)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<S: TemperatureScale> defmt::Format for SensorAcquisition<S> {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(
            f,
            "SensorAcquisition(temperature: {}, relative_humidity: {})",
            &self.temperature,
            &self.relative_humidity
        );
    }
}

/// One calibrated reading of every sensor on the board.
#[derive(Copy, Clone, PartialEq)]
pub struct PhysicalSample {
    pub temperature: Temperature<Celsius>,
    /// Relative humidity in %RH.
    pub humidity: f32,
    /// Barometric pressure in hPa.
    pub pressure: f32,
}

impl Debug for PhysicalSample {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PhysicalSample")
            .field("temperature", &self.temperature)
            .field("humidity", &self.humidity)
            .field("pressure", &self.pressure)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PhysicalSample {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(
            f,
            "PhysicalSample(temperature: {}, humidity: {}, pressure: {})",
            &self.temperature,
            &self.humidity,
            &self.pressure
        );
    }
}
