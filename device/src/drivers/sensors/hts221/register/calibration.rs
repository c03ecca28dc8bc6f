use crate::domain::temperature::{Celsius, Temperature};
use crate::traits::i2c::{I2cAddress, RegisterBus};

// Factory calibration block, 0x30..=0x3F.
const CALIBRATION_START: u8 = 0x30;
const CALIBRATION_LEN: usize = 16;

/// Factory calibration constants of an HTS221.
///
/// Each quantity is converted by linear interpolation between two anchors, a raw output code
/// and the physical value it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub temperature: TemperatureCalibration,
    pub humidity: HumidityCalibration,
}

impl Calibration {
    pub async fn read<I: RegisterBus>(
        address: I2cAddress,
        i2c: &mut I,
    ) -> Result<Calibration, I::Error> {
        let mut buf = [0; CALIBRATION_LEN];
        for (offset, byte) in (0u8..).zip(buf.iter_mut()) {
            *byte = i2c
                .read_register(address, CALIBRATION_START + offset)
                .await?;
        }
        Ok(buf.into())
    }

    pub fn calibrated_temperature(&self, t_out: i16) -> Temperature<Celsius> {
        self.temperature.calibrated(t_out)
    }

    pub fn calibrated_humidity(&self, h_out: i16) -> f32 {
        self.humidity.calibrated(h_out)
    }

    /// Either pair of raw anchors coincides, so conversions divide by zero.
    pub fn is_degenerate(&self) -> bool {
        self.temperature.t0_out == self.temperature.t1_out
            || self.humidity.h0_out == self.humidity.h1_out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureCalibration {
    pub t0_out: i16,
    pub t1_out: i16,
    pub t0_degc: Temperature<Celsius>,
    pub t1_degc: Temperature<Celsius>,
}

impl TemperatureCalibration {
    pub fn calibrated(&self, t_out: i16) -> Temperature<Celsius> {
        let t0 = self.t0_degc.raw_value();
        let t1 = self.t1_degc.raw_value();
        Temperature::new(t0 + interpolate(t_out, self.t0_out, self.t1_out) * (t1 - t0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HumidityCalibration {
    pub h0_out: i16,
    pub h1_out: i16,
    pub h0_rh: f32,
    pub h1_rh: f32,
}

impl HumidityCalibration {
    pub fn calibrated(&self, h_out: i16) -> f32 {
        self.h0_rh + interpolate(h_out, self.h0_out, self.h1_out) * (self.h1_rh - self.h0_rh)
    }
}

// Position of `raw` between the anchors, 0.0 at `out0` and 1.0 at `out1`.
fn interpolate(raw: i16, out0: i16, out1: i16) -> f32 {
    let delta = i32::from(raw) - i32::from(out0);
    let span = i32::from(out1) - i32::from(out0);
    delta as f32 / span as f32
}

impl From<[u8; CALIBRATION_LEN]> for Calibration {
    fn from(buf: [u8; CALIBRATION_LEN]) -> Self {
        let t0_out = i16::from_le_bytes([buf[12], buf[13]]);
        let t1_out = i16::from_le_bytes([buf[14], buf[15]]);

        // T1_degC/T0_degC MSB: bits 1..0 extend T0, bits 3..2 extend T1.
        let t_msb = u16::from(buf[5]);
        let t0_x8 = ((t_msb & 0b0011) << 8) | u16::from(buf[2]);
        let t1_x8 = ((t_msb & 0b1100) << 6) | u16::from(buf[3]);

        let temperature = TemperatureCalibration {
            t0_out,
            t1_out,
            t0_degc: Temperature::new(f32::from(t0_x8) / 8.0),
            t1_degc: Temperature::new(f32::from(t1_x8) / 8.0),
        };

        let humidity = HumidityCalibration {
            h0_out: i16::from_le_bytes([buf[6], buf[7]]),
            h1_out: i16::from_le_bytes([buf[10], buf[11]]),
            h0_rh: f32::from(buf[0]) / 2.0,
            h1_rh: f32::from(buf[1]) / 2.0,
        };

        Calibration {
            temperature,
            humidity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // T0 = 20 °C at 300, T1 = 30 °C at 700, H0 = 20 %RH at -1000, H1 = 80 %RH at 5000.
    const BLOCK: [u8; 16] = [
        40, 160, 160, 240, 0x00, 0b0000, 0x18, 0xFC, 0x00, 0x00, 0x88, 0x13, 0x2C, 0x01, 0xBC,
        0x02,
    ];

    #[test]
    fn test_decode_block() {
        let calibration = Calibration::from(BLOCK);
        assert_eq!(20.0, calibration.temperature.t0_degc.raw_value());
        assert_eq!(30.0, calibration.temperature.t1_degc.raw_value());
        assert_eq!(300, calibration.temperature.t0_out);
        assert_eq!(700, calibration.temperature.t1_out);
        assert_eq!(20.0, calibration.humidity.h0_rh);
        assert_eq!(80.0, calibration.humidity.h1_rh);
        assert_eq!(-1000, calibration.humidity.h0_out);
        assert_eq!(5000, calibration.humidity.h1_out);
        assert!(!calibration.is_degenerate());
    }

    #[test]
    fn test_msb_extends_degrees() {
        let mut block = BLOCK;
        block[2] = 0x00;
        block[5] = 0b01;
        assert_eq!(
            32.0,
            Calibration::from(block).temperature.t0_degc.raw_value()
        );

        block[3] = 0x00;
        block[5] = 0b0100;
        let calibration = Calibration::from(block);
        assert_eq!(0.0, calibration.temperature.t0_degc.raw_value());
        assert_eq!(32.0, calibration.temperature.t1_degc.raw_value());
    }

    #[test]
    fn test_interpolation_hits_anchors() {
        let calibration = Calibration::from(BLOCK);
        assert_eq!(20.0, calibration.calibrated_temperature(300).raw_value());
        assert_eq!(30.0, calibration.calibrated_temperature(700).raw_value());
        assert_eq!(25.0, calibration.calibrated_temperature(500).raw_value());
        assert_eq!(20.0, calibration.calibrated_humidity(-1000));
        assert_eq!(80.0, calibration.calibrated_humidity(5000));
        assert_eq!(50.0, calibration.calibrated_humidity(2000));
    }

    #[test]
    fn test_extreme_codes_do_not_overflow() {
        let calibration = Calibration::from(BLOCK);
        assert!(calibration.calibrated_temperature(i16::MIN).raw_value().is_finite());
        assert!(calibration.calibrated_humidity(i16::MAX).is_finite());
    }

    #[test]
    fn test_degenerate_is_not_finite() {
        let mut block = BLOCK;
        block[14] = block[12];
        block[15] = block[13];
        let calibration = Calibration::from(block);
        assert!(calibration.is_degenerate());
        assert!(!calibration.calibrated_temperature(400).raw_value().is_finite());
    }
}
