//! JSON representation of a [`PhysicalSample`] as published to the broker.

use super::PhysicalSample;
use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Default capacity of a [`TelemetryPayload`], in bytes.
pub const PAYLOAD_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// The rendered JSON does not fit the target buffer.
    BufferFull,
    /// The payload is not JSON or lacks one of the fields.
    Malformed,
    /// A reading is NaN or infinite and has no JSON number form.
    NonFinite,
}

/// Wire form of a sample: temperature in °C, humidity in %RH, pressure in hPa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryData {
    pub temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
}

impl TelemetryData {
    /// Decode a received payload. All three fields are required.
    pub fn parse(payload: &[u8]) -> Result<Self, FormatError> {
        let (data, _) =
            serde_json_core::from_slice::<Self>(payload).map_err(|_| FormatError::Malformed)?;
        Ok(data)
    }
}

impl From<&PhysicalSample> for TelemetryData {
    fn from(sample: &PhysicalSample) -> Self {
        Self {
            temperature: sample.temperature.raw_value(),
            humidity: sample.humidity,
            pressure: sample.pressure,
        }
    }
}

/// Render `sample` into `buf`, returning the number of bytes written.
///
/// Fails with [`FormatError::NonFinite`] rather than rendering a reading as `null`.
pub fn format_into(sample: &PhysicalSample, buf: &mut [u8]) -> Result<usize, FormatError> {
    let data = TelemetryData::from(sample);
    if ![data.temperature, data.humidity, data.pressure]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(FormatError::NonFinite);
    }
    serde_json_core::to_slice(&data, buf).map_err(|e| match e {
        serde_json_core::ser::Error::BufferFull => FormatError::BufferFull,
        _ => FormatError::Malformed,
    })
}

/// A rendered sample held in a fixed-capacity buffer.
#[derive(Clone)]
pub struct TelemetryPayload<const N: usize = PAYLOAD_CAPACITY> {
    buf: Vec<u8, N>,
}

impl<const N: usize> TelemetryPayload<N> {
    pub fn format(sample: &PhysicalSample) -> Result<Self, FormatError> {
        let mut buf = Vec::new();
        buf.resize_default(N).map_err(|_| FormatError::BufferFull)?;
        let len = format_into(sample, &mut buf)?;
        buf.truncate(len);
        Ok(Self { buf })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl<const N: usize> AsRef<[u8]> for TelemetryPayload<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const N: usize> core::fmt::Debug for TelemetryPayload<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match core::str::from_utf8(&self.buf) {
            Ok(s) => f.write_str(s),
            Err(_) => write!(f, "{:?}", self.buf.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::temperature::Temperature;

    fn sample() -> PhysicalSample {
        PhysicalSample {
            temperature: Temperature::new(21.5),
            humidity: 45.0,
            pressure: 1013.25,
        }
    }

    #[test]
    fn test_payload_round_trip() {
        let payload = TelemetryPayload::<256>::format(&sample()).unwrap();
        let text = core::str::from_utf8(payload.as_bytes()).unwrap();
        assert!(text.starts_with("{\"temperature\":21.5,"));
        assert!(text.contains("\"pressure\":1013.25"));

        let data = TelemetryData::parse(payload.as_bytes()).unwrap();
        assert_eq!(21.5, data.temperature);
        assert_eq!(45.0, data.humidity);
        assert_eq!(1013.25, data.pressure);
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(
            FormatError::BufferFull,
            TelemetryPayload::<16>::format(&sample()).unwrap_err()
        );
        let mut buf = [0; 8];
        assert_eq!(Err(FormatError::BufferFull), format_into(&sample(), &mut buf));
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let mut buf = [0; 256];
        let nan = PhysicalSample {
            temperature: Temperature::new(f32::NAN),
            ..sample()
        };
        assert_eq!(Err(FormatError::NonFinite), format_into(&nan, &mut buf));
        assert_eq!(
            FormatError::NonFinite,
            TelemetryPayload::<256>::format(&nan).unwrap_err()
        );

        let infinite = PhysicalSample {
            humidity: f32::INFINITY,
            ..sample()
        };
        assert_eq!(Err(FormatError::NonFinite), format_into(&infinite, &mut buf));
        let infinite = PhysicalSample {
            pressure: f32::NEG_INFINITY,
            ..sample()
        };
        assert_eq!(Err(FormatError::NonFinite), format_into(&infinite, &mut buf));
    }

    #[test]
    fn test_parse_requires_all_fields() {
        assert_eq!(
            Err(FormatError::Malformed),
            TelemetryData::parse(br#"{"temperature":21.5,"humidity":45.0}"#)
        );
        assert_eq!(
            Err(FormatError::Malformed),
            TelemetryData::parse(b"temperature=21.5")
        );
    }
}
