//! Register-protocol drivers for the environmental sensors.
//!
//! Both devices share the same life cycle: they start [`SensorState::Uninitialized`], are put
//! into one-shot mode by `initialize`, and each conversion is started by writing a start bit
//! and polling a status register until the data-ready flags are set.

use embassy_time::{Duration, Instant};

pub mod hts221;
pub mod lps22hb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<E> {
    /// A register read or write failed on the bus.
    Bus(E),
    /// The data-ready flags were not set before the poll timeout.
    Timeout,
    /// A conversion was requested before the calibration constants were read.
    NotCalibrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorState {
    Uninitialized,
    /// Configured for one-shot conversions, no conversion pending.
    Idle,
    /// A conversion completed and the output registers hold fresh data.
    DataReady,
}

/// Point in time after which a data-ready poll gives up. `None` never expires.
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub(crate) fn after(timeout: Option<Duration>) -> Self {
        Self(timeout.and_then(|t| Instant::now().checked_add(t)))
    }

    pub(crate) fn expired(&self) -> bool {
        match self.0 {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}
