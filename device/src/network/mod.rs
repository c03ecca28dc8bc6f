pub mod transport;

#[cfg(feature = "rust-mqtt")]
pub mod clients;

use embassy_time::Instant;

/// Milliseconds since boot, the clock MQTT clients use for keep-alive bookkeeping.
pub fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}
