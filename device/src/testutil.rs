//! Simulated peripherals for running the drivers and the publish loop on the host.

use crate::traits::mqtt::{PacketIds, Publish, PublishClient, PublishError, QoS};
use embassy_time::Instant;
use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

/// Calibration block (0x30..=0x3F) of the simulated HTS221.
///
/// T0 = 20 °C at code 300, T1 = 30 °C at code 700, H0 = 20 %RH at code -1000 and
/// H1 = 80 %RH at code 5000.
pub const HTS221_CALIBRATION: [u8; 16] = [
    40, 160, 160, 240, 0x00, 0x00, 0x18, 0xFC, 0x00, 0x00, 0x88, 0x13, 0x2C, 0x01, 0xBC, 0x02,
];

/// Default HTS221 temperature code, 25 °C before the offset.
pub const HTS221_T_OUT: i16 = 500;
/// Default HTS221 humidity code, 50 %RH.
pub const HTS221_H_OUT: i16 = 2000;
/// Default LPS22HB pressure code, 1013.25 hPa.
pub const LPS22HB_PRESS_OUT: i32 = 0x3F5400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestBusError {
    /// Nothing answered at the address.
    NoDevice,
    /// A fault set up with [`TestBus::fail_on`].
    Injected,
}

impl embedded_hal::i2c::Error for TestBusError {
    fn kind(&self) -> ErrorKind {
        match self {
            TestBusError::NoDevice => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            TestBusError::Injected => ErrorKind::Bus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Idle,
    /// Number of status reads that still report "not ready".
    Pending(usize),
    Done,
}

/// Register file of a one-shot sensor with data-ready sequencing.
///
/// Writing the trigger bit starts a conversion. The status register then reads zero a
/// configurable number of times before reporting the ready flags, which stay set until the
/// next trigger.
pub struct TestDevice {
    address: u8,
    registers: [u8; 256],
    status_register: u8,
    ready_mask: u8,
    trigger_register: u8,
    trigger_bit: u8,
    ready_after: Option<usize>,
    conversion: Conversion,
    status_reads: usize,
}

impl TestDevice {
    pub fn new(
        address: u8,
        status_register: u8,
        ready_mask: u8,
        trigger_register: u8,
        trigger_bit: u8,
    ) -> Self {
        Self {
            address,
            registers: [0; 256],
            status_register,
            ready_mask,
            trigger_register,
            trigger_bit,
            ready_after: Some(0),
            conversion: Conversion::Idle,
            status_reads: 0,
        }
    }

    /// An HTS221 with [`HTS221_CALIBRATION`] and default output codes.
    pub fn hts221() -> Self {
        Self::new(0x5F, 0x27, 0b11, 0x21, 0x01)
            .with_register(0x0F, 0xBC)
            .with_calibration(HTS221_CALIBRATION)
            .with_temperature_out(HTS221_T_OUT)
            .with_humidity_out(HTS221_H_OUT)
    }

    /// An LPS22HB reading [`LPS22HB_PRESS_OUT`].
    pub fn lps22hb() -> Self {
        Self::new(0x5D, 0x27, 0b01, 0x11, 0x01)
            .with_register(0x0F, 0xB1)
            .with_register(0x11, 0x10)
            .with_pressure_out(LPS22HB_PRESS_OUT)
    }

    pub fn with_register(mut self, register: u8, value: u8) -> Self {
        self.registers[usize::from(register)] = value;
        self
    }

    pub fn with_calibration(mut self, block: [u8; 16]) -> Self {
        self.registers[0x30..0x40].copy_from_slice(&block);
        self
    }

    pub fn with_temperature_out(mut self, raw: i16) -> Self {
        self.registers[0x2A..0x2C].copy_from_slice(&raw.to_le_bytes());
        self
    }

    pub fn with_humidity_out(mut self, raw: i16) -> Self {
        self.registers[0x28..0x2A].copy_from_slice(&raw.to_le_bytes());
        self
    }

    pub fn with_pressure_out(mut self, raw: i32) -> Self {
        self.registers[0x28..0x2B].copy_from_slice(&raw.to_le_bytes()[..3]);
        self
    }

    /// Report ready on the `polls + 1`-th status read after a trigger.
    pub fn ready_after(mut self, polls: usize) -> Self {
        self.ready_after = Some(polls);
        self
    }

    /// Never finish a conversion.
    pub fn never_ready(mut self) -> Self {
        self.ready_after = None;
        self
    }

    pub fn register(&self, register: u8) -> u8 {
        self.registers[usize::from(register)]
    }

    /// Status register reads since the device was created.
    pub fn status_reads(&self) -> usize {
        self.status_reads
    }

    fn read(&mut self, register: u8) -> u8 {
        if register != self.status_register {
            return self.registers[usize::from(register)];
        }
        self.status_reads += 1;
        match self.conversion {
            Conversion::Pending(0) | Conversion::Done => {
                self.conversion = Conversion::Done;
                self.ready_mask
            }
            Conversion::Pending(n) => {
                self.conversion = Conversion::Pending(n - 1);
                0
            }
            Conversion::Idle => 0,
        }
    }

    fn write(&mut self, register: u8, value: u8) {
        self.registers[usize::from(register)] = value;
        if register == self.trigger_register && value & self.trigger_bit != 0 {
            self.conversion = match self.ready_after {
                Some(polls) => Conversion::Pending(polls),
                None => Conversion::Idle,
            };
        }
    }
}

/// A register write seen on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub address: u8,
    pub register: u8,
    pub value: u8,
    pub at: Instant,
}

/// An I2C bus with simulated devices attached.
///
/// Each transaction starts with a write of the register pointer; following bytes are written
/// to or read from consecutive registers.
#[derive(Default)]
pub struct TestBus {
    devices: Vec<TestDevice>,
    writes: Vec<RegisterWrite>,
    fault: Option<(u8, u8)>,
}

impl TestBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The board: an HTS221 and an LPS22HB with their default register files.
    pub fn board() -> Self {
        Self::new()
            .with_device(TestDevice::hts221())
            .with_device(TestDevice::lps22hb())
    }

    pub fn with_device(mut self, device: TestDevice) -> Self {
        self.devices.push(device);
        self
    }

    pub fn device(&self, address: u8) -> Option<&TestDevice> {
        self.devices.iter().find(|d| d.address == address)
    }

    pub fn writes(&self) -> &[RegisterWrite] {
        &self.writes
    }

    pub fn writes_to(&self, address: u8, register: u8) -> Vec<RegisterWrite> {
        self.writes
            .iter()
            .filter(|w| w.address == address && w.register == register)
            .copied()
            .collect()
    }

    /// Fail every transaction that addresses `register` on `address`.
    pub fn fail_on(&mut self, address: u8, register: u8) {
        self.fault = Some((address, register));
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }
}

impl ErrorType for TestBus {
    type Error = TestBusError;
}

impl I2c for TestBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let fault = self.fault;
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.address == address)
            .ok_or(TestBusError::NoDevice)?;

        let mut pointer: Option<u8> = None;
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    let Some((register, data)) = bytes.split_first() else {
                        continue;
                    };
                    if fault == Some((address, *register)) {
                        return Err(TestBusError::Injected);
                    }
                    let mut next = *register;
                    for value in data {
                        device.write(next, *value);
                        self.writes.push(RegisterWrite {
                            address,
                            register: next,
                            value: *value,
                            at: Instant::now(),
                        });
                        next = next.wrapping_add(1);
                    }
                    pointer = Some(next);
                }
                Operation::Read(buf) => {
                    let mut next = pointer.unwrap_or(0);
                    for byte in buf.iter_mut() {
                        *byte = device.read(next);
                        next = next.wrapping_add(1);
                    }
                    pointer = Some(next);
                }
            }
        }
        Ok(())
    }
}

/// A publish recorded by [`TestPublisher`].
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub packet_id: u16,
}

/// Publish client recording everything it is asked to send.
#[derive(Default)]
pub struct TestPublisher {
    connected: bool,
    refuse_connect: bool,
    failing_attempts: Vec<usize>,
    attempts: usize,
    packet_ids: PacketIds,
    published: Vec<PublishedMessage>,
}

impl TestPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `attempt`-th publish, counting from zero, with [`PublishError::Network`].
    pub fn fail_attempt(mut self, attempt: usize) -> Self {
        self.failing_attempts.push(attempt);
        self
    }

    pub fn refuse_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Publish calls made while connected, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn published(&self) -> &[PublishedMessage] {
        &self.published
    }
}

impl PublishClient for TestPublisher {
    async fn connect(&mut self) -> Result<(), PublishError> {
        if self.refuse_connect {
            return Err(PublishError::Rejected(0x87));
        }
        self.connected = true;
        Ok(())
    }

    fn next_packet_id(&mut self) -> u16 {
        self.packet_ids.next_id()
    }

    async fn publish(&mut self, message: Publish<'_>) -> Result<(), PublishError> {
        if !self.connected {
            return Err(PublishError::NotConnected);
        }
        let attempt = self.attempts;
        self.attempts += 1;
        if self.failing_attempts.contains(&attempt) {
            return Err(PublishError::Network);
        }
        self.published.push(PublishedMessage {
            topic: message.topic.into(),
            payload: message.payload.to_vec(),
            qos: message.qos,
            packet_id: message.packet_id,
        });
        Ok(())
    }
}

/// In-memory stream socket.
#[derive(Default)]
pub struct TestSocket {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    max_write: Option<usize>,
    write_error: Option<embedded_io::ErrorKind>,
    flushes: usize,
}

impl TestSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the next reads.
    pub fn with_incoming(mut self, bytes: &[u8]) -> Self {
        self.rx.extend(bytes.iter().copied());
        self
    }

    /// Accept at most `max` bytes per write.
    pub fn with_max_write(mut self, max: usize) -> Self {
        self.max_write = Some(max);
        self
    }

    pub fn with_write_error(mut self, kind: embedded_io::ErrorKind) -> Self {
        self.write_error = Some(kind);
        self
    }

    pub fn sent(&self) -> &[u8] {
        &self.tx
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl embedded_io::ErrorType for TestSocket {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io_async::Read for TestSocket {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl embedded_io_async::Write for TestSocket {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if let Some(kind) = self.write_error {
            return Err(kind);
        }
        let n = buf.len().min(self.max_write.unwrap_or(usize::MAX));
        self.tx.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}
