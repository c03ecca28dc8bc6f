//! Adapter between a connected stream socket and an MQTT client.

use embedded_io::{Error as _, ErrorKind, ErrorType};
use embedded_io_async::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    Read(ErrorKind),
    Write(ErrorKind),
    Flush(ErrorKind),
}

impl embedded_io::Error for TransportError {
    fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Read(kind)
            | TransportError::Write(kind)
            | TransportError::Flush(kind) => *kind,
        }
    }
}

/// A connected socket as seen by a publish client.
///
/// Every call is a single delegation to the socket: short reads and writes are returned to the
/// caller as they are, nothing is buffered or retried.
pub struct Transport<S> {
    socket: S,
}

impl<S> Transport<S> {
    pub fn new(socket: S) -> Self {
        Self { socket }
    }

    pub fn into_inner(self) -> S {
        self.socket
    }
}

impl<S: Write> Transport<S> {
    /// Hand `bytes` to the socket, returning how many it accepted.
    pub async fn send(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        let written = self
            .socket
            .write(bytes)
            .await
            .map_err(|e| TransportError::Write(e.kind()))?;
        trace!("transport sent {} of {} bytes", written, bytes.len());
        Ok(written)
    }
}

impl<S: Read> Transport<S> {
    /// Read whatever the socket has available into `buf`. `Ok(0)` means the peer closed.
    pub async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.socket
            .read(buf)
            .await
            .map_err(|e| TransportError::Read(e.kind()))
    }
}

impl<S> ErrorType for Transport<S> {
    type Error = TransportError;
}

impl<S: Read> Read for Transport<S> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.receive(buf).await
    }
}

impl<S: Write> Write for Transport<S> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.send(buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.socket
            .flush()
            .await
            .map_err(|e| TransportError::Flush(e.kind()))
    }
}
