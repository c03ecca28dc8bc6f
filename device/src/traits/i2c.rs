use embedded_hal_async::i2c::I2c;

/// A 7-bit I2C device address.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cAddress(u8);

impl I2cAddress {
    pub const fn new(val: u8) -> Self {
        Self(val)
    }
}

impl From<I2cAddress> for u8 {
    fn from(address: I2cAddress) -> u8 {
        address.0
    }
}

impl From<u8> for I2cAddress {
    fn from(val: u8) -> I2cAddress {
        I2cAddress::new(val)
    }
}

/// Single-register access on top of an I2C bus.
///
/// A register read writes the register address and reads one byte back in the same
/// transaction; a register write sends the register address followed by the value.
pub trait RegisterBus: I2c {
    async fn read_register(
        &mut self,
        address: I2cAddress,
        register: u8,
    ) -> Result<u8, Self::Error> {
        let mut buf = [0; 1];
        self.write_read(address.into(), &[register], &mut buf).await?;
        Ok(buf[0])
    }

    async fn write_register(
        &mut self,
        address: I2cAddress,
        register: u8,
        value: u8,
    ) -> Result<(), Self::Error> {
        self.write(address.into(), &[register, value]).await
    }
}

impl<I: I2c> RegisterBus for I {}
