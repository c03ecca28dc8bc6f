use crate::traits::i2c::{I2cAddress, RegisterBus};

const CTRL_REG2: u8 = 0x21;

const ONE_SHOT: u8 = 0b0000_0001;

pub struct Ctrl2;

impl Ctrl2 {
    /// Start a single temperature and humidity conversion.
    pub async fn one_shot<I: RegisterBus>(
        address: I2cAddress,
        i2c: &mut I,
    ) -> Result<(), I::Error> {
        i2c.write_register(address, CTRL_REG2, ONE_SHOT).await
    }
}
