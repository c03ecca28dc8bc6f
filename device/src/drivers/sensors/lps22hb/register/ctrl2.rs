use crate::traits::i2c::{I2cAddress, RegisterBus};

const CTRL_REG2: u8 = 0x11;

// Register address auto-increment, set after reset.
const IF_ADD_INC: u8 = 0b0001_0000;
const ONE_SHOT: u8 = 0b0000_0001;

pub struct Ctrl2;

impl Ctrl2 {
    /// Start a single pressure conversion, keeping address auto-increment enabled.
    pub async fn one_shot<I: RegisterBus>(
        address: I2cAddress,
        i2c: &mut I,
    ) -> Result<(), I::Error> {
        i2c.write_register(address, CTRL_REG2, IF_ADD_INC | ONE_SHOT)
            .await
    }
}
