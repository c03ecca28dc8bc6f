use crate::traits::i2c::{I2cAddress, RegisterBus};

const HUMIDITY_OUT_L: u8 = 0x28;
const HUMIDITY_OUT_H: u8 = 0x29;

pub struct Hout;

impl Hout {
    pub async fn read<I: RegisterBus>(address: I2cAddress, i2c: &mut I) -> Result<i16, I::Error> {
        let low = i2c.read_register(address, HUMIDITY_OUT_L).await?;
        let high = i2c.read_register(address, HUMIDITY_OUT_H).await?;
        Ok(i16::from_le_bytes([low, high]))
    }
}
