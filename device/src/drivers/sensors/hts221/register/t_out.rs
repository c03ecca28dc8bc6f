use crate::traits::i2c::{I2cAddress, RegisterBus};

const TEMP_OUT_L: u8 = 0x2A;
const TEMP_OUT_H: u8 = 0x2B;

pub struct Tout;

impl Tout {
    pub async fn read<I: RegisterBus>(address: I2cAddress, i2c: &mut I) -> Result<i16, I::Error> {
        let low = i2c.read_register(address, TEMP_OUT_L).await?;
        let high = i2c.read_register(address, TEMP_OUT_H).await?;
        Ok(i16::from_le_bytes([low, high]))
    }
}
