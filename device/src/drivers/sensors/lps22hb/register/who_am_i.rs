use crate::traits::i2c::{I2cAddress, RegisterBus};

const WHO_AM_I: u8 = 0x0F;

/// Identification byte of an LPS22HB.
pub const LPS22HB_ID: u8 = 0xB1;

pub struct WhoAmI;

impl WhoAmI {
    pub async fn read<I: RegisterBus>(address: I2cAddress, i2c: &mut I) -> Result<u8, I::Error> {
        i2c.read_register(address, WHO_AM_I).await
    }
}
