use crate::traits::i2c::{I2cAddress, RegisterBus};

const PRESS_OUT_XL: u8 = 0x28;
const PRESS_OUT_L: u8 = 0x29;
const PRESS_OUT_H: u8 = 0x2A;

/// Raw codes per hPa.
pub const LSB_PER_HPA: f32 = 4096.0;

pub struct PressOut;

impl PressOut {
    pub async fn read<I: RegisterBus>(address: I2cAddress, i2c: &mut I) -> Result<i32, I::Error> {
        let xl = i2c.read_register(address, PRESS_OUT_XL).await?;
        let l = i2c.read_register(address, PRESS_OUT_L).await?;
        let h = i2c.read_register(address, PRESS_OUT_H).await?;
        Ok(combine(xl, l, h))
    }
}

/// Assemble the 24-bit two's complement output into an `i32`.
pub fn combine(xl: u8, l: u8, h: u8) -> i32 {
    // Place the 24 bits at the top and shift back to extend the sign.
    i32::from_le_bytes([0, xl, l, h]) >> 8
}

pub fn to_hpa(raw: i32) -> f32 {
    raw as f32 / LSB_PER_HPA
}
