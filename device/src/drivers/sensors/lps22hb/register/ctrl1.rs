use crate::traits::i2c::{I2cAddress, RegisterBus};

const CTRL_REG1: u8 = 0x10;

const BDU: u8 = 0b0000_0010;

/// CTRL_REG1 with the output data rate left at zero, which selects power-down / one-shot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ctrl1 {
    block_data_update: bool,
}

impl Ctrl1 {
    pub fn power_down() -> Self {
        Self {
            block_data_update: false,
        }
    }

    /// One-shot with block data update: 0x02.
    pub fn one_shot() -> Self {
        Self {
            block_data_update: true,
        }
    }

    pub async fn write<I: RegisterBus>(
        address: I2cAddress,
        i2c: &mut I,
        reg: Ctrl1,
    ) -> Result<(), I::Error> {
        i2c.write_register(address, CTRL_REG1, reg.into()).await
    }
}

impl From<Ctrl1> for u8 {
    fn from(reg: Ctrl1) -> u8 {
        if reg.block_data_update {
            BDU
        } else {
            0
        }
    }
}
