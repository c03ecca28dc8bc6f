use crate::traits::i2c::{I2cAddress, RegisterBus};

const CTRL_REG1: u8 = 0x20;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Power {
    PowerDown,
    Active,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockDataUpdate {
    Continuous,
    MsbLsbReading,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputDataRate {
    OneShot,
    Hz1,
    Hz7,
    Hz12p5,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ctrl1 {
    power: Power,
    block_data_update: BlockDataUpdate,
    output_data_rate: OutputDataRate,
}

impl Ctrl1 {
    /// Everything cleared: 0x00.
    pub fn power_down() -> Self {
        Self {
            power: Power::PowerDown,
            block_data_update: BlockDataUpdate::Continuous,
            output_data_rate: OutputDataRate::OneShot,
        }
    }

    /// Active, block data update, one-shot rate: 0x84.
    pub fn one_shot() -> Self {
        Self {
            power: Power::Active,
            block_data_update: BlockDataUpdate::MsbLsbReading,
            output_data_rate: OutputDataRate::OneShot,
        }
    }

    pub async fn write<I: RegisterBus>(
        address: I2cAddress,
        i2c: &mut I,
        reg: Ctrl1,
    ) -> Result<(), I::Error> {
        i2c.write_register(address, CTRL_REG1, reg.into()).await
    }

    pub fn power(&self) -> Power {
        self.power
    }
}

impl From<u8> for Power {
    fn from(v: u8) -> Self {
        if (v & 0x80) != 0 {
            Power::Active
        } else {
            Power::PowerDown
        }
    }
}

impl From<Power> for u8 {
    fn from(p: Power) -> Self {
        match p {
            Power::PowerDown => 0b00000000,
            Power::Active => 0b10000000,
        }
    }
}

impl From<u8> for BlockDataUpdate {
    fn from(v: u8) -> Self {
        if (v & 0b100) != 0 {
            BlockDataUpdate::MsbLsbReading
        } else {
            BlockDataUpdate::Continuous
        }
    }
}

impl From<BlockDataUpdate> for u8 {
    fn from(bdu: BlockDataUpdate) -> u8 {
        match bdu {
            BlockDataUpdate::Continuous => 0b000,
            BlockDataUpdate::MsbLsbReading => 0b100,
        }
    }
}

impl From<u8> for OutputDataRate {
    fn from(v: u8) -> Self {
        match v & 0b11 {
            0b01 => OutputDataRate::Hz1,
            0b10 => OutputDataRate::Hz7,
            0b11 => OutputDataRate::Hz12p5,
            _ => OutputDataRate::OneShot,
        }
    }
}

impl From<OutputDataRate> for u8 {
    fn from(odr: OutputDataRate) -> Self {
        match odr {
            OutputDataRate::OneShot => 0b00,
            OutputDataRate::Hz1 => 0b01,
            OutputDataRate::Hz7 => 0b10,
            OutputDataRate::Hz12p5 => 0b11,
        }
    }
}

impl From<u8> for Ctrl1 {
    fn from(v: u8) -> Self {
        Ctrl1 {
            power: v.into(),
            output_data_rate: v.into(),
            block_data_update: v.into(),
        }
    }
}

impl From<Ctrl1> for u8 {
    fn from(reg: Ctrl1) -> u8 {
        u8::from(reg.power) | u8::from(reg.output_data_rate) | u8::from(reg.block_data_update)
    }
}
