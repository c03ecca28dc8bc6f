use crate::traits::i2c::{I2cAddress, RegisterBus};

const STATUS: u8 = 0x27;

pub struct Status {
    pressure_available: bool,
    temperature_available: bool,
}

impl Status {
    pub async fn read<I: RegisterBus>(
        address: I2cAddress,
        i2c: &mut I,
    ) -> Result<Status, I::Error> {
        Ok(i2c.read_register(address, STATUS).await?.into())
    }

    pub fn pressure_available(&self) -> bool {
        self.pressure_available
    }

    pub fn temperature_available(&self) -> bool {
        self.temperature_available
    }
}

impl From<u8> for Status {
    fn from(v: u8) -> Self {
        Status {
            pressure_available: (v & 0b01) != 0,
            temperature_available: (v & 0b10) != 0,
        }
    }
}
