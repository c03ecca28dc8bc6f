use crate::traits::i2c::{I2cAddress, RegisterBus};

const STATUS: u8 = 0x27;

pub struct Status {
    temperature_available: bool,
    humidity_available: bool,
}

impl Status {
    pub async fn read<I: RegisterBus>(
        address: I2cAddress,
        i2c: &mut I,
    ) -> Result<Status, I::Error> {
        Ok(i2c.read_register(address, STATUS).await?.into())
    }

    pub fn temperature_available(&self) -> bool {
        self.temperature_available
    }

    pub fn humidity_available(&self) -> bool {
        self.humidity_available
    }

    /// Both outputs hold a completed conversion.
    pub fn data_ready(&self) -> bool {
        self.temperature_available && self.humidity_available
    }
}

impl From<u8> for Status {
    fn from(v: u8) -> Self {
        Status {
            temperature_available: (v & 0b01) != 0,
            humidity_available: (v & 0b10) != 0,
        }
    }
}
