use embedded_hal_async::i2c::{I2c, SevenBitAddress};

use crate::{BusError, RegisterBus};

/// [`RegisterBus`] implementation for a register block behind an I2C device.
///
/// Multi-function chips often place several register blocks in one I2C
/// address space; `base` is added to every register offset so drivers can
/// keep using the block-relative register map.
pub struct I2cRegisterBus<I2cType, ErrorType: embedded_hal_async::i2c::Error>
where
    I2cType: I2c<SevenBitAddress, Error = ErrorType>,
{
    i2c: I2cType,
    address: SevenBitAddress,
    base: u8,
}

impl<I2cType, ErrorType: embedded_hal_async::i2c::Error> I2cRegisterBus<I2cType, ErrorType>
where
    I2cType: I2c<SevenBitAddress, Error = ErrorType>,
{
    /// Create a new [`I2cRegisterBus`] for the device at `address`.
    pub fn new(i2c: I2cType, address: SevenBitAddress) -> Self {
        Self {
            i2c,
            address,
            base: 0,
        }
    }

    /// Offsets every register access by `base`.
    pub fn with_base(mut self, base: u8) -> Self {
        self.base = base;
        self
    }

    /// The I2C address of the device.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Releases the underlying I2C bus.
    pub fn release(self) -> I2cType {
        self.i2c
    }
}

impl<I2cType, ErrorType: embedded_hal_async::i2c::Error> RegisterBus
    for I2cRegisterBus<I2cType, ErrorType>
where
    I2cType: I2c<SevenBitAddress, Error = ErrorType>,
{
    type Error = ErrorType;

    async fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError<Self::Error>> {
        let addr = self.base.wrapping_add(register);
        self.i2c
            .write_read(self.address, &[addr], buf)
            .await
            .map_err(|source| {
                log::warn!(
                    "Couldn't read {:#04x}: register {register:#04x}, {} bytes: {source:?}",
                    self.address,
                    buf.len()
                );
                BusError::Read { register, source }
            })
    }

    async fn write(&mut self, register: u8, value: u8) -> Result<(), BusError<Self::Error>> {
        let addr = self.base.wrapping_add(register);
        self.i2c
            .write(self.address, &[addr, value])
            .await
            .map_err(|source| {
                log::warn!(
                    "Couldn't write {:#04x}: register {register:#04x} = {value:#04x}: {source:?}",
                    self.address
                );
                BusError::Write { register, source }
            })
    }
}
