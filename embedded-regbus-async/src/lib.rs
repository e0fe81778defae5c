#![no_std]
#![doc = "Asynchronous register-level access to devices behind an embedded-hal bus."]

//! Many peripheral blocks expose a small file of 8-bit registers behind a
//! command/response bus: a write selects the register and carries the value,
//! a read selects the register and clocks back one or more bytes.
//!
//! [`RegisterBus`] captures exactly that contract, so device drivers can be
//! written once against it and tested against an in-memory register file.
//! [`i2c::I2cRegisterBus`] implements it on top of any
//! `embedded-hal-async` I2C bus.

pub mod err;
pub mod i2c;

pub use err::BusError;
pub use i2c::I2cRegisterBus;

/// Byte-oriented register access.
///
/// Every call is a single bus attempt: implementations must not retry.
#[allow(async_fn_in_trait)]
pub trait RegisterBus {
    /// The transport error carried inside [`BusError`].
    type Error: core::fmt::Debug;

    /// Reads `buf.len()` consecutive registers starting at `register`.
    async fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError<Self::Error>>;

    /// Writes a single register.
    async fn write(&mut self, register: u8, value: u8) -> Result<(), BusError<Self::Error>>;

    /// Reads a single register.
    async fn read_u8(&mut self, register: u8) -> Result<u8, BusError<Self::Error>> {
        let mut buf = [0u8; 1];
        self.read(register, &mut buf).await?;
        Ok(buf[0])
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    type Error = T::Error;

    async fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError<Self::Error>> {
        T::read(self, register, buf).await
    }

    async fn write(&mut self, register: u8, value: u8) -> Result<(), BusError<Self::Error>> {
        T::write(self, register, value).await
    }
}
