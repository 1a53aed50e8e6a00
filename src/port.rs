//! Register transport abstraction
//!
//! The link layer never talks to a bus directly. Every register access goes
//! through a [`RegisterPort`], which the crate implements for SPI in
//! [`Device`](crate::Device) and which test harnesses implement with an
//! in-memory register model.
//!
//! Each method is one atomic bus transaction. The burst methods exist for the
//! two places where the radio needs ordered multi-byte transfers on a single
//! chip select: the FIFO (address 0x00, which pops/pushes a byte per access)
//! and the auto-incrementing AES key block.

use core::convert::Infallible;

use regiface::{ByteArray, ReadableRegister, WritableRegister};

use crate::Error;

/// Synchronous access to the radio's 8-bit register file.
pub trait RegisterPort {
    /// Reads a single register.
    fn read_register(&mut self, address: u8) -> Result<u8, Error>;

    /// Writes a single register.
    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error>;

    /// Reads `bytes.len()` bytes starting at `address` in one transaction.
    fn read_burst(&mut self, address: u8, bytes: &mut [u8]) -> Result<(), Error>;

    /// Writes `bytes` starting at `address` in one transaction.
    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error>;

    /// Reads a typed register.
    ///
    /// # Errors
    /// * [`Error::Bus`] - transport failed
    /// * [`Error::Deserialization`] - failed to parse register value
    fn read<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        self.read_burst(R::id(), raw_value.as_mut())?;
        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Writes a typed register.
    fn write<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw_value) => raw_value,
            Err(never) => match never {},
        };
        self.write_burst(R::id(), raw_value.as_ref())
    }

    /// Read-modify-write of a typed register.
    fn modify<R, F>(&mut self, f: F) -> Result<(), Error>
    where
        R: ReadableRegister<IdType = u8> + WritableRegister<IdType = u8, Error = Infallible>,
        F: FnOnce(&mut R),
    {
        let mut register: R = self.read()?;
        f(&mut register);
        self.write(register)
    }
}

impl<T: RegisterPort + ?Sized> RegisterPort for &mut T {
    fn read_register(&mut self, address: u8) -> Result<u8, Error> {
        (**self).read_register(address)
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error> {
        (**self).write_register(address, value)
    }

    fn read_burst(&mut self, address: u8, bytes: &mut [u8]) -> Result<(), Error> {
        (**self).read_burst(address, bytes)
    }

    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        (**self).write_burst(address, bytes)
    }
}
