//! RFM69 SPI Device Interface
//!
//! This module provides the SPI transport for the RFM69 / SX1231 register file.
//!
//! Every access is a single chip-select transaction starting with an address
//! byte. Bit 7 of the address byte selects the direction:
//! - `1` - write, the following bytes are stored starting at the address
//! - `0` - read, the device shifts out register content starting at the address
//!
//! The address auto-increments within a burst except for the FIFO (0x00),
//! which pushes or pops one byte per access. The device expects SPI mode 0,
//! MSB first, at up to 10 MHz.
//!
//! # Example
//! ```ignore
//! use rfm69::{Device, RegisterPort};
//! use rfm69::registers::NodeAddress;
//!
//! // Create device with SPI interface
//! let spi = // ... SPI implementation
//! let mut device = Device::new(spi);
//!
//! // Read a register
//! let address: NodeAddress = device.read()?;
//! ```

use embedded_hal::spi::{Operation, SpiDevice};

use crate::{Error, RegisterPort};

/// Write access flag in the address byte
const WRITE_ACCESS: u8 = 0x80;

/// Register address mask for read access
const READ_MASK: u8 = 0x7F;

/// SPI transport for the RFM69 radio.
///
/// This struct wraps an SPI device and implements [`RegisterPort`] on top of
/// it. Chip select handling is left to the [`SpiDevice`] implementation.
pub struct Device<SPI> {
    spi: SPI,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI interface.
    ///
    /// # Arguments
    /// * `spi` - An SPI device implementing the embedded-hal 1.0 traits
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    ///
    /// This method consumes the Device instance and returns the wrapped SPI interface.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> RegisterPort for Device<SPI>
where
    SPI: SpiDevice,
{
    /// Reads a single register.
    ///
    /// # Errors
    /// * [`Error::Bus`] - SPI communication failed
    fn read_register(&mut self, address: u8) -> Result<u8, Error> {
        let mut value = [0u8];
        self.read_burst(address, &mut value)?;
        Ok(value[0])
    }

    /// Writes a single register.
    ///
    /// # Errors
    /// * [`Error::Bus`] - SPI communication failed
    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error> {
        self.spi
            .transaction(&mut [Operation::Write(&[address | WRITE_ACCESS, value])])
            .map_err(|_| Error::Bus)
    }

    /// Reads `bytes.len()` bytes starting at `address`.
    ///
    /// # Errors
    /// * [`Error::Bus`] - SPI communication failed
    fn read_burst(&mut self, address: u8, bytes: &mut [u8]) -> Result<(), Error> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[address & READ_MASK]),
                Operation::Read(bytes),
            ])
            .map_err(|_| Error::Bus)
    }

    /// Writes `bytes` starting at `address`.
    ///
    /// # Errors
    /// * [`Error::Bus`] - SPI communication failed
    fn write_burst(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        self.spi
            .transaction(&mut [
                Operation::Write(&[address | WRITE_ACCESS]),
                Operation::Write(bytes),
            ])
            .map_err(|_| Error::Bus)
    }
}
