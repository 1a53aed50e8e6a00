//! Register definitions for the RFM69 / SX1231 radio
//! Generated from the SX1231 datasheet register map (rev. 7)

mod common;
mod irq;
mod packet;
mod rf;

pub use common::*;
pub use irq::*;
pub use packet::*;
pub use rf::*;

/// FIFO data register (address: 0x00)
///
/// Each read pops one byte, each write pushes one byte. Burst accesses stay
/// on this address instead of auto-incrementing.
pub const REG_FIFO: u8 = 0x00;
