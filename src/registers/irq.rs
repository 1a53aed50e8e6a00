//! DIO mapping and IRQ status registers
//!
//! The link layer uses a single interrupt line, DIO0. Its meaning depends on
//! the current mode and the mapping in RegDioMapping1:
//!
//! | Mapping | Receive        | Transmit    |
//! |---------|----------------|-------------|
//! | `00`    | CrcOk          | PacketSent  |
//! | `01`    | PayloadReady   | TxReady     |
//!
//! The status registers are read-only from the driver's point of view.

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// DIO0 mapping used while transmitting: "packet sent"
pub const DIO0_PACKET_SENT: u8 = 0b00;
/// DIO0 mapping used while receiving: "payload ready"
pub const DIO0_PAYLOAD_READY: u8 = 0b01;

/// DIO mapping register 1 (address: 0x25)
///
/// Maps internal events to the DIO0..DIO3 pins, two bits per pin.
#[register(0x25u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct DioMapping1 {
    /// DIO0 mapping (bits 7..6)
    pub dio0: u8,
    /// DIO1 mapping (bits 5..4)
    pub dio1: u8,
    /// DIO2 mapping (bits 3..2)
    pub dio2: u8,
    /// DIO3 mapping (bits 1..0)
    pub dio3: u8,
}

bitflags! {
    /// Status flags of RegIrqFlags1
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Irq1Flags: u8 {
        /// Set when the operation mode requested in RegOpMode is ready
        const MODE_READY = 1 << 7;
        /// Set in Rx mode after RSSI, AGC and AFC
        const RX_READY = 1 << 6;
        /// Set in Tx mode after PA ramp-up
        const TX_READY = 1 << 5;
        /// Set when the PLL is locked
        const PLL_LOCK = 1 << 4;
        /// Set in Rx when RssiValue exceeds RssiThreshold
        const RSSI = 1 << 3;
        /// Set when a timeout occurs
        const TIMEOUT = 1 << 2;
        /// Set when entering intermediate mode
        const AUTO_MODE = 1 << 1;
        /// Set when sync word and node address match
        const SYNC_ADDRESS_MATCH = 1;
    }
}

bitflags! {
    /// Status flags of RegIrqFlags2
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Irq2Flags: u8 {
        /// FIFO is full
        const FIFO_FULL = 1 << 7;
        /// FIFO holds at least one byte
        const FIFO_NOT_EMPTY = 1 << 6;
        /// FIFO level exceeds FifoThreshold
        const FIFO_LEVEL = 1 << 5;
        /// FIFO overrun occurred
        const FIFO_OVERRUN = 1 << 4;
        /// Complete packet has been sent
        const PACKET_SENT = 1 << 3;
        /// Payload is ready to be read from the FIFO
        const PAYLOAD_READY = 1 << 2;
        /// CRC of the received payload is valid
        const CRC_OK = 1 << 1;
    }
}

/// IRQ flags register 1 (address: 0x27)
///
/// # Important Notes
/// - ModeReady must be polled after leaving Sleep, the FIFO is not available
///   before it is set
#[register(0x27u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct IrqFlags1 {
    /// Current flag state
    pub flags: Irq1Flags,
}

/// IRQ flags register 2 (address: 0x28)
///
/// # Important Notes
/// - PayloadReady stays set until the FIFO has been drained or the receiver
///   is restarted; a stale flag stops DIO0 from producing a new edge
#[register(0x28u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct IrqFlags2 {
    /// Current flag state
    pub flags: Irq2Flags,
}

impl FromByteArray for DioMapping1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            dio0: (bytes[0] >> 6) & 0x03,
            dio1: (bytes[0] >> 4) & 0x03,
            dio2: (bytes[0] >> 2) & 0x03,
            dio3: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for DioMapping1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.dio0 & 0x03) << 6
            | (self.dio1 & 0x03) << 4
            | (self.dio2 & 0x03) << 2
            | (self.dio3 & 0x03)])
    }
}

impl FromByteArray for IrqFlags1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Irq1Flags::from_bits_truncate(bytes[0]),
        })
    }
}

impl FromByteArray for IrqFlags2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Irq2Flags::from_bits_truncate(bytes[0]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dio_mapping_round_trips_each_pin() {
        let mapping = DioMapping1::from_bytes([0b0110_1101]).unwrap();
        assert_eq!(mapping.dio0, DIO0_PAYLOAD_READY);
        assert_eq!(mapping.dio1, 0b10);
        assert_eq!(mapping.dio2, 0b11);
        assert_eq!(mapping.dio3, 0b01);
        assert_eq!(mapping.to_bytes().unwrap(), [0b0110_1101]);
    }

    #[test]
    fn irq_flags_decode() {
        let irq = IrqFlags2::from_bytes([0x44]).unwrap();
        assert!(irq.flags.contains(Irq2Flags::PAYLOAD_READY));
        assert!(irq.flags.contains(Irq2Flags::FIFO_NOT_EMPTY));
        assert!(!irq.flags.contains(Irq2Flags::PACKET_SENT));

        let irq = IrqFlags1::from_bytes([0x80]).unwrap();
        assert_eq!(irq.flags, Irq1Flags::MODE_READY);
    }
}
