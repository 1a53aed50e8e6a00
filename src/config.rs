//! Start-up register configuration
//!
//! The table below is written once by [`Radio::initialize`](crate::Radio::initialize).
//! It puts the radio in FSK packet mode at 2.7 kbps with 90 kHz deviation,
//! variable length frames with CRC, a two byte sync word whose second byte is
//! the network id, and node/broadcast address filtering. The carrier and the
//! node's identity are written afterwards through their typed registers.

use crate::registers::Frf;

/// Reserved broadcast address, accepted by every node
pub const BROADCAST_ADDRESS: u8 = 0;

/// Largest frame the packet engine accepts in variable length mode
pub const MAX_FRAME_LEN: u8 = 66;

/// ISM band the radio operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrequencyBand {
    Mhz315,
    Mhz433,
    Mhz868,
    Mhz915,
}

impl FrequencyBand {
    /// Carrier word for the band's default channel.
    pub fn carrier(self) -> Frf {
        let value = match self {
            FrequencyBand::Mhz315 => 0x4E_C000,
            FrequencyBand::Mhz433 => 0x6C_4000,
            FrequencyBand::Mhz868 => 0xD9_0000,
            FrequencyBand::Mhz915 => 0xE4_C000,
        };
        Frf { value }
    }
}

/// Address/value pairs that depend on neither the band nor the node.
pub const BASE_CONFIG: [(u8, u8); 16] = [
    // OpMode: sequencer on, listen off, standby
    (0x01, 0x04),
    // DataModul: packet mode, FSK, no shaping
    (0x02, 0x00),
    // Bitrate 2.7 kbps
    (0x03, 0x2E),
    (0x04, 0x66),
    // Fdev 90 kHz, FDEV + BitRate / 2 <= 500 kHz
    (0x05, 0x05),
    (0x06, 0xC3),
    // RxBw: DCC 4%, mant 16, exp 2 (BitRate < 2 * RxBw)
    (0x19, 0x42),
    // DIO0 = PayloadReady in Rx
    (0x25, 0x40),
    // RssiThreshold -110 dBm
    (0x29, 220),
    // SyncConfig: on, fill FIFO when sync matches, 2 bytes, no tolerance
    (0x2E, 0x88),
    // SyncValue1
    (0x2F, 0x2D),
    // PacketConfig1: variable length, CRC on, node + broadcast filtering
    (0x37, 0x94),
    (0x38, MAX_FRAME_LEN),
    // FifoThresh: start Tx on FIFO not empty
    (0x3C, 0x8F),
    // PacketConfig2: 2 bit Rx restart delay, auto Rx restart, AES off
    (0x3D, 0x12),
    // TestDagc: continuous DAGC in Rx
    (0x6F, 0x30),
];
