//! Common configuration registers
//!
//! This module contains the operating mode register, the only register the
//! mode state machine touches on every transition.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Operating mode register (address: 0x01)
///
/// Selects the transceiver mode and controls the automatic sequencer and
/// listen mode.
///
/// # Important Notes
/// - Mode field occupies bits 4..2
/// - Unknown mode encodings are kept raw so they can be written back unchanged
/// - ModeReady in RegIrqFlags1 signals completion of a mode change
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct OpMode {
    /// Disable the automatic sequencer
    /// - false = sequencer drives intermediate modes (default)
    /// - true = modes are forced by the mode field only
    pub sequencer_off: bool,
    /// Enable listen mode
    pub listen_on: bool,
    /// Abort listen mode, must be written together with `listen_on = false`
    pub listen_abort: bool,
    /// Raw mode field (bits 4..2)
    /// - 0b000 = Sleep
    /// - 0b001 = Standby
    /// - 0b010 = Frequency synthesizer
    /// - 0b011 = Transmitter
    /// - 0b100 = Receiver
    pub mode: u8,
    reserved: u8,
}

impl FromByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            sequencer_off: bytes[0] & 0x80 != 0,
            listen_on: bytes[0] & 0x40 != 0,
            listen_abort: bytes[0] & 0x20 != 0,
            mode: (bytes[0] >> 2) & 0x07,
            reserved: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.sequencer_off as u8) << 7
            | (self.listen_on as u8) << 6
            | (self.listen_abort as u8) << 5
            | (self.mode & 0x07) << 2
            | (self.reserved & 0x03)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_mode_keeps_unrelated_bits() {
        let mut op_mode = OpMode::from_bytes([0b1100_0011]).unwrap();
        assert!(op_mode.sequencer_off);
        assert!(op_mode.listen_on);
        assert_eq!(op_mode.mode, 0);

        op_mode.mode = 0b100;
        assert_eq!(op_mode.to_bytes().unwrap(), [0b1101_0011]);
    }
}
