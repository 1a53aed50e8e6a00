//! Transceiver mode state machine
//!
//! The radio caches the mode it last requested so that redundant transitions
//! cost no bus traffic. Every transition is a read-modify-write of RegOpMode
//! touching only the mode field.

use embedded_hal::digital::InputPin;

use crate::log::trace;
use crate::registers::{Irq1Flags, IrqFlags1, OpMode, TestPa1, TestPa2};
use crate::wait::{self, Clock, MODE_READY_POLLS};
use crate::{Error, Radio, RegisterPort};

/// Operating mode of the transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioMode {
    /// Lowest power, register content retained
    Sleep,
    /// Oscillator running, FIFO accessible
    Standby,
    /// PLL locked on the carrier
    FrequencySynthesis,
    /// Receiver on
    Receive,
    /// Transmitter on
    Transmit,
}

impl RadioMode {
    /// Encoding in the RegOpMode mode field.
    pub const fn bits(self) -> u8 {
        match self {
            RadioMode::Sleep => 0b000,
            RadioMode::Standby => 0b001,
            RadioMode::FrequencySynthesis => 0b010,
            RadioMode::Transmit => 0b011,
            RadioMode::Receive => 0b100,
        }
    }

    /// Decodes a RegOpMode mode field, `None` for reserved encodings.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(RadioMode::Sleep),
            0b001 => Some(RadioMode::Standby),
            0b010 => Some(RadioMode::FrequencySynthesis),
            0b011 => Some(RadioMode::Transmit),
            0b100 => Some(RadioMode::Receive),
            _ => None,
        }
    }
}

impl<P, D, C> Radio<P, D, C>
where
    P: RegisterPort,
    D: InputPin,
    C: Clock,
{
    /// Switches the transceiver to `target`.
    ///
    /// Does nothing if the radio is already in `target`. On an RFM69HW the
    /// high power PA registers are boosted for Transmit and restored for
    /// Receive. Leaving Sleep blocks until the device reports ModeReady.
    ///
    /// # Errors
    /// * [`Error::Timeout`] - ModeReady not reported within
    ///   [`MODE_READY_POLLS`] polls after leaving Sleep; the cached mode is
    ///   left unchanged
    pub fn set_mode(&mut self, target: RadioMode) -> Result<(), Error> {
        if target == self.mode {
            return Ok(());
        }

        self.port
            .modify(|op_mode: &mut OpMode| op_mode.mode = target.bits())?;

        match target {
            RadioMode::Transmit if self.high_power => self.set_high_power_regs(true)?,
            RadioMode::Receive if self.high_power => self.set_high_power_regs(false)?,
            _ => {}
        }

        // the FIFO is not usable until the oscillator is back up
        if self.mode == RadioMode::Sleep {
            self.wait_mode_ready()?;
        }

        trace!("mode {:?} -> {:?}", self.mode, target);
        self.mode = target;
        Ok(())
    }

    /// Switches to the mode encoded as a raw RegOpMode mode field.
    ///
    /// Reserved encodings are ignored: nothing is written and no wait happens.
    pub fn set_mode_raw(&mut self, bits: u8) -> Result<(), Error> {
        match RadioMode::from_bits(bits) {
            Some(target) => self.set_mode(target),
            None => Ok(()),
        }
    }

    /// Puts the transceiver to sleep.
    pub fn sleep(&mut self) -> Result<(), Error> {
        self.set_mode(RadioMode::Sleep)
    }

    /// Currently cached mode.
    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Blocks until RegIrqFlags1.ModeReady is set.
    pub(crate) fn wait_mode_ready(&mut self) -> Result<(), Error> {
        let port = &mut self.port;
        wait::poll_until(&mut self.clock, MODE_READY_POLLS, "mode ready", || {
            let irq: IrqFlags1 = port.read()?;
            Ok(irq.flags.contains(Irq1Flags::MODE_READY))
        })
    }

    fn set_high_power_regs(&mut self, boost: bool) -> Result<(), Error> {
        if boost {
            self.port.write(TestPa1::BOOST)?;
            self.port.write(TestPa2::BOOST)
        } else {
            self.port.write(TestPa1::NORMAL)?;
            self.port.write(TestPa2::NORMAL)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_bits_round_trip() {
        for mode in [
            RadioMode::Sleep,
            RadioMode::Standby,
            RadioMode::FrequencySynthesis,
            RadioMode::Receive,
            RadioMode::Transmit,
        ] {
            assert_eq!(RadioMode::from_bits(mode.bits()), Some(mode));
        }
    }

    #[test]
    fn reserved_encodings_are_rejected() {
        for bits in 0b101..=0b111 {
            assert_eq!(RadioMode::from_bits(bits), None);
        }
    }
}
