//! Clear channel assessment
//!
//! Before transmitting, the sender listens: the channel counts as clear when
//! the receiver is idle (nothing pending in the slot) and the measured signal
//! is below [`CSMA_LIMIT_DBM`].

use embedded_hal::digital::InputPin;

use crate::registers::{RssiConfig, RssiValue};
use crate::wait::{self, Clock, RSSI_DONE_POLLS};
use crate::{Error, Radio, RadioMode, RegisterPort};

/// Signal level at or above which the channel is considered busy
pub const CSMA_LIMIT_DBM: i16 = -90;

impl<P, D, C> Radio<P, D, C>
where
    P: RegisterPort,
    D: InputPin,
    C: Clock,
{
    /// Decides whether a transmission may start now.
    ///
    /// - Receiving with an empty slot and a quiet channel: switches to
    ///   Standby and returns `true`
    /// - Standby: always `true`
    /// - Anything else: `false`
    ///
    /// Senders spin on this, calling [`receive_done`](Radio::receive_done)
    /// in between so that pending receptions complete.
    pub fn can_send(&mut self) -> Result<bool, Error> {
        match self.mode {
            RadioMode::Standby => Ok(true),
            RadioMode::Receive if self.slot.is_none() => {
                if self.read_rssi(false)? < CSMA_LIMIT_DBM {
                    self.set_mode(RadioMode::Standby)?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            _ => Ok(false),
        }
    }

    /// Reads the signal strength in dBm.
    ///
    /// With `force_trigger` a new measurement is started and awaited. Without
    /// it the last value is returned, which the continuous DAGC keeps current
    /// while receiving.
    ///
    /// # Errors
    /// * [`Error::Timeout`] - a forced measurement did not finish within
    ///   [`RSSI_DONE_POLLS`] polls
    pub fn read_rssi(&mut self, force_trigger: bool) -> Result<i16, Error> {
        if force_trigger {
            self.port.write(RssiConfig {
                done: false,
                start: true,
            })?;

            let port = &mut self.port;
            wait::poll_until(&mut self.clock, RSSI_DONE_POLLS, "rssi", || {
                let config: RssiConfig = port.read()?;
                Ok(config.done)
            })?;
        }

        let rssi: RssiValue = self.port.read()?;
        Ok(rssi.dbm())
    }
}
