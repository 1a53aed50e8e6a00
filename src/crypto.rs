//! AES-128 payload encryption
//!
//! The packet engine encrypts the frame after the length byte (and after the
//! address byte when hardware address filtering is on) with the key held in
//! AesKey1..16. Both ends need the same key; a receiver with the wrong key or
//! with encryption off sees a CRC failure and drops the frame.

use embedded_hal::digital::InputPin;

use crate::log::debug;
use crate::registers::{AesKey, PacketConfig2, AES_KEY_LEN};
use crate::wait::Clock;
use crate::{Error, Radio, RadioMode, RegisterPort};

impl<P, D, C> Radio<P, D, C>
where
    P: RegisterPort,
    D: InputPin,
    C: Clock,
{
    /// Enables encryption with `key`, or disables it with `None`.
    ///
    /// The radio is left in Standby. The key registers keep their previous
    /// content when encryption is disabled.
    pub fn set_encryption_key(&mut self, key: Option<&[u8; AES_KEY_LEN]>) -> Result<(), Error> {
        self.set_mode(RadioMode::Standby)?;

        if let Some(key) = key {
            self.port.write(AesKey { key: *key })?;
        }

        let enabled = key.is_some();
        self.port
            .modify(|config: &mut PacketConfig2| config.aes_on = enabled)?;
        debug!("encryption {}", if enabled { "on" } else { "off" });
        Ok(())
    }
}
