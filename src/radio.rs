//! Radio state and configuration
//!
//! [`Radio`] owns the register transport, the DIO0 line and the time base,
//! together with everything the link layer remembers about the transceiver:
//! the cached mode, the node identity, the filtering and power settings and
//! the single receive slot.
//!
//! The operations are spread over several modules by concern:
//! - [`mode`](crate::mode): the mode state machine
//! - [`receive`](crate::receive): the interrupt-driven receive pipeline
//! - [`csma`](crate::csma): the clear channel gate
//! - [`reliable`](crate::reliable): transmission, ACKs and retries
//! - [`crypto`](crate::crypto): AES key handling

use embedded_hal::digital::InputPin;

use crate::config::{self, FrequencyBand};
use crate::log::{info, warn};
use crate::receive::ReceivedFrame;
use crate::registers::{
    AddressFiltering, BroadcastAddress, Frf, NodeAddress, Ocp, PacketConfig1, PaLevel, SyncValue1,
    SyncValue2, MAX_OUTPUT_POWER,
};
use crate::wait::Clock;
use crate::{Error, RadioMode, RegisterPort};

/// Write/read-back attempts per probe pattern before the device is
/// considered absent.
pub const PROBE_ATTEMPTS: u32 = 50;

/// Addresses identifying this node on the air
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeIdentity {
    /// Node address, matched against the frame target
    pub address: u8,
    /// Network id, sent as the second sync word byte
    pub network_id: u8,
}

/// An RFM69 transceiver driven as a link-layer endpoint.
///
/// # Type Parameters
/// * `P` - Register transport, usually a [`Device`](crate::Device)
/// * `D` - The DIO0 input line
/// * `C` - Millisecond time base
pub struct Radio<P, D, C> {
    pub(crate) port: P,
    pub(crate) dio0: D,
    pub(crate) clock: C,
    pub(crate) mode: RadioMode,
    pub(crate) identity: NodeIdentity,
    pub(crate) promiscuous: bool,
    pub(crate) high_power: bool,
    pub(crate) power_level: u8,
    pub(crate) slot: Option<ReceivedFrame>,
}

impl<P, D, C> Radio<P, D, C> {
    /// Wraps a transceiver. No bus traffic happens until
    /// [`initialize`](Radio::initialize).
    ///
    /// # Arguments
    /// * `port` - Register transport
    /// * `dio0` - DIO0 line, used to detect the end of a transmission
    /// * `clock` - Time base for transmit and ACK timeouts
    /// * `high_power` - `true` for an RFM69HW (PA1 + PA2 on PA_BOOST)
    pub fn new(port: P, dio0: D, clock: C, high_power: bool) -> Self {
        Self {
            port,
            dio0,
            clock,
            mode: RadioMode::Sleep,
            identity: NodeIdentity::default(),
            promiscuous: false,
            high_power,
            power_level: MAX_OUTPUT_POWER,
            slot: None,
        }
    }

    /// Releases the register transport, the DIO0 line and the clock.
    pub fn release(self) -> (P, D, C) {
        (self.port, self.dio0, self.clock)
    }

    /// Current node identity.
    pub fn identity(&self) -> NodeIdentity {
        self.identity
    }

    /// Whether frames addressed to other nodes are accepted.
    pub fn is_promiscuous(&self) -> bool {
        self.promiscuous
    }

    /// Whether the radio is driven as an RFM69HW.
    pub fn is_high_power(&self) -> bool {
        self.high_power
    }

    /// Configured output power, 0..=31.
    pub fn power_level(&self) -> u8 {
        self.power_level
    }
}

impl<P, D, C> Radio<P, D, C>
where
    P: RegisterPort,
    D: InputPin,
    C: Clock,
{
    /// Brings the transceiver up as node `node_id` on network `network_id`.
    ///
    /// Returns `Ok(false)` without touching the configuration when the device
    /// does not answer on the bus.
    ///
    /// # Important Notes
    /// - The previous receive slot content is discarded
    /// - Promiscuous mode is not reset, but the hardware filter is restored to
    ///   node + broadcast by the start-up table; call
    ///   [`promiscuous`](Radio::promiscuous) again afterwards if needed
    pub fn initialize(
        &mut self,
        band: FrequencyBand,
        node_id: u8,
        network_id: u8,
    ) -> Result<bool, Error> {
        if !self.probe()? {
            warn!("no answer from the radio on the bus");
            return Ok(false);
        }

        for (address, value) in config::BASE_CONFIG {
            self.port.write_register(address, value)?;
        }
        self.port.write(band.carrier())?;
        self.port.write(SyncValue2 { network_id })?;
        self.port.write(NodeAddress { address: node_id })?;
        self.port.write(BroadcastAddress {
            address: config::BROADCAST_ADDRESS,
        })?;

        self.set_high_power(self.high_power)?;
        self.set_mode(RadioMode::Standby)?;
        self.wait_mode_ready()?;

        self.identity = NodeIdentity {
            address: node_id,
            network_id,
        };
        self.slot = None;

        info!("radio up as node {} on network {}", node_id, network_id);
        Ok(true)
    }

    /// Changes the node address.
    pub fn set_address(&mut self, address: u8) -> Result<(), Error> {
        self.port.write(NodeAddress { address })?;
        self.identity.address = address;
        Ok(())
    }

    /// Sets the output power, clamped to 0..=31.
    ///
    /// The PA selection is left untouched. The resulting power depends on it:
    /// -18..+13 dBm on PA0, +2..+17 dBm with PA1 + PA2.
    pub fn set_power_level(&mut self, level: u8) -> Result<(), Error> {
        let level = level.min(MAX_OUTPUT_POWER);
        self.port
            .modify(|pa: &mut PaLevel| pa.output_power = level)?;
        self.power_level = level;
        Ok(())
    }

    /// Selects the RFM69HW power amplifier configuration.
    ///
    /// With `on`, over current protection is disabled and PA1 + PA2 drive
    /// the PA_BOOST pin. Without, OCP is restored and PA0 drives RFIO at the
    /// stored power level.
    pub fn set_high_power(&mut self, on: bool) -> Result<(), Error> {
        self.high_power = on;

        if on {
            self.port.write(Ocp::OFF)?;
            self.port.modify(|pa: &mut PaLevel| {
                pa.pa0_on = false;
                pa.pa1_on = true;
                pa.pa2_on = true;
            })
        } else {
            self.port.write(Ocp::default())?;
            self.port.write(PaLevel {
                pa0_on: true,
                pa1_on: false,
                pa2_on: false,
                output_power: self.power_level,
            })
        }
    }

    /// Accepts frames regardless of their target address.
    ///
    /// Switches the hardware address filter off while promiscuous so that
    /// foreign frames reach the FIFO at all.
    pub fn promiscuous(&mut self, on: bool) -> Result<(), Error> {
        let filtering = if on {
            AddressFiltering::Off
        } else {
            AddressFiltering::NodeOrBroadcast
        };
        self.port
            .modify(|config: &mut PacketConfig1| config.address_filtering = filtering)?;
        self.promiscuous = on;
        Ok(())
    }

    /// Tunes the carrier to `frf`, in units of Fstep (32 MHz / 2^19).
    pub fn set_frequency(&mut self, frf: u32) -> Result<(), Error> {
        self.port.write(Frf {
            value: frf & 0x00FF_FFFF,
        })
    }

    pub(crate) fn now_ms(&mut self) -> u32 {
        self.clock.now_ms()
    }

    /// Checks that the device echoes back both bit patterns.
    fn probe(&mut self) -> Result<bool, Error> {
        for pattern in [0xAA, 0x55] {
            let mut echoed = false;
            for _ in 0..PROBE_ATTEMPTS {
                self.port.write(SyncValue1 { value: pattern })?;
                let read_back: SyncValue1 = self.port.read()?;
                if read_back.value == pattern {
                    echoed = true;
                    break;
                }
                self.clock.relax();
            }
            if !echoed {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
