//! Interrupt-driven receive pipeline
//!
//! In Receive mode DIO0 is mapped to PayloadReady. When a frame lands in the
//! FIFO the board's DIO0 interrupt calls [`Radio::handle_interrupt`] (or
//! [`SharedRadio::on_interrupt`](crate::SharedRadio::on_interrupt)), which
//! drains the FIFO, applies the address filter and publishes the frame in a
//! single slot. The foreground polls [`Radio::receive_done`], which both
//! reports a published frame and keeps the receiver armed.
//!
//! The slot holds at most one frame. A newer accepted frame overwrites an
//! unread one.

use embedded_hal::digital::InputPin;

use crate::config::BROADCAST_ADDRESS;
use crate::frame::{self, Decoded, Frame};
use crate::log::debug;
use crate::registers::{
    DioMapping1, Irq2Flags, IrqFlags2, PacketConfig2, DIO0_PAYLOAD_READY, REG_FIFO,
};
use crate::wait::Clock;
use crate::{Error, Radio, RadioMode, RegisterPort};

/// A frame published by the receive pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedFrame {
    pub frame: Frame,
    /// Signal strength in dBm, sampled when the frame was taken from the FIFO
    pub rssi: i16,
}

impl ReceivedFrame {
    pub fn sender(&self) -> u8 {
        self.frame.sender
    }

    pub fn target(&self) -> u8 {
        self.frame.target
    }

    pub fn payload(&self) -> &[u8] {
        &self.frame.payload
    }

    pub fn payload_len(&self) -> usize {
        self.frame.payload.len()
    }
}

/// Whether a frame sent to `target` is for us.
pub fn accepts(identity_address: u8, promiscuous: bool, target: u8) -> bool {
    promiscuous || target == identity_address || target == BROADCAST_ADDRESS
}

impl<P, D, C> Radio<P, D, C>
where
    P: RegisterPort,
    D: InputPin,
    C: Clock,
{
    /// Services a DIO0 interrupt.
    ///
    /// Does nothing unless the radio is receiving and PayloadReady is set, so
    /// spurious calls and the PacketSent edge of a transmission are harmless.
    ///
    /// An accepted frame replaces the slot content. A malformed frame or a
    /// frame for another node is dropped and leaves the slot as it was. In
    /// every case the receiver is armed again on return.
    pub fn handle_interrupt(&mut self) -> Result<(), Error> {
        if self.mode != RadioMode::Receive || !self.payload_ready()? {
            return Ok(());
        }

        let rssi = self.read_rssi(false)?;
        self.set_mode(RadioMode::Standby)?;

        let address = self.identity.address;
        let promiscuous = self.promiscuous;
        let port = &mut self.port;
        let decoded = frame::decode_with(
            |bytes: &mut [u8]| port.read_burst(REG_FIFO, bytes),
            |target| accepts(address, promiscuous, target),
        )?;

        match decoded {
            Decoded::Frame(frame) => {
                debug!(
                    "frame from {} to {}, {} bytes at {} dBm",
                    frame.sender,
                    frame.target,
                    frame.payload.len(),
                    rssi
                );
                self.slot = Some(ReceivedFrame { frame, rssi });
                self.set_mode(RadioMode::Receive)
            }
            Decoded::Malformed => {
                debug!("dropped malformed frame");
                self.rearm()
            }
            Decoded::Filtered(target) => {
                debug!("dropped frame for {}", target);
                self.rearm()
            }
        }
    }

    /// Arms the receiver, discarding the slot content.
    ///
    /// A PayloadReady left over from an earlier cycle would keep the packet
    /// engine from accepting a new frame, so it is cleared with an RX restart
    /// first.
    pub fn receive_begin(&mut self) -> Result<(), Error> {
        self.slot = None;
        if self.payload_ready()? {
            self.restart_rx()?;
        }
        self.port
            .modify(|mapping: &mut DioMapping1| mapping.dio0 = DIO0_PAYLOAD_READY)?;
        self.set_mode(RadioMode::Receive)
    }

    /// Arms the receiver unless it is already receiving.
    pub fn receive_start(&mut self) -> Result<(), Error> {
        if self.mode != RadioMode::Receive {
            self.receive_begin()?;
        }
        Ok(())
    }

    /// Polls for a received frame.
    ///
    /// Returns `true` once the interrupt path has published a frame; the
    /// radio is then parked in Standby and the frame stays readable through
    /// [`received`](Radio::received) until the receiver is armed again.
    /// Otherwise the receiver is (re)armed and `false` is returned, so this
    /// must be polled for reception to happen at all.
    pub fn receive_done(&mut self) -> Result<bool, Error> {
        if self.mode == RadioMode::Receive && self.slot.is_some() {
            self.set_mode(RadioMode::Standby)?;
            return Ok(true);
        }

        self.receive_begin()?;
        Ok(false)
    }

    /// Polls for an ACK from `from`, or from anyone when `from` is the
    /// broadcast address.
    ///
    /// Only sees frames that [`handle_interrupt`](Radio::handle_interrupt)
    /// has already published; nothing is read from the FIFO here. Wire DIO0
    /// to the handler, usually through a [`SharedRadio`](crate::SharedRadio),
    /// or this never reports an ACK.
    pub fn ack_received(&mut self, from: u8) -> Result<bool, Error> {
        if !self.receive_done()? {
            return Ok(false);
        }

        Ok(self.slot.as_ref().is_some_and(|received| {
            received.frame.is_ack() && (received.frame.sender == from || from == BROADCAST_ADDRESS)
        }))
    }

    /// Whether the frame in the slot expects an ACK from us.
    ///
    /// Broadcast frames are never acknowledged.
    pub fn ack_requested(&self) -> bool {
        self.slot.as_ref().is_some_and(|received| {
            received.frame.ack_requested() && received.frame.target != BROADCAST_ADDRESS
        })
    }

    /// Last frame published by the receive pipeline.
    pub fn received(&self) -> Option<&ReceivedFrame> {
        self.slot.as_ref()
    }

    pub(crate) fn payload_ready(&mut self) -> Result<bool, Error> {
        let irq: IrqFlags2 = self.port.read()?;
        Ok(irq.flags.contains(Irq2Flags::PAYLOAD_READY))
    }

    /// Forces the receiver to drop the current frame and wait for a new one.
    pub(crate) fn restart_rx(&mut self) -> Result<(), Error> {
        self.port
            .modify(|config: &mut PacketConfig2| config.restart_rx = true)
    }

    /// Re-enters Receive after a dropped frame without touching the slot.
    fn rearm(&mut self) -> Result<(), Error> {
        if self.payload_ready()? {
            self.restart_rx()?;
        }
        self.set_mode(RadioMode::Receive)
    }
}
