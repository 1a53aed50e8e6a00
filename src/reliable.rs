//! Transmission and acknowledged delivery
//!
//! The composite send operations are written once against [`Exclusive`],
//! which hands out the radio for one step at a time. A [`Radio`] owned by the
//! caller grants it directly; a [`SharedRadio`](crate::SharedRadio) grants
//! it inside a critical section per step, so the receive interrupt is
//! serviced between steps but never during one.

use embedded_hal::digital::InputPin;

use crate::config::BROADCAST_ADDRESS;
use crate::frame::{self, Control};
use crate::log::{debug, warn};
use crate::registers::{DioMapping1, DIO0_PACKET_SENT, REG_FIFO};
use crate::wait::{elapsed_ms, Clock, TX_TIMEOUT_MS};
use crate::{Error, Radio, RadioMode, RegisterPort};

/// Step-wise exclusive access to a [`Radio`].
pub trait Exclusive {
    type Port: RegisterPort;
    type Dio: InputPin;
    type Clock: Clock;

    /// Runs one step with exclusive access to the radio.
    fn lock<R>(
        &mut self,
        step: impl FnOnce(&mut Radio<Self::Port, Self::Dio, Self::Clock>) -> Result<R, Error>,
    ) -> Result<R, Error>;

    /// Called between steps of a busy-wait, without the radio held.
    fn relax(&mut self);
}

impl<P, D, C> Exclusive for Radio<P, D, C>
where
    P: RegisterPort,
    D: InputPin,
    C: Clock,
{
    type Port = P;
    type Dio = D;
    type Clock = C;

    fn lock<R>(
        &mut self,
        step: impl FnOnce(&mut Radio<P, D, C>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        step(self)
    }

    fn relax(&mut self) {
        self.clock.relax();
    }
}

impl<P, D, C> Radio<P, D, C>
where
    P: RegisterPort,
    D: InputPin,
    C: Clock,
{
    /// Sends `payload` to `target`, waiting for a clear channel first.
    ///
    /// Returns once the frame has left the radio. Payloads longer than
    /// [`MAX_PAYLOAD_LEN`](crate::frame::MAX_PAYLOAD_LEN) are truncated.
    ///
    /// # Errors
    /// * [`Error::Timeout`] - DIO0 did not signal PacketSent within
    ///   [`TX_TIMEOUT_MS`]
    pub fn send(&mut self, target: u8, payload: &[u8], request_ack: bool) -> Result<(), Error> {
        send(self, target, payload, request_ack)
    }

    /// Sends `payload` to `target` and waits for its ACK, retrying up to
    /// `retries` times.
    ///
    /// Each attempt waits `timeout_ms` for the ACK. Returns `Ok(false)` once
    /// every attempt has timed out.
    ///
    /// # Important Notes
    /// - The ACK is only picked up if [`handle_interrupt`](Radio::handle_interrupt)
    ///   runs while this call waits. An owned `Radio` blocks its own interrupt
    ///   handler, so without other wiring every attempt times out. Install the
    ///   radio in a [`SharedRadio`](crate::SharedRadio) and call
    ///   [`SharedRadio::send_with_retry`](crate::SharedRadio::send_with_retry) instead.
    pub fn send_with_retry(
        &mut self,
        target: u8,
        payload: &[u8],
        retries: u8,
        timeout_ms: u32,
    ) -> Result<bool, Error> {
        send_with_retry(self, target, payload, retries, timeout_ms)
    }

    /// Acknowledges the frame in the receive slot, optionally with a payload.
    ///
    /// Goes to the broadcast address when the slot is empty.
    pub fn send_ack(&mut self, payload: &[u8]) -> Result<(), Error> {
        send_ack(self, payload)
    }

    /// Loads a frame into the FIFO and starts transmitting it.
    pub(crate) fn begin_transmit(
        &mut self,
        target: u8,
        payload: &[u8],
        control: Control,
    ) -> Result<(), Error> {
        self.set_mode(RadioMode::Standby)?;
        self.wait_mode_ready()?;
        self.port
            .modify(|mapping: &mut DioMapping1| mapping.dio0 = DIO0_PACKET_SENT)?;

        let encoded = frame::encode(target, self.identity.address, control, payload);
        self.port.write_burst(REG_FIFO, encoded.as_bytes())?;

        debug!(
            "sending {} bytes to {} ({:?})",
            encoded.as_bytes().len(),
            target,
            control
        );
        self.set_mode(RadioMode::Transmit)
    }

    /// Whether DIO0 reports PacketSent.
    pub(crate) fn transmit_complete(&mut self) -> Result<bool, Error> {
        self.dio0.is_high().map_err(|_| Error::Pin)
    }
}

/// Sends one frame, optionally requesting an ACK.
pub(crate) fn send<A: Exclusive>(
    radio: &mut A,
    target: u8,
    payload: &[u8],
    request_ack: bool,
) -> Result<(), Error> {
    // a frame stuck in the FIFO would keep the channel check from passing
    radio.lock(|radio| radio.restart_rx())?;

    let control = if request_ack {
        Control::ACK_REQUEST
    } else {
        Control::empty()
    };
    transmit_when_clear(radio, target, payload, control)
}

/// Sends with an ACK request until an ACK from `target` arrives or the
/// attempts run out.
pub(crate) fn send_with_retry<A: Exclusive>(
    radio: &mut A,
    target: u8,
    payload: &[u8],
    retries: u8,
    timeout_ms: u32,
) -> Result<bool, Error> {
    for attempt in 0..=retries {
        send(radio, target, payload, true)?;
        let sent_at = radio.lock(|radio| Ok(radio.now_ms()))?;

        loop {
            let (acked, now) =
                radio.lock(|radio| Ok((radio.ack_received(target)?, radio.now_ms())))?;
            if acked {
                debug!("ack from {} on attempt {}", target, attempt as u16 + 1);
                return Ok(true);
            }
            if elapsed_ms(now, sent_at) >= timeout_ms {
                break;
            }
            radio.relax();
        }

        debug!("no ack from {} on attempt {}", target, attempt as u16 + 1);
    }

    warn!("giving up on {} after {} attempts", target, retries as u16 + 1);
    Ok(false)
}

/// Acknowledges the frame in the receive slot.
pub(crate) fn send_ack<A: Exclusive>(radio: &mut A, payload: &[u8]) -> Result<(), Error> {
    // the slot may be overwritten while waiting for the channel
    let target = radio.lock(|radio| {
        Ok(radio
            .received()
            .map_or(BROADCAST_ADDRESS, |received| received.sender()))
    })?;

    transmit_when_clear(radio, target, payload, Control::ACK_REPLY)
}

fn transmit_when_clear<A: Exclusive>(
    radio: &mut A,
    target: u8,
    payload: &[u8],
    control: Control,
) -> Result<(), Error> {
    while !radio.lock(|radio| {
        if radio.can_send()? {
            Ok(true)
        } else {
            radio.receive_done().map(|_| false)
        }
    })? {
        radio.relax();
    }

    transmit(radio, target, payload, control)
}

fn transmit<A: Exclusive>(
    radio: &mut A,
    target: u8,
    payload: &[u8],
    control: Control,
) -> Result<(), Error> {
    let started = radio.lock(|radio| {
        radio.begin_transmit(target, payload, control)?;
        Ok(radio.now_ms())
    })?;

    loop {
        let (sent, now) =
            radio.lock(|radio| Ok((radio.transmit_complete()?, radio.now_ms())))?;
        if sent {
            break;
        }
        if elapsed_ms(now, started) >= TX_TIMEOUT_MS {
            warn!("no PacketSent from the radio after {} ms", TX_TIMEOUT_MS);
            radio.lock(|radio| radio.set_mode(RadioMode::Standby))?;
            return Err(Error::Timeout);
        }
        radio.relax();
    }

    radio.lock(|radio| radio.set_mode(RadioMode::Standby))
}
