//! Radio shared between the foreground and the DIO0 interrupt
//!
//! ```ignore
//! static RADIO: SharedRadio<Device<Spi>, Dio0, Millis> = SharedRadio::new();
//!
//! fn main() {
//!     let mut radio = Radio::new(Device::new(spi), dio0, millis, true);
//!     radio.initialize(FrequencyBand::Mhz868, 5, 100)?;
//!     RADIO.install(radio);
//!     // enable the DIO0 rising edge interrupt
//!
//!     loop {
//!         if RADIO.receive_done()? {
//!             // ...
//!         }
//!     }
//! }
//!
//! #[interrupt]
//! fn GPIOTE() {
//!     RADIO.on_interrupt();
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::InputPin;

use crate::log::error;
use crate::receive::ReceivedFrame;
use crate::reliable::{self, Exclusive};
use crate::wait::Clock;
use crate::{Error, Radio, RadioMode, RegisterPort};

/// A [`Radio`] behind a critical section, suitable for a `static`.
///
/// Every operation runs in critical sections of one step each: a register
/// access sequence, one channel check, one DIO0 poll. The interrupt handler
/// therefore never observes the radio in the middle of a step, and is never
/// held off for longer than one step.
pub struct SharedRadio<P, D, C> {
    radio: Mutex<RefCell<Option<Radio<P, D, C>>>>,
    idle: fn(),
}

impl<P, D, C> SharedRadio<P, D, C> {
    /// Creates an empty cell. Operations fail with [`Error::Uninitialized`]
    /// until a radio is [installed](SharedRadio::install).
    pub const fn new() -> Self {
        Self::with_idle(core::hint::spin_loop)
    }

    /// Like [`new`](SharedRadio::new), calling `idle` between the steps of
    /// a busy-wait, outside of any critical section. Typically a wait for
    /// interrupt instruction.
    pub const fn with_idle(idle: fn()) -> Self {
        Self {
            radio: Mutex::new(RefCell::new(None)),
            idle,
        }
    }

    /// Places `radio` in the cell, returning the previous one.
    pub fn install(&self, radio: Radio<P, D, C>) -> Option<Radio<P, D, C>> {
        critical_section::with(|cs| self.radio.borrow_ref_mut(cs).replace(radio))
    }

    /// Takes the radio back out of the cell.
    pub fn take(&self) -> Option<Radio<P, D, C>> {
        critical_section::with(|cs| self.radio.borrow_ref_mut(cs).take())
    }
}

impl<P, D, C> Default for SharedRadio<P, D, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, D, C> SharedRadio<P, D, C>
where
    P: RegisterPort,
    D: InputPin,
    C: Clock,
{
    /// Runs `f` on the radio inside one critical section.
    ///
    /// # Errors
    /// * [`Error::Uninitialized`] - no radio installed
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut Radio<P, D, C>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        critical_section::with(|cs| {
            let mut radio = self.radio.borrow_ref_mut(cs);
            radio.as_mut().ok_or(Error::Uninitialized).and_then(f)
        })
    }

    /// DIO0 interrupt entry point.
    ///
    /// Errors cannot be returned from an interrupt; they are logged and the
    /// next poll of [`receive_done`](SharedRadio::receive_done) re-arms the
    /// receiver.
    pub fn on_interrupt(&self) {
        match self.with(|radio| radio.handle_interrupt()) {
            Ok(()) | Err(Error::Uninitialized) => {}
            Err(e) => error!("receive interrupt failed: {:?}", e),
        }
    }

    /// See [`Radio::send`].
    pub fn send(&self, target: u8, payload: &[u8], request_ack: bool) -> Result<(), Error> {
        let mut radio = self;
        reliable::send(&mut radio, target, payload, request_ack)
    }

    /// Sends and waits for the ACK, leaving the radio to the receive
    /// interrupt between steps. See [`Radio::send_with_retry`].
    pub fn send_with_retry(
        &self,
        target: u8,
        payload: &[u8],
        retries: u8,
        timeout_ms: u32,
    ) -> Result<bool, Error> {
        let mut radio = self;
        reliable::send_with_retry(&mut radio, target, payload, retries, timeout_ms)
    }

    /// See [`Radio::send_ack`].
    pub fn send_ack(&self, payload: &[u8]) -> Result<(), Error> {
        let mut radio = self;
        reliable::send_ack(&mut radio, payload)
    }

    /// See [`Radio::receive_done`].
    pub fn receive_done(&self) -> Result<bool, Error> {
        self.with(|radio| radio.receive_done())
    }

    /// See [`Radio::ack_received`].
    pub fn ack_received(&self, from: u8) -> Result<bool, Error> {
        self.with(|radio| radio.ack_received(from))
    }

    /// See [`Radio::ack_requested`].
    pub fn ack_requested(&self) -> Result<bool, Error> {
        self.with(|radio| Ok(radio.ack_requested()))
    }

    /// Copy of the frame in the receive slot.
    pub fn received(&self) -> Result<Option<ReceivedFrame>, Error> {
        self.with(|radio| Ok(radio.received().cloned()))
    }

    /// See [`Radio::mode`].
    pub fn mode(&self) -> Result<RadioMode, Error> {
        self.with(|radio| Ok(radio.mode()))
    }
}

impl<P, D, C> Exclusive for &SharedRadio<P, D, C>
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
        self.with(step)
    }

    fn relax(&mut self) {
        (self.idle)()
    }
}
