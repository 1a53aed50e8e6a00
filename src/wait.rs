//! Bounded busy-wait primitives
//!
//! The radio reports the completion of mode changes, RSSI measurements and
//! transmissions through status bits and the DIO0 line. The driver polls for
//! them. Every poll loop here is bounded and calls [`Clock::relax`] once per
//! iteration, so a hosted environment can turn the busy-wait into a
//! cooperative one without touching the driver.

use crate::log::warn;
use crate::Error;

/// Register polls allowed for ModeReady after leaving Sleep.
///
/// The datasheet gives ~1.5 ms for the Sleep to Standby transition in the
/// worst case; at a few µs per SPI poll this leaves a wide margin.
pub const MODE_READY_POLLS: u32 = 10_000;

/// Register polls allowed for an RSSI measurement to finish.
pub const RSSI_DONE_POLLS: u32 = 10_000;

/// Time allowed for a frame to leave the radio.
///
/// A full 66 byte frame at the default 2.7 kbps spends ~220 ms on air.
pub const TX_TIMEOUT_MS: u32 = 1_000;

/// Millisecond time base used by the retry protocol and the transmit wait.
pub trait Clock {
    /// Monotonic milliseconds. Wrapping is allowed, durations are computed
    /// with wrapping arithmetic.
    fn now_ms(&mut self) -> u32;

    /// Called once per busy-wait iteration.
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_ms(&mut self) -> u32 {
        (**self).now_ms()
    }

    fn relax(&mut self) {
        (**self).relax()
    }
}

/// Milliseconds elapsed since `since`, tolerant of counter wrap-around.
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Polls `done` until it reports `true`, at most `polls` times.
pub(crate) fn poll_until<C: Clock>(
    clock: &mut C,
    polls: u32,
    what: &'static str,
    mut done: impl FnMut() -> Result<bool, Error>,
) -> Result<(), Error> {
    for _ in 0..polls {
        if done()? {
            return Ok(());
        }
        clock.relax();
    }
    warn!("gave up waiting for {}", what);
    Err(Error::Timeout)
}
