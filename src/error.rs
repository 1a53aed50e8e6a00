//! Driver error type

/// Errors reported by the register transport and the bounded hardware waits.
///
/// Link-level outcomes (a dropped frame, a busy channel, an exhausted retry
/// budget) are not errors; they surface as `Ok(false)` from the operation
/// that observed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI communication failed
    Bus,
    /// Reading the DIO0 line failed
    Pin,
    /// A register value could not be parsed
    Deserialization,
    /// A hardware status bit never reached the expected state
    Timeout,
    /// A [`SharedRadio`](crate::SharedRadio) was used before a radio was installed
    Uninitialized,
}
