//! RF related registers
//!
//! This module contains registers for configuring the RF front end:
//! - Carrier frequency
//! - Power amplifier selection and output power
//! - Over-current protection
//! - RSSI measurement
//! - High power (+20 dBm) test registers
//!
//! The RFM69HW variant only has PA1 and PA2 bonded out; the RFM69W uses PA0.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Highest value accepted by [`PaLevel::output_power`]
pub const MAX_OUTPUT_POWER: u8 = 31;

/// RF carrier frequency register (address: 0x07..0x09)
///
/// 24-bit big-endian carrier word. Frf = Fstep * value with
/// Fstep = 32 MHz / 2^19 = 61.035 Hz.
///
/// # Important Notes
/// - The new frequency only takes effect once the LSB has been written
#[register(0x07u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Frf {
    /// Carrier word, upper 8 bits ignored
    pub value: u32,
}

impl Default for Frf {
    fn default() -> Self {
        Self { value: 0xE4_C000 }
    }
}

/// PA level register (address: 0x11)
///
/// # Important Notes
/// - RFM69W: Pout = -18 + OutputPower with PA0
/// - RFM69HW: Pout = -14 + OutputPower with PA1 and PA2, -11 + OutputPower
///   with the high power test registers set
#[register(0x11u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PaLevel {
    /// Enable PA0 (RFM69W)
    pub pa0_on: bool,
    /// Enable PA1
    pub pa1_on: bool,
    /// Enable PA2
    pub pa2_on: bool,
    /// Output power setting, 0..=31
    pub output_power: u8,
}

impl Default for PaLevel {
    fn default() -> Self {
        Self {
            pa0_on: true,
            pa1_on: false,
            pa2_on: false,
            output_power: MAX_OUTPUT_POWER,
        }
    }
}

/// Over-current protection register (address: 0x13)
///
/// Must be disabled when running the RFM69HW at high power.
#[register(0x13u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Ocp {
    /// Enable over-current protection
    pub enabled: bool,
    /// Trimming, Imax = 45 + 5 * trim mA
    pub trim: u8,
}

impl Ocp {
    /// Over-current protection disabled
    pub const OFF: Self = Self {
        enabled: false,
        trim: 0x0F,
    };
}

impl Default for Ocp {
    /// 95 mA limit
    fn default() -> Self {
        Self {
            enabled: true,
            trim: 0x0A,
        }
    }
}

/// RSSI configuration register (address: 0x23)
#[register(0x23u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct RssiConfig {
    /// Measurement finished, read only
    pub done: bool,
    /// Start a measurement, write only
    pub start: bool,
}

/// RSSI value register (address: 0x24)
///
/// Absolute value of the RSSI in dBm, 0.5 dB steps.
#[register(0x24u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct RssiValue {
    /// -2 * RSSI in dBm
    pub value: u8,
}

impl RssiValue {
    /// Converts the raw register value to dBm.
    pub fn dbm(self) -> i16 {
        (-(self.value as i16)) >> 1
    }
}

/// High power PA test register 1 (address: 0x5A)
///
/// Written on every Tx/Rx transition of an RFM69HW. Must be back to normal
/// before entering Rx.
#[register(0x5Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct TestPa1 {
    /// 0x55 = normal, 0x5D = +20 dBm
    pub value: u8,
}

/// High power PA test register 2 (address: 0x5C)
#[register(0x5Cu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct TestPa2 {
    /// 0x70 = normal, 0x7C = +20 dBm
    pub value: u8,
}

impl TestPa1 {
    pub const NORMAL: Self = Self { value: 0x55 };
    pub const BOOST: Self = Self { value: 0x5D };
}

impl TestPa2 {
    pub const NORMAL: Self = Self { value: 0x70 };
    pub const BOOST: Self = Self { value: 0x7C };
}

impl FromByteArray for Frf {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
        })
    }
}

impl ToByteArray for Frf {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let bytes = self.value.to_be_bytes();
        Ok([bytes[1], bytes[2], bytes[3]])
    }
}

impl FromByteArray for PaLevel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            pa0_on: bytes[0] & 0x80 != 0,
            pa1_on: bytes[0] & 0x40 != 0,
            pa2_on: bytes[0] & 0x20 != 0,
            output_power: bytes[0] & 0x1F,
        })
    }
}

impl ToByteArray for PaLevel {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.pa0_on as u8) << 7
            | (self.pa1_on as u8) << 6
            | (self.pa2_on as u8) << 5
            | self.output_power.min(MAX_OUTPUT_POWER)])
    }
}

impl FromByteArray for Ocp {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            enabled: bytes[0] & 0x10 != 0,
            trim: bytes[0] & 0x0F,
        })
    }
}

impl ToByteArray for Ocp {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.enabled as u8) << 4 | (self.trim & 0x0F)])
    }
}

impl FromByteArray for RssiConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            done: bytes[0] & 0x02 != 0,
            start: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for RssiConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.start as u8])
    }
}

impl FromByteArray for RssiValue {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl FromByteArray for TestPa1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for TestPa1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for TestPa2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for TestPa2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}
