//! Packet engine related registers
//!
//! This module contains registers for configuring packet handling features including:
//! - Sync word (the second sync byte carries the network id)
//! - Packet format, CRC and address filtering
//! - Node and broadcast addresses
//! - Receiver restart and AES encryption
//!
//! These registers are used together by the link layer to define the complete
//! frame format on air.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Length of the AES-128 key block
pub const AES_KEY_LEN: usize = 16;

/// First sync word byte (address: 0x2F)
///
/// Also used as a scratch register to probe for the device at start-up.
#[register(0x2Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, PartialEq, Eq)]
pub struct SyncValue1 {
    /// Sync word byte
    pub value: u8,
}

/// Second sync word byte (address: 0x30)
///
/// Holds the network id: radios with a different value never see each
/// other's frames.
#[register(0x30u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct SyncValue2 {
    /// Network id
    pub network_id: u8,
}

/// Address based filtering performed by the packet engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressFiltering {
    /// Every frame reaches the FIFO
    Off = 0b00,
    /// Target must match the node address
    Node = 0b01,
    /// Target must match the node or the broadcast address
    NodeOrBroadcast = 0b10,
}

impl From<u8> for AddressFiltering {
    fn from(bits: u8) -> Self {
        match bits & 0x03 {
            0b01 => Self::Node,
            0b10 => Self::NodeOrBroadcast,
            _ => Self::Off,
        }
    }
}

/// Packet configuration register 1 (address: 0x37)
///
/// # Important Notes
/// - The link layer always runs in variable length mode with CRC on
/// - Address filtering drops frames in hardware before they reach the FIFO;
///   promiscuous reception needs it off
#[register(0x37u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PacketConfig1 {
    /// Variable length packet format
    pub variable_length: bool,
    /// DC-free encoding (bits 6..5)
    pub dc_free: u8,
    /// Append and check a CRC
    pub crc_on: bool,
    /// Keep the FIFO when the CRC check fails
    pub crc_auto_clear_off: bool,
    /// Hardware address filter
    pub address_filtering: AddressFiltering,
}

impl Default for PacketConfig1 {
    fn default() -> Self {
        Self {
            variable_length: true,
            dc_free: 0,
            crc_on: true,
            crc_auto_clear_off: false,
            address_filtering: AddressFiltering::NodeOrBroadcast,
        }
    }
}

/// Node address register (address: 0x39)
#[register(0x39u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct NodeAddress {
    /// Node address used by the hardware filter
    pub address: u8,
}

/// Broadcast address register (address: 0x3A)
#[register(0x3Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct BroadcastAddress {
    /// Broadcast address used by the hardware filter
    pub address: u8,
}

/// Packet configuration register 2 (address: 0x3D)
///
/// # Important Notes
/// - `restart_rx` is a trigger, it always reads back as 0
/// - Setting `restart_rx` clears the FIFO and a stale PayloadReady flag
/// - The Rx restart delay must match the transmitter's PA ramp-down time
#[register(0x3Du8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct PacketConfig2 {
    /// Inter packet Rx delay (bits 7..4)
    pub inter_packet_rx_delay: u8,
    /// Force the receiver into wait mode, clearing the FIFO
    pub restart_rx: bool,
    /// Restart the receiver automatically after PayloadReady is cleared
    pub auto_rx_restart: bool,
    /// Enable AES-128 encryption of the payload
    pub aes_on: bool,
    reserved: bool,
}

/// AES key register block (address: 0x3E..0x4D)
///
/// Write-only. The key is written MSB first as one burst.
#[register(0x3Eu8)]
#[derive(Debug, Clone, Copy, WritableRegister)]
pub struct AesKey {
    /// 128-bit cipher key
    pub key: [u8; AES_KEY_LEN],
}

impl FromByteArray for SyncValue1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for SyncValue1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for SyncValue2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            network_id: bytes[0],
        })
    }
}

impl ToByteArray for SyncValue2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.network_id])
    }
}

impl FromByteArray for PacketConfig1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            variable_length: bytes[0] & 0x80 != 0,
            dc_free: (bytes[0] >> 5) & 0x03,
            crc_on: bytes[0] & 0x10 != 0,
            crc_auto_clear_off: bytes[0] & 0x08 != 0,
            address_filtering: AddressFiltering::from(bytes[0] >> 1),
        })
    }
}

impl ToByteArray for PacketConfig1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.variable_length as u8) << 7
            | (self.dc_free & 0x03) << 5
            | (self.crc_on as u8) << 4
            | (self.crc_auto_clear_off as u8) << 3
            | (self.address_filtering as u8) << 1])
    }
}

impl FromByteArray for NodeAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { address: bytes[0] })
    }
}

impl ToByteArray for NodeAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.address])
    }
}

impl FromByteArray for BroadcastAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { address: bytes[0] })
    }
}

impl ToByteArray for BroadcastAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.address])
    }
}

impl FromByteArray for PacketConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            inter_packet_rx_delay: bytes[0] >> 4,
            reserved: bytes[0] & 0x08 != 0,
            restart_rx: bytes[0] & 0x04 != 0,
            auto_rx_restart: bytes[0] & 0x02 != 0,
            aes_on: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for PacketConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.inter_packet_rx_delay & 0x0F) << 4
            | (self.reserved as u8) << 3
            | (self.restart_rx as u8) << 2
            | (self.auto_rx_restart as u8) << 1
            | self.aes_on as u8])
    }
}

impl ToByteArray for AesKey {
    type Error = Infallible;
    type Array = [u8; AES_KEY_LEN];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.key)
    }
}
