#![cfg_attr(not(test), no_std)]
//! RFM69 Link Layer Driver
//!
//! This crate turns a HopeRF RFM69W/HW or Semtech SX1231/H sub-GHz FSK
//! transceiver into a small link layer: addressed frames, an
//! interrupt-driven receiver, listen-before-talk and acknowledged delivery
//! with retries.
//!
//! # Features
//! - Frequency bands: 315, 433, 868 and 915 MHz
//! - Flat 8-bit node addressing with broadcast (address 0)
//! - Network separation through the sync word
//! - Payloads up to 61 bytes per frame
//! - Optional ACK request/reply with a bounded retry loop
//! - Clear channel assessment before every transmission (RSSI < -90 dBm)
//! - Optional AES-128 encryption in hardware
//! - RFM69HW high power mode (+20 dBm)
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: SPI transport implementing [`RegisterPort`]
//!
//! - [`registers`]: Register definitions for direct hardware access
//!
//! - [`config`]: Start-up register table and frequency bands
//!
//! - [`frame`]: On-air frame format
//!
//! - [`Radio`]: The link layer endpoint
//!   - [`mode`]: Transceiver mode state machine
//!   - [`receive`]: Interrupt-driven receive pipeline
//!   - [`csma`]: Clear channel assessment
//!   - [`reliable`]: Transmission, ACKs and retries
//!   - [`crypto`]: AES key handling
//!
//! - [`SharedRadio`]: A radio shared between the foreground and the DIO0
//!   interrupt handler
//!
//! - [`wait`]: Time base and bounded busy-waits
//!
//! # Usage
//! Reception is interrupt driven. DIO0 must be wired to a GPIO with a rising
//! edge interrupt whose handler calls [`Radio::handle_interrupt`], usually
//! through [`SharedRadio::on_interrupt`]. The foreground then polls
//! [`Radio::receive_done`], which also keeps the receiver armed.
//!
//! Bring-up follows this sequence:
//!
//! 1. Wrap the SPI device in a [`Device`]
//! 2. Create a [`Radio`] with the DIO0 pin and a millisecond [`Clock`]
//! 3. Call [`Radio::initialize`] with the band, node address and network id
//! 4. Optionally set the power level and the encryption key
//! 5. Install the radio in a [`SharedRadio`] and enable the DIO0 interrupt
//!
//! # Important Notes
//! - Both ends must use the same network id and encryption key
//! - A frame is only kept until the next accepted frame arrives
//! - Broadcast frames are never acknowledged
//! - Every hardware wait is bounded and reports [`Error::Timeout`]
//!
//! # Example
//! ```ignore
//! use rfm69::{Device, FrequencyBand, Radio};
//!
//! let mut radio = Radio::new(Device::new(spi), dio0, millis, true);
//! radio.initialize(FrequencyBand::Mhz868, 5, 100)?;
//!
//! if radio.send_with_retry(9, b"hello", 3, 40)? {
//!     // delivered
//! }
//! ```

mod log;

pub mod config;
pub mod crypto;
pub mod csma;
pub mod device;
pub mod error;
pub mod frame;
pub mod mode;
pub mod port;
pub mod radio;
pub mod receive;
pub mod registers;
pub mod reliable;
pub mod shared;
pub mod wait;

pub use config::{FrequencyBand, BROADCAST_ADDRESS};
pub use csma::CSMA_LIMIT_DBM;
pub use device::Device;
pub use error::Error;
pub use frame::{Control, Frame, MAX_PAYLOAD_LEN};
pub use mode::RadioMode;
pub use port::RegisterPort;
pub use radio::{NodeIdentity, Radio};
pub use receive::ReceivedFrame;
pub use reliable::Exclusive;
pub use shared::SharedRadio;
pub use wait::Clock;
