//! Link-layer frame format
//!
//! Every frame travels through the radio FIFO in this order:
//!
//! ```text
//! byte 0   length   = 3 + payload length
//! byte 1   target   (0 = broadcast)
//! byte 2   sender
//! byte 3   control  (bit 7 = ACK reply, bit 6 = ACK request)
//! byte 4.. payload  (0..=61 bytes)
//! ```
//!
//! The length byte is consumed by the packet engine in variable length mode;
//! target, sender and control are plain payload bytes as far as the radio is
//! concerned.

use bitflags::bitflags;
use heapless::Vec;

/// Bytes following the length byte that are not payload: target, sender, control
pub const HEADER_LEN: usize = 3;

/// Largest payload a frame carries. Longer payloads are truncated on send.
pub const MAX_PAYLOAD_LEN: usize = 61;

/// Largest encoded frame, length byte included
pub const MAX_ENCODED_LEN: usize = 1 + HEADER_LEN + MAX_PAYLOAD_LEN;

bitflags! {
    /// Frame control byte
    ///
    /// A frame is a plain data frame (no bits), an ACK request, or an ACK
    /// reply; the driver never sets both bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u8 {
        /// This frame acknowledges a previously received frame
        const ACK_REPLY = 1 << 7;
        /// The sender expects an ACK reply
        const ACK_REQUEST = 1 << 6;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Control({=u8:#04x})", self.bits())
    }
}

/// One over-the-air frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub target: u8,
    pub sender: u8,
    pub control: Control,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl Frame {
    /// Builds a frame, truncating `payload` to [`MAX_PAYLOAD_LEN`].
    pub fn new(target: u8, sender: u8, control: Control, payload: &[u8]) -> Self {
        let len = payload.len().min(MAX_PAYLOAD_LEN);
        Self {
            target,
            sender,
            control,
            payload: Vec::from_slice(&payload[..len]).unwrap_or_default(),
        }
    }

    /// Value of the length byte on air.
    pub fn length(&self) -> u8 {
        (HEADER_LEN + self.payload.len()) as u8
    }

    pub fn ack_requested(&self) -> bool {
        self.control.contains(Control::ACK_REQUEST)
    }

    pub fn is_ack(&self) -> bool {
        self.control.contains(Control::ACK_REPLY)
    }

    /// Encodes the frame in FIFO order.
    pub fn encode(&self) -> EncodedFrame {
        encode(self.target, self.sender, self.control, &self.payload)
    }

    /// Decodes a complete frame held in memory, accepting any target.
    ///
    /// Returns `None` for a malformed frame (length below the header size) or
    /// when `bytes` ends before the announced length.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let mut cursor = 0;
        let read = |buf: &mut [u8]| -> Result<(), ()> {
            let chunk = bytes.get(cursor..cursor + buf.len()).ok_or(())?;
            buf.copy_from_slice(chunk);
            cursor += buf.len();
            Ok(())
        };

        match decode_with(read, |_| true) {
            Ok(Decoded::Frame(frame)) => Some(frame),
            _ => None,
        }
    }
}

/// A frame serialized for the FIFO
#[derive(Clone)]
pub struct EncodedFrame {
    bytes: [u8; MAX_ENCODED_LEN],
    len: usize,
}

impl EncodedFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl AsRef<[u8]> for EncodedFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Serializes a frame in FIFO order, truncating the payload to
/// [`MAX_PAYLOAD_LEN`].
pub fn encode(target: u8, sender: u8, control: Control, payload: &[u8]) -> EncodedFrame {
    let payload = &payload[..payload.len().min(MAX_PAYLOAD_LEN)];

    let mut bytes = [0u8; MAX_ENCODED_LEN];
    bytes[0] = (HEADER_LEN + payload.len()) as u8;
    bytes[1] = target;
    bytes[2] = sender;
    bytes[3] = control.bits();
    bytes[1 + HEADER_LEN..1 + HEADER_LEN + payload.len()].copy_from_slice(payload);

    EncodedFrame {
        bytes,
        len: 1 + HEADER_LEN + payload.len(),
    }
}

/// Outcome of decoding one frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    /// Accepted frame
    Frame(Frame),
    /// Length byte below the header size
    Malformed,
    /// Target rejected by the address filter
    Filtered(u8),
}

/// Decodes one frame from a byte source.
///
/// `read` must fill the whole buffer it is given with the next bytes of the
/// frame, in order. `accept` is the address filter, called with the target
/// address before anything past it is read.
///
/// A malformed or filtered frame stops the read early. Payload bytes past
/// [`MAX_PAYLOAD_LEN`] are left unread.
pub fn decode_with<E>(
    mut read: impl FnMut(&mut [u8]) -> Result<(), E>,
    accept: impl FnOnce(u8) -> bool,
) -> Result<Decoded, E> {
    let mut length = [0u8];
    read(&mut length)?;
    let Some(payload_len) = (length[0] as usize).checked_sub(HEADER_LEN) else {
        return Ok(Decoded::Malformed);
    };

    let mut target = [0u8];
    read(&mut target)?;
    if !accept(target[0]) {
        return Ok(Decoded::Filtered(target[0]));
    }

    let mut sender_control = [0u8; 2];
    read(&mut sender_control)?;

    let mut payload = [0u8; MAX_PAYLOAD_LEN];
    let payload = &mut payload[..payload_len.min(MAX_PAYLOAD_LEN)];
    read(payload)?;

    Ok(Decoded::Frame(Frame::new(
        target[0],
        sender_control[0],
        Control::from_bits_truncate(sender_control[1]),
        payload,
    )))
}
