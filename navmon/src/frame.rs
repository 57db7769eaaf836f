//! Wire framing: `bert` magic, big-endian `u16` length, envelope payload.

use std::io::Write;

use log::{debug, warn};
use prost::Message;

use crate::{
    constants::{FRAME_LENGTH_LEN, FRAME_MAGIC, FRAME_MAGIC_LEN, MAX_FRAME_PAYLOAD_LEN},
    envelope::Envelope,
    error::{DecodeError, ProtocolError, TransportError},
    transport::{read_exact, TimeoutBudget, WaitReadable},
};

/// One frame as read from the wire, before envelope decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub magic: [u8; 4],
    pub payload: Vec<u8>,
}

impl RawFrame {
    pub fn check_magic(&self) -> Result<(), ProtocolError> {
        if self.magic == FRAME_MAGIC {
            Ok(())
        } else {
            Err(ProtocolError::BadMagic { got: self.magic })
        }
    }

    pub fn envelope(&self) -> Result<Envelope, DecodeError> {
        Envelope::from_bytes(&self.payload)
    }
}

/// Reads one frame. All three reads share `budget`.
///
/// A wrong magic is logged and the frame is still read, so a stream that lost
/// sync keeps flowing; callers can inspect it with [`RawFrame::check_magic`].
pub fn read_frame<R: WaitReadable>(
    source: &mut R,
    mut budget: Option<&mut TimeoutBudget>,
) -> Result<RawFrame, TransportError> {
    let head = read_exact(source, FRAME_MAGIC_LEN, budget.as_deref_mut())?;
    let mut magic = [0u8; 4];
    magic.copy_from_slice(&head);
    if magic != FRAME_MAGIC {
        warn!("{}, reading frame anyway", ProtocolError::BadMagic { got: magic });
    }

    let len = read_exact(source, FRAME_LENGTH_LEN, budget.as_deref_mut())?;
    let len = usize::from(u16::from_be_bytes([len[0], len[1]]));

    let payload = read_exact(source, len, budget)?;
    debug!("frame with {} byte payload", len);

    Ok(RawFrame { magic, payload })
}

/// Serializes `envelope` into a complete wire frame.
pub fn encode_frame(envelope: &Envelope) -> Result<Vec<u8>, ProtocolError> {
    let len = envelope.encoded_len();
    let len16 = u16::try_from(len).map_err(|_| ProtocolError::PayloadTooLarge { len })?;
    debug_assert!(len <= MAX_FRAME_PAYLOAD_LEN);

    let mut out = Vec::with_capacity(FRAME_MAGIC_LEN + FRAME_LENGTH_LEN + len);
    out.extend_from_slice(&FRAME_MAGIC);
    out.extend_from_slice(&len16.to_be_bytes());
    out.extend_from_slice(&envelope.encode_to_vec());
    Ok(out)
}

pub fn write_frame<W: Write>(sink: &mut W, envelope: &Envelope) -> std::io::Result<()> {
    let frame = encode_frame(envelope)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    sink.write_all(&frame)
}
