use std::{fmt, io};

/// Failure to obtain the bytes of a frame from the stream.
///
/// All variants end the ingestion loop: `Eof` and `Timeout` are normal ways
/// for a stream to finish, `Io` is a real fault.
#[derive(Debug)]
pub enum TransportError {
    /// The timeout budget ran out before the requested bytes arrived
    Timeout,
    /// The peer closed the stream
    Eof,
    Io(io::Error),
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::Io(error)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => f.write_str("timed out waiting for stream data"),
            TransportError::Eof => f.write_str("stream closed by peer"),
            TransportError::Io(e) => write!(f, "stream I/O error: {}", e),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Framing-level problem that does not interrupt the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    BadMagic { got: [u8; 4] },
    PayloadTooLarge { len: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::BadMagic { got } => write!(f, "bad magic {:02x?}", got),
            ProtocolError::PayloadTooLarge { len } => {
                write!(f, "payload of {} bytes does not fit a frame", len)
            },
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Content that could not be interpreted; reported, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    InvalidEnvelope(prost::DecodeError),
    MissingPayload {
        kind: &'static str,
    },
    InvalidPayloadLen {
        payload: &'static str,
        expect: usize,
        got: usize,
    },
    InvalidSatellite {
        constellation: &'static str,
        sv: u32,
    },
}

impl From<prost::DecodeError> for DecodeError {
    fn from(e: prost::DecodeError) -> Self {
        DecodeError::InvalidEnvelope(e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidEnvelope(e) => write!(f, "invalid envelope: {}", e),
            DecodeError::MissingPayload { kind } => {
                write!(f, "envelope of kind {} carries no matching payload", kind)
            },
            DecodeError::InvalidPayloadLen {
                payload,
                expect,
                got,
            } => write!(
                f,
                "Invalid payload({}) length, expect at least {}, got {}",
                payload, expect, got
            ),
            DecodeError::InvalidSatellite { constellation, sv } => {
                write!(f, "no {} satellite with id {}", constellation, sv)
            },
        }
    }
}

impl std::error::Error for DecodeError {}
