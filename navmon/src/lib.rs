//! # navmon
//!
//! Decoder for navmon telemetry streams: length-prefixed frames of protobuf
//! envelopes carrying raw GPS, Galileo I/NAV and BeiDou D1/D2 navigation bits
//! as captured by a monitoring receiver.
//!
//! Reading a stream
//! ================
//!
//! A [`NavStream`] reads frames from any pollable source (a file, a pipe, a
//! socket), decodes each envelope and hands a [`DecodedReport`] per frame to a
//! handler:
//! ```no_run
//! use std::time::Duration;
//! use navmon::{IngestConfig, NavStream};
//!
//! let stdin = std::fs::File::open("/dev/stdin").unwrap();
//! let config = IngestConfig {
//!     frame_timeout: Some(Duration::from_secs(5)),
//!     ..Default::default()
//! };
//! let mut stream = NavStream::new(stdin, config);
//! let end = stream.on_report(|report| println!("{:?}", report)).unwrap();
//! println!("stream ended: {:?}", end);
//! ```
//!
//! Decoding envelopes
//! ==================
//!
//! Envelopes obtained elsewhere go through a [`Dispatcher`] directly. The
//! dispatcher owns the per-satellite Galileo state, so keep one per stream.
//! ```
//! use navmon::{Dispatcher, Envelope, MessageKind, NavMessage, ReportBody};
//!
//! let envelope = Envelope {
//!     source_id: 1,
//!     kind: MessageKind::GalileoInav as i32,
//!     galileo_inav: Some(NavMessage {
//!         gnss_sv: 11,
//!         contents: vec![0; 16],
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//! let mut dispatcher = Dispatcher::default();
//! let report = dispatcher.dispatch(&envelope);
//! assert!(matches!(report.body, ReportBody::Galileo { sv: 11, .. }));
//! ```

#[cfg(feature = "serde")]
extern crate serde;

pub mod accuracy;
pub mod bits;
mod constants;
mod dispatch;
pub mod envelope;
mod error;
pub mod frame;
mod ingest;
pub mod nav;
mod report;
pub mod transport;

pub use crate::{
    constants::{FRAME_MAGIC, GALILEO_T0A_SCALE, MAX_FRAME_PAYLOAD_LEN, SECONDS_PER_WEEK},
    dispatch::Dispatcher,
    envelope::{Envelope, MessageKind, NavMessage, Payload},
    error::{DecodeError, ProtocolError, TransportError},
    frame::{encode_frame, read_frame, write_frame, RawFrame},
    ingest::{IngestConfig, NavStream, ReportHandler, StreamEnd},
    nav::{ephemeris_age, galileo::TowTracking},
    report::{DecodedReport, ReportBody},
    transport::{read_exact, TimeoutBudget, WaitReadable},
};
