//! Schema-encoded transport records.
//!
//! An [`Envelope`] is a proto2 message compatible with the galmon
//! `NavMonMessage` layout: source and local time metadata plus one payload,
//! selected by its `kind`.

use chrono::{DateTime, Utc};
use prost::{Enumeration, Message};

use crate::error::DecodeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum MessageKind {
    ReceptionData = 1,
    ObserverPosition = 2,
    GalileoInav = 3,
    GpsInav = 4,
    BeidouInavD1 = 5,
    BeidouInavD2 = 6,
    RfData = 9,
}

impl MessageKind {
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::ReceptionData => "ReceptionData",
            MessageKind::ObserverPosition => "ObserverPosition",
            MessageKind::GalileoInav => "GalileoInav",
            MessageKind::GpsInav => "GpsInav",
            MessageKind::BeidouInavD1 => "BeidouInavD1",
            MessageKind::BeidouInavD2 => "BeidouInavD2",
            MessageKind::RfData => "RfData",
        }
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Envelope {
    #[prost(uint64, required, tag = "1")]
    pub source_id: u64,

    /// Raw [`MessageKind`] value, kept as received so unknown kinds can be reported
    #[prost(enumeration = "MessageKind", required, tag = "2")]
    pub kind: i32,

    #[prost(uint64, required, tag = "3")]
    pub local_utc_seconds: u64,

    #[prost(uint64, required, tag = "4")]
    pub local_utc_nanoseconds: u64,

    #[prost(message, optional, tag = "5")]
    pub galileo_inav: Option<NavMessage>,

    #[prost(message, optional, tag = "6")]
    pub reception_data: Option<ReceptionData>,

    #[prost(message, optional, tag = "7")]
    pub observer_position: Option<ObserverPosition>,

    #[prost(message, optional, tag = "8")]
    pub gps_inav: Option<NavMessage>,

    #[prost(message, optional, tag = "9")]
    pub beidou_inav_d1: Option<NavMessage>,

    #[prost(message, optional, tag = "10")]
    pub beidou_inav_d2: Option<NavMessage>,

    #[prost(message, optional, tag = "13")]
    pub rf_data: Option<RfData>,
}

/// Raw navigation bits of one satellite, shared by the Galileo, GPS and
/// BeiDou payload variants.
#[derive(Clone, PartialEq, Message)]
pub struct NavMessage {
    #[prost(uint32, required, tag = "1")]
    pub gnss_wn: u32,

    #[prost(uint32, required, tag = "2")]
    pub gnss_tow: u32,

    #[prost(uint32, required, tag = "3")]
    pub gnss_id: u32,

    #[prost(uint32, required, tag = "4")]
    pub gnss_sv: u32,

    #[prost(bytes = "vec", required, tag = "5")]
    pub contents: Vec<u8>,

    #[prost(uint32, optional, tag = "6")]
    pub sigid: Option<u32>,
}

/// Signal quality of one tracked satellite.
#[derive(Clone, PartialEq, Message)]
pub struct ReceptionData {
    #[prost(uint32, required, tag = "1")]
    pub gnss_id: u32,

    #[prost(uint32, required, tag = "2")]
    pub gnss_sv: u32,

    /// Carrier to noise density (dB-Hz)
    #[prost(uint32, required, tag = "3")]
    pub db: u32,

    /// Elevation (degrees)
    #[prost(uint32, required, tag = "4")]
    pub el: u32,

    /// Azimuth (degrees)
    #[prost(uint32, required, tag = "5")]
    pub azi: u32,

    /// Pseudorange residual (m)
    #[prost(double, required, tag = "6")]
    pub pr_res: f64,

    #[prost(uint32, optional, tag = "7")]
    pub sigid: Option<u32>,
}

/// ECEF position of the observing receiver.
#[derive(Clone, PartialEq, Message)]
pub struct ObserverPosition {
    #[prost(double, required, tag = "1")]
    pub x: f64,

    #[prost(double, required, tag = "2")]
    pub y: f64,

    #[prost(double, required, tag = "3")]
    pub z: f64,

    #[prost(double, optional, tag = "4")]
    pub acc: Option<f64>,
}

/// Raw measurement of one satellite signal.
#[derive(Clone, PartialEq, Message)]
pub struct RfData {
    #[prost(uint32, required, tag = "1")]
    pub gnss_wn: u32,

    #[prost(double, required, tag = "2")]
    pub rcv_tow: f64,

    #[prost(uint32, required, tag = "3")]
    pub gnss_id: u32,

    #[prost(uint32, required, tag = "4")]
    pub gnss_sv: u32,

    #[prost(double, required, tag = "5")]
    pub doppler: f64,

    #[prost(double, required, tag = "6")]
    pub carrierphase: f64,

    #[prost(double, required, tag = "7")]
    pub pseudorange: f64,

    #[prost(double, required, tag = "8")]
    pub pr_std: f64,

    #[prost(double, required, tag = "9")]
    pub do_std: f64,

    #[prost(double, required, tag = "10")]
    pub cp_std: f64,

    #[prost(uint32, required, tag = "11")]
    pub locktime_ms: u32,

    #[prost(uint32, optional, tag = "12")]
    pub sigid: Option<u32>,
}

/// The payload an [`Envelope`] carries according to its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    ReceptionData(&'a ReceptionData),
    GalileoInav(&'a NavMessage),
    GpsInav(&'a NavMessage),
    BeidouInavD1(&'a NavMessage),
    BeidouInavD2(&'a NavMessage),
    /// Position reports are not decoded further, so the body may be absent
    ObserverPosition(Option<&'a ObserverPosition>),
    RfData(&'a RfData),
    /// Kind value this crate does not know about
    Unknown(i32),
}

impl Envelope {
    /// Decodes an envelope from a frame payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self::decode(bytes)?)
    }

    pub fn message_kind(&self) -> Option<MessageKind> {
        MessageKind::try_from(self.kind).ok()
    }

    /// Returns the payload selected by `kind`. Variants populated for other
    /// kinds are ignored.
    pub fn payload(&self) -> Result<Payload<'_>, DecodeError> {
        let Some(kind) = self.message_kind() else {
            return Ok(Payload::Unknown(self.kind));
        };
        let missing = || DecodeError::MissingPayload { kind: kind.name() };

        Ok(match kind {
            MessageKind::ReceptionData => {
                Payload::ReceptionData(self.reception_data.as_ref().ok_or_else(missing)?)
            },
            MessageKind::GalileoInav => {
                Payload::GalileoInav(self.galileo_inav.as_ref().ok_or_else(missing)?)
            },
            MessageKind::GpsInav => Payload::GpsInav(self.gps_inav.as_ref().ok_or_else(missing)?),
            MessageKind::BeidouInavD1 => {
                Payload::BeidouInavD1(self.beidou_inav_d1.as_ref().ok_or_else(missing)?)
            },
            MessageKind::BeidouInavD2 => {
                Payload::BeidouInavD2(self.beidou_inav_d2.as_ref().ok_or_else(missing)?)
            },
            MessageKind::ObserverPosition => {
                Payload::ObserverPosition(self.observer_position.as_ref())
            },
            MessageKind::RfData => Payload::RfData(self.rf_data.as_ref().ok_or_else(missing)?),
        })
    }

    /// Local receive time, `None` if it is out of the representable range.
    pub fn local_time(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.local_utc_seconds).ok()?;
        let nanos = u32::try_from(self.local_utc_nanoseconds).ok()?;
        DateTime::from_timestamp(secs, nanos)
    }
}
