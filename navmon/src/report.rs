use crate::nav::{beidou::BeidouReport, galileo::GalileoWord, gps::GpsReport};

/// Outcome of dispatching one envelope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedReport {
    pub source_id: u64,
    pub local_utc_seconds: u64,
    pub local_utc_nanoseconds: u64,
    pub body: ReportBody,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ReportBody {
    /// Signal quality, passed through
    Reception {
        gnss_id: u32,
        sv: u32,
        db: u32,
        el: u32,
        azi: u32,
    },
    Galileo {
        gnss_id: u32,
        sv: u32,
        tow: u32,
        word: GalileoWord,
    },
    Gps(GpsReport),
    BeidouD1(BeidouReport),
    BeidouD2(BeidouReport),
    /// Observer position, not decoded further
    Position,
    Rf {
        gnss_id: u32,
        sv: u32,
    },
    /// Kind value outside the known set
    Unknown {
        kind: i32,
    },
    /// Known kind whose payload could not be decoded
    Malformed {
        kind: i32,
        reason: String,
    },
    /// Frame payload that is not an envelope
    Unparseable {
        reason: String,
    },
}
