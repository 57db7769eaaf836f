use log::{debug, warn};

use crate::{
    envelope::{Envelope, Payload},
    error::DecodeError,
    nav::{
        beidou,
        galileo::{GalileoDecoder, TowTracking},
        gps,
    },
    report::{DecodedReport, ReportBody},
};

/// Routes envelopes to the decoder of their constellation.
///
/// Holds the Galileo accumulators, so one dispatcher should see one stream.
#[derive(Debug, Default, Clone)]
pub struct Dispatcher {
    galileo: GalileoDecoder,
}

impl Dispatcher {
    pub fn new(tow_tracking: TowTracking) -> Self {
        Self {
            galileo: GalileoDecoder::new(tow_tracking),
        }
    }

    pub fn galileo(&self) -> &GalileoDecoder {
        &self.galileo
    }

    /// Decodes a frame payload and dispatches it. A payload that is not an
    /// envelope is reported as [`ReportBody::Unparseable`].
    pub fn dispatch_bytes(&mut self, payload: &[u8]) -> DecodedReport {
        match Envelope::from_bytes(payload) {
            Ok(envelope) => self.dispatch(&envelope),
            Err(e) => {
                warn!("{}", e);
                DecodedReport {
                    source_id: 0,
                    local_utc_seconds: 0,
                    local_utc_nanoseconds: 0,
                    body: ReportBody::Unparseable {
                        reason: e.to_string(),
                    },
                }
            },
        }
    }

    pub fn dispatch(&mut self, envelope: &Envelope) -> DecodedReport {
        let body = match self.body(envelope) {
            Ok(body) => body,
            Err(e) => {
                warn!("source {}: {}", envelope.source_id, e);
                ReportBody::Malformed {
                    kind: envelope.kind,
                    reason: e.to_string(),
                }
            },
        };
        debug!("source {} kind {}", envelope.source_id, envelope.kind);

        DecodedReport {
            source_id: envelope.source_id,
            local_utc_seconds: envelope.local_utc_seconds,
            local_utc_nanoseconds: envelope.local_utc_nanoseconds,
            body,
        }
    }

    fn body(&mut self, envelope: &Envelope) -> Result<ReportBody, DecodeError> {
        Ok(match envelope.payload()? {
            Payload::ReceptionData(rd) => ReportBody::Reception {
                gnss_id: rd.gnss_id,
                sv: rd.gnss_sv,
                db: rd.db,
                el: rd.el,
                azi: rd.azi,
            },
            Payload::GalileoInav(nav) => ReportBody::Galileo {
                gnss_id: nav.gnss_id,
                sv: nav.gnss_sv,
                tow: nav.gnss_tow,
                word: self.galileo.decode(nav.gnss_sv, &nav.contents)?,
            },
            Payload::GpsInav(nav) => ReportBody::Gps(gps::decode(nav.gnss_sv, &nav.contents)?),
            Payload::BeidouInavD1(nav) => {
                ReportBody::BeidouD1(beidou::decode_d1(nav.gnss_sv, &nav.contents)?)
            },
            Payload::BeidouInavD2(nav) => {
                ReportBody::BeidouD2(beidou::decode_d2(nav.gnss_sv, &nav.contents)?)
            },
            Payload::ObserverPosition(_) => ReportBody::Position,
            Payload::RfData(rfd) => ReportBody::Rf {
                gnss_id: rfd.gnss_id,
                sv: rfd.gnss_sv,
            },
            Payload::Unknown(kind) => ReportBody::Unknown { kind },
        })
    }
}
