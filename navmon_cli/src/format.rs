//! One line per report, in the spirit of the classic navdump output.

use std::fmt::Write;

use chrono::DateTime;
use navmon::{
    accuracy::human_ura,
    nav::{
        beidou::{BeidouDetail, BeidouReport},
        galileo::GalileoDetail,
        gps::GpsDetail,
    },
    DecodedReport, ReportBody,
};

fn human_time(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|t| t.format("%a, %d %b %Y %T %z").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn text_line(report: &DecodedReport) -> String {
    let mut line = format!(
        "{} {} src {} ",
        human_time(report.local_utc_seconds),
        report.local_utc_nanoseconds,
        report.source_id
    );
    // writing to a String cannot fail
    let _ = write_body(&mut line, &report.body);
    line
}

fn write_body(out: &mut String, body: &ReportBody) -> std::fmt::Result {
    match body {
        ReportBody::Reception {
            gnss_id,
            sv,
            db,
            el,
            azi,
        } => write!(
            out,
            "receptiondata for {},{}, db {} ele {} azi {}",
            gnss_id, sv, db, el, azi
        ),
        ReportBody::Galileo {
            gnss_id,
            sv,
            tow,
            word,
        } => {
            write!(
                out,
                "gal inav for {},{} tow {} wtype {}",
                gnss_id, sv, tow, word.word_type
            )?;
            match &word.detail {
                GalileoDetail::None => Ok(()),
                GalileoDetail::Clock {
                    af0,
                    af1,
                    af0_scaled,
                    af1_scaled,
                } => write!(
                    out,
                    " af0 {} af1 {}, scaled: {}, {}",
                    af0, af1, af0_scaled, af1_scaled
                ),
                GalileoDetail::AlmanacReference {
                    t0a,
                    first_svid,
                    age,
                } => write!(
                    out,
                    " t0a {}, alma sv1 {}, t0a age: {}",
                    t0a, first_svid, age
                ),
                GalileoDetail::AlmanacClock(entry) => write!(
                    out,
                    " {} af0 {} af1 {} e5bhs {} e1bhs {}",
                    entry.svid, entry.af0, entry.af1, entry.e5b_hs, entry.e1b_hs
                ),
            }
        },
        ReportBody::Gps(gps) => {
            write!(out, "GPS {}: {}", gps.sv, gps.tow)?;
            match &gps.detail {
                GpsDetail::Health {
                    gps_health,
                    week_number,
                    ura,
                    ..
                } => write!(
                    out,
                    " gpshealth = {}, wn {}, ura {}",
                    gps_health,
                    week_number,
                    human_ura(*ura)
                ),
                GpsDetail::Ephemeris { t0e, age } => write!(out, " t0e = {} {}", t0e, age),
                GpsDetail::TowOnly => Ok(()),
            }
        },
        ReportBody::BeidouD1(report) => write_beidou_d1(out, report),
        ReportBody::BeidouD2(report) => write!(
            out,
            "BeiDou {} D2: {}, FraID {}",
            report.sv, report.sow, report.fra_id
        ),
        ReportBody::Position => out.write_str("ECEF"),
        ReportBody::Rf { gnss_id, sv } => write!(out, "RFdata for {},{}", gnss_id, sv),
        ReportBody::Unknown { kind } => write!(out, "Unknown type {}", kind),
        ReportBody::Malformed { kind, reason } => {
            write!(out, "malformed type {}: {}", kind, reason)
        },
        ReportBody::Unparseable { reason } => write!(out, "unparseable frame: {}", reason),
    }
}

fn write_beidou_d1(out: &mut String, report: &BeidouReport) -> std::fmt::Result {
    write!(
        out,
        "BeiDou {}: {}, FraID {}",
        report.sv, report.sow, report.fra_id
    )?;
    match &report.detail {
        BeidouDetail::None => Ok(()),
        BeidouDetail::Clock { clock, .. } => write!(
            out,
            " wn {} t0c {} aodc {} aode {} sath1 {} urai {} ({}) af0 {} af1 {}",
            clock.week_number,
            clock.t0c,
            clock.aodc,
            clock.aode,
            clock.sat_h1,
            clock.urai,
            human_ura(clock.urai),
            clock.a0,
            clock.a1
        ),
        BeidouDetail::AlmanacEpoch { page, am_ep_id } => {
            write!(out, " pageno {} AmEpID {}", page, am_ep_id)
        },
        BeidouDetail::Health {
            page,
            entries,
            extras,
        } => {
            write!(out, " pageno {}", page)?;
            for field in extras {
                write!(out, " {} {}", field.name, field.value)?;
            }
            for entry in entries {
                write!(out, " hea{} {} ({})", entry.sv, entry.code, entry.health)?;
            }
            Ok(())
        },
    }
}
