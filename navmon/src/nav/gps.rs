//! GPS L1 C/A LNAV subframes.
//!
//! Decoding is stateless: every subframe is interpreted on its own.

use std::collections::BTreeMap;

use crate::{
    accuracy,
    bits::{get_bits, get_bits_signed, set_bits},
    constants::{GPS_CONDENSED_LEN, GPS_RAW_LEN},
    error::DecodeError,
    nav::ephemeris_age,
};

const GPS_WORD_COUNT: usize = 10;
const GPS_DATA_BITS: usize = 24;
const GPS_PARITY_BITS: u32 = 6;

/// Strips padding and parity from the 10 receiver words, keeping the 24 data
/// bits of each (word `w` ends up at bit `24 * w`).
pub fn condense(raw: &[u8]) -> Result<[u8; GPS_CONDENSED_LEN], DecodeError> {
    if raw.len() < GPS_RAW_LEN {
        return Err(DecodeError::InvalidPayloadLen {
            payload: "GpsInav",
            expect: GPS_RAW_LEN,
            got: raw.len(),
        });
    }

    let mut out = [0u8; GPS_CONDENSED_LEN];
    for (w, word) in raw.chunks_exact(4).take(GPS_WORD_COUNT).enumerate() {
        let dword = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        let data = (dword >> GPS_PARITY_BITS) & 0x00ff_ffff;
        set_bits(&mut out, w * GPS_DATA_BITS, GPS_DATA_BITS, data);
    }
    Ok(out)
}

/// Ephemeris terms sharing one issue of data (subframes 2 and 3).
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GpsEphemeris {
    /// Reference time (s)
    pub t0e: u32,
    pub crs: i16,
    pub delta_n: i16,
    pub m0: i32,
    pub cuc: i16,
    pub e: u32,
    pub cus: i16,
    pub sqrt_a: u32,
    pub fit_interval: bool,
    pub aodo: u8,

    pub cic: i16,
    pub omega0: i32,
    pub cis: i16,
    pub i0: i32,
    pub crc: i16,
    pub omega: i32,
    pub omega_dot: i32,
    pub idot: i16,
}

/// Everything one subframe can tell about a satellite.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GpsFrame {
    /// Time of week of the next subframe (s)
    pub tow: u32,
    pub gps_health: u8,
    /// 10-bit week counter
    pub week_number: u16,
    pub ura: u8,
    pub l2_codes: u8,
    pub iodc: u16,
    pub tgd: i8,
    /// Clock reference time (s)
    pub t0c: u32,
    pub af0: i32,
    pub af1: i16,
    pub af2: i8,
    /// Ephemeris by IODE
    pub iods: BTreeMap<u8, GpsEphemeris>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpsSubframe {
    /// Subframe id, 1 to 5
    pub frame: u8,
    /// Page (SV) id for subframes 4 and 5, zero otherwise
    pub page: u8,
    pub state: GpsFrame,
}

/// Parses a condensed subframe.
pub fn parse(cond: &[u8; GPS_CONDENSED_LEN]) -> GpsSubframe {
    let mut state = GpsFrame {
        tow: get_bits(cond, 24, 17) * 6,
        ..Default::default()
    };
    let frame = get_bits(cond, 43, 3) as u8;
    let mut page = 0;

    match frame {
        1 => {
            state.week_number = get_bits(cond, 48, 10) as u16;
            state.l2_codes = get_bits(cond, 58, 2) as u8;
            state.ura = get_bits(cond, 60, 4) as u8;
            state.gps_health = get_bits(cond, 64, 6) as u8;
            state.iodc = ((get_bits(cond, 70, 2) << 8) | get_bits(cond, 168, 8)) as u16;
            state.tgd = get_bits_signed(cond, 160, 8) as i8;
            state.t0c = get_bits(cond, 176, 16) * 16;
            state.af2 = get_bits_signed(cond, 192, 8) as i8;
            state.af1 = get_bits_signed(cond, 200, 16) as i16;
            state.af0 = get_bits_signed(cond, 216, 22);
        },
        2 => {
            let iode = get_bits(cond, 48, 8) as u8;
            let eph = state.iods.entry(iode).or_default();
            eph.crs = get_bits_signed(cond, 56, 16) as i16;
            eph.delta_n = get_bits_signed(cond, 72, 16) as i16;
            eph.m0 = get_bits_signed(cond, 88, 32);
            eph.cuc = get_bits_signed(cond, 120, 16) as i16;
            eph.e = get_bits(cond, 136, 32);
            eph.cus = get_bits_signed(cond, 168, 16) as i16;
            eph.sqrt_a = get_bits(cond, 184, 32);
            eph.t0e = get_bits(cond, 216, 16) * 16;
            eph.fit_interval = get_bits(cond, 232, 1) == 1;
            eph.aodo = get_bits(cond, 233, 5) as u8;
        },
        3 => {
            let iode = get_bits(cond, 216, 8) as u8;
            let eph = state.iods.entry(iode).or_default();
            eph.cic = get_bits_signed(cond, 48, 16) as i16;
            eph.omega0 = get_bits_signed(cond, 64, 32);
            eph.cis = get_bits_signed(cond, 96, 16) as i16;
            eph.i0 = get_bits_signed(cond, 112, 32);
            eph.crc = get_bits_signed(cond, 144, 16) as i16;
            eph.omega = get_bits_signed(cond, 160, 32);
            eph.omega_dot = get_bits_signed(cond, 192, 24);
            eph.idot = get_bits_signed(cond, 224, 14) as i16;
        },
        4 | 5 => {
            page = get_bits(cond, 50, 6) as u8;
        },
        _ => {},
    }

    GpsSubframe { frame, page, state }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GpsDetail {
    /// Subframe 1
    Health {
        gps_health: u8,
        week_number: u16,
        ura: u8,
        /// URA in meters, `None` when not available
        ura_m: Option<f64>,
    },
    /// Subframe 2
    Ephemeris { t0e: u32, age: i32 },
    TowOnly,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GpsReport {
    pub sv: u32,
    pub tow: u32,
    pub frame: u8,
    pub page: u8,
    pub detail: GpsDetail,
}

pub fn decode(sv: u32, contents: &[u8]) -> Result<GpsReport, DecodeError> {
    let cond = condense(contents)?;
    let GpsSubframe { frame, page, state } = parse(&cond);

    let detail = match frame {
        1 => GpsDetail::Health {
            gps_health: state.gps_health,
            week_number: state.week_number,
            ura: state.ura,
            ura_m: accuracy::num_ura(state.ura),
        },
        2 => match state.iods.values().next() {
            Some(eph) => GpsDetail::Ephemeris {
                t0e: eph.t0e,
                age: ephemeris_age(eph.t0e, state.tow),
            },
            None => GpsDetail::TowOnly,
        },
        _ => GpsDetail::TowOnly,
    };

    Ok(GpsReport {
        sv,
        tow: state.tow,
        frame,
        page,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expands a condensed subframe back into receiver words, with padding
    /// and parity bits set so that condensing has something to strip.
    fn raw_words(cond: &[u8; GPS_CONDENSED_LEN]) -> Vec<u8> {
        let mut raw = Vec::with_capacity(GPS_RAW_LEN);
        for w in 0..GPS_WORD_COUNT {
            let data = get_bits(cond, w * GPS_DATA_BITS, GPS_DATA_BITS);
            let dword = (0b10 << 30) | (data << 6) | 0x2a;
            raw.extend_from_slice(&dword.to_be_bytes());
        }
        raw
    }

    fn subframe(id: u32, tow_count: u32) -> [u8; GPS_CONDENSED_LEN] {
        let mut cond = [0u8; GPS_CONDENSED_LEN];
        set_bits(&mut cond, 0, 8, 0x8b);
        set_bits(&mut cond, 24, 17, tow_count);
        set_bits(&mut cond, 43, 3, id);
        cond
    }

    #[test]
    fn condense_strips_padding_and_parity() {
        let mut cond = [0u8; GPS_CONDENSED_LEN];
        for (i, b) in cond.iter_mut().enumerate() {
            *b = i as u8 * 7 + 1;
        }
        assert_eq!(condense(&raw_words(&cond)).unwrap(), cond);
    }

    #[test]
    fn short_payload() {
        assert_eq!(
            condense(&[0; 39]),
            Err(DecodeError::InvalidPayloadLen {
                payload: "GpsInav",
                expect: 40,
                got: 39
            })
        );
    }

    #[test]
    fn subframe1_health() {
        let mut cond = subframe(1, 10_000);
        set_bits(&mut cond, 48, 10, 123);
        set_bits(&mut cond, 60, 4, 2);
        set_bits(&mut cond, 64, 6, 0b100001);
        set_bits(&mut cond, 70, 2, 0b01);
        set_bits(&mut cond, 168, 8, 0x22);
        set_bits(&mut cond, 176, 16, 4500);
        set_bits(&mut cond, 216, 22, 0x3f_ffff);

        let parsed = parse(&cond);
        assert_eq!(parsed.frame, 1);
        assert_eq!(parsed.state.tow, 60_000);
        assert_eq!(parsed.state.iodc, 0x122);
        assert_eq!(parsed.state.t0c, 72_000);
        assert_eq!(parsed.state.af0, -1);

        let report = decode(17, &raw_words(&cond)).unwrap();
        assert_eq!(report.sv, 17);
        assert_eq!(report.tow, 60_000);
        assert_eq!(
            report.detail,
            GpsDetail::Health {
                gps_health: 0b100001,
                week_number: 123,
                ura: 2,
                ura_m: Some(4.0),
            }
        );
    }

    #[test]
    fn subframe2_ephemeris_age() {
        let mut cond = subframe(2, 100);
        set_bits(&mut cond, 48, 8, 77);
        set_bits(&mut cond, 216, 16, 30);
        set_bits(&mut cond, 232, 1, 1);

        let parsed = parse(&cond);
        let eph = &parsed.state.iods[&77];
        assert_eq!(eph.t0e, 480);
        assert!(eph.fit_interval);

        let report = decode(5, &raw_words(&cond)).unwrap();
        assert_eq!(report.tow, 600);
        assert_eq!(report.detail, GpsDetail::Ephemeris { t0e: 480, age: 120 });
    }

    #[test]
    fn subframe3_shares_iode() {
        let mut cond = subframe(3, 101);
        set_bits(&mut cond, 216, 8, 77);
        set_bits(&mut cond, 224, 14, 0x2000);

        let parsed = parse(&cond);
        assert_eq!(parsed.state.iods[&77].idot, -8192);
        assert_eq!(
            decode(5, &raw_words(&cond)).unwrap().detail,
            GpsDetail::TowOnly
        );
    }

    #[test]
    fn almanac_subframes_report_page() {
        let mut cond = subframe(5, 102);
        set_bits(&mut cond, 48, 2, 1);
        set_bits(&mut cond, 50, 6, 25);

        let report = decode(9, &raw_words(&cond)).unwrap();
        assert_eq!(report.frame, 5);
        assert_eq!(report.page, 25);
        assert_eq!(report.tow, 612);
        assert_eq!(report.detail, GpsDetail::TowOnly);
    }
}
