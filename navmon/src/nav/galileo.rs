//! Galileo I/NAV words.
//!
//! Unlike GPS and BeiDou, Galileo decoding keeps state: almanac fields are
//! spread over words 7 to 10, so every satellite gets an accumulator that
//! lives as long as the decoder.

use std::collections::HashMap;

use log::trace;

use crate::{
    bits::{get_bits, get_bits_signed, set_bits},
    constants::{GALILEO_INAV_WORD_LEN, GALILEO_MAX_SV, GALILEO_PAGE_PAIR_LEN, GALILEO_T0A_SCALE},
    error::DecodeError,
    nav::ephemeris_age,
};

/// Brings a navigation payload into the 128-bit word layout.
///
/// A 16 byte payload already is a word. A 32 byte payload is an even/odd page
/// pair as sent by the receiver: 112 data bits follow the even page's
/// even/odd and page type bits, the last 16 follow the same two bits of the
/// odd page.
pub fn condense(contents: &[u8]) -> Result<[u8; GALILEO_INAV_WORD_LEN], DecodeError> {
    let mut word = [0u8; GALILEO_INAV_WORD_LEN];
    if contents.len() >= GALILEO_PAGE_PAIR_LEN {
        for i in 0..14 {
            set_bits(&mut word, i * 8, 8, get_bits(contents, 2 + i * 8, 8));
        }
        set_bits(&mut word, 112, 16, get_bits(contents, 130, 16));
    } else if contents.len() >= GALILEO_INAV_WORD_LEN {
        word.copy_from_slice(&contents[..GALILEO_INAV_WORD_LEN]);
    } else {
        return Err(DecodeError::InvalidPayloadLen {
            payload: "GalileoInav",
            expect: GALILEO_INAV_WORD_LEN,
            got: contents.len(),
        });
    }
    Ok(word)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GalileoAlmanacEntry {
    /// Zero when the slot carries no almanac
    pub svid: u8,
    pub af0: i16,
    pub af1: i16,
    pub e5b_hs: u8,
    pub e1b_hs: u8,
}

/// Fields gathered from the words of one satellite.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GalileoAccumulator {
    pub wn: u16,
    pub tow: u32,
    pub iodnav: u16,
    /// Ephemeris reference time (s)
    pub t0e: u32,
    pub sisa: u8,
    pub svid: u8,
    /// Clock reference time (s)
    pub t0c: u32,
    pub af0: i32,
    pub af1: i32,
    pub af2: i8,
    pub e5b_hs: u8,
    pub e1b_hs: u8,

    pub iod_a: u8,
    pub wn_a: u8,
    /// Almanac reference time, units of 600 s
    pub t0almanac: u16,
    pub almanac: [GalileoAlmanacEntry; 3],
}

impl GalileoAccumulator {
    /// Stores the fields of `word` and returns its word type.
    pub fn parse(&mut self, word: &[u8; GALILEO_INAV_WORD_LEN]) -> u8 {
        let word_type = get_bits(word, 0, 6) as u8;
        match word_type {
            0 => {
                if get_bits(word, 6, 2) == 2 {
                    self.wn = get_bits(word, 96, 12) as u16;
                    self.tow = get_bits(word, 108, 20);
                }
            },
            1 => {
                self.iodnav = get_bits(word, 6, 10) as u16;
                self.t0e = get_bits(word, 16, 14) * 60;
            },
            3 => {
                self.iodnav = get_bits(word, 6, 10) as u16;
                self.sisa = get_bits(word, 120, 8) as u8;
            },
            4 => {
                self.iodnav = get_bits(word, 6, 10) as u16;
                self.svid = get_bits(word, 16, 6) as u8;
                self.t0c = get_bits(word, 54, 14) * 60;
                self.af0 = get_bits_signed(word, 68, 31);
                self.af1 = get_bits_signed(word, 99, 21);
                self.af2 = get_bits_signed(word, 120, 6) as i8;
            },
            5 => {
                self.e5b_hs = get_bits(word, 67, 2) as u8;
                self.e1b_hs = get_bits(word, 69, 2) as u8;
                self.wn = get_bits(word, 73, 12) as u16;
                self.tow = get_bits(word, 85, 20);
            },
            6 => {
                self.tow = get_bits(word, 105, 20);
            },
            7 => {
                self.iod_a = get_bits(word, 6, 4) as u8;
                self.wn_a = get_bits(word, 10, 2) as u8;
                self.t0almanac = get_bits(word, 12, 10) as u16;
                self.almanac[0].svid = get_bits(word, 22, 6) as u8;
            },
            8 => {
                self.almanac[0].read_clock(word, 10);
                self.almanac[1].svid = get_bits(word, 43, 6) as u8;
            },
            9 => {
                self.almanac[1].read_clock(word, 38);
                self.almanac[2].svid = get_bits(word, 71, 6) as u8;
            },
            10 => {
                self.almanac[2].read_clock(word, 53);
            },
            _ => {},
        }
        word_type
    }
}

impl GalileoAlmanacEntry {
    // af0 (16), af1 (13), E5b HS (2), E1-B HS (2)
    fn read_clock(&mut self, word: &[u8], pos: usize) {
        self.af0 = get_bits_signed(word, pos, 16) as i16;
        self.af1 = get_bits_signed(word, pos + 16, 13) as i16;
        self.e5b_hs = get_bits(word, pos + 29, 2) as u8;
        self.e1b_hs = get_bits(word, pos + 31, 2) as u8;
    }
}

/// Which time of week the almanac age of word 7 is computed against.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TowTracking {
    /// The last time of week seen on any satellite
    #[default]
    Shared,
    /// The last time of week seen on the satellite sending word 7
    PerSatellite,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GalileoDetail {
    None,
    /// Word 4
    Clock {
        af0: i32,
        af1: i32,
        af0_scaled: f64,
        af1_scaled: f64,
    },
    /// Word 7
    AlmanacReference {
        t0a: u16,
        first_svid: u8,
        /// Age of t0a (s)
        age: i32,
    },
    /// Words 8 to 10, when the slot is populated
    AlmanacClock(GalileoAlmanacEntry),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GalileoWord {
    pub word_type: u8,
    pub detail: GalileoDetail,
}

/// Galileo decoder, owning the accumulator of every satellite it has seen.
#[derive(Debug, Default, Clone)]
pub struct GalileoDecoder {
    accumulators: HashMap<u32, GalileoAccumulator>,
    tow_tracking: TowTracking,
    last_tow: u32,
    last_tow_by_sv: HashMap<u32, u32>,
}

impl GalileoDecoder {
    pub fn new(tow_tracking: TowTracking) -> Self {
        Self {
            tow_tracking,
            ..Default::default()
        }
    }

    pub fn accumulator(&self, sv: u32) -> Option<&GalileoAccumulator> {
        self.accumulators.get(&sv)
    }

    /// Time of week word 7 of `sv` would currently be aged against.
    pub fn last_tow(&self, sv: u32) -> u32 {
        match self.tow_tracking {
            TowTracking::Shared => self.last_tow,
            TowTracking::PerSatellite => self.last_tow_by_sv.get(&sv).copied().unwrap_or(0),
        }
    }

    /// Decodes one word of satellite `sv`, which must be in `1..=36`.
    pub fn decode(&mut self, sv: u32, contents: &[u8]) -> Result<GalileoWord, DecodeError> {
        if !(1..=GALILEO_MAX_SV).contains(&sv) {
            return Err(DecodeError::InvalidSatellite {
                constellation: "Galileo",
                sv,
            });
        }
        let word = condense(contents)?;
        let acc = self.accumulators.entry(sv).or_default();
        let word_type = acc.parse(&word);
        trace!("galileo sv {} word {}", sv, word_type);

        let detail = if word_type == 4 {
            GalileoDetail::Clock {
                af0: acc.af0,
                af1: acc.af1,
                af0_scaled: f64::from(acc.af0) * 2f64.powi(19 - 34),
                af1_scaled: f64::from(acc.af1) * 2f64.powi(38 - 46),
            }
        } else {
            GalileoDetail::None
        };

        if matches!(word_type, 0 | 5 | 6) {
            match self.tow_tracking {
                TowTracking::Shared => self.last_tow = acc.tow,
                TowTracking::PerSatellite => {
                    self.last_tow_by_sv.insert(sv, acc.tow);
                },
            }
        }

        // ephemeris and clock words stand alone
        if word_type < 7 {
            *acc = GalileoAccumulator::default();
            return Ok(GalileoWord { word_type, detail });
        }

        let t0a = acc.t0almanac;
        let almanac = acc.almanac;
        let detail = match word_type {
            7 => GalileoDetail::AlmanacReference {
                t0a,
                first_svid: almanac[0].svid,
                age: ephemeris_age(u32::from(t0a) * GALILEO_T0A_SCALE, self.last_tow(sv)),
            },
            8..=10 => {
                let entry = almanac[usize::from(word_type - 8)];
                if entry.svid > 0 {
                    GalileoDetail::AlmanacClock(entry)
                } else {
                    GalileoDetail::None
                }
            },
            _ => detail,
        };

        Ok(GalileoWord { word_type, detail })
    }
}
