//! BeiDou D1 and D2 navigation message subframes.
//!
//! Field positions are kept as ICD bit numbers (1-based, counting parity
//! bits) and translated with [`bit_conv`] when reading the condensed buffer.

use std::{fmt, ops::RangeInclusive};

use bitflags::bitflags;

use crate::{
    accuracy,
    bits::{get_bits, get_bits_signed, set_bits},
    constants::{BEIDOU_CONDENSED_LEN, BEIDOU_RAW_LEN},
    error::DecodeError,
};

const BEIDOU_WORD_COUNT: usize = 10;
const FIRST_WORD_INFO_BITS: usize = 26;
const WORD_INFO_BITS: usize = 22;

/// Keeps the information bits of the 10 receiver words: 26 of word 1, then 22
/// of each following word, dropping padding and parity.
pub fn condense(raw: &[u8]) -> Result<[u8; BEIDOU_CONDENSED_LEN], DecodeError> {
    if raw.len() < BEIDOU_RAW_LEN {
        return Err(DecodeError::InvalidPayloadLen {
            payload: "BeidouInav",
            expect: BEIDOU_RAW_LEN,
            got: raw.len(),
        });
    }

    let mut out = [0u8; BEIDOU_CONDENSED_LEN];
    let mut pos = 0;
    for (w, word) in raw.chunks_exact(4).take(BEIDOU_WORD_COUNT).enumerate() {
        let dword = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        // 2 padding bits, then the 30 bit word
        let info_bits = if w == 0 {
            FIRST_WORD_INFO_BITS
        } else {
            WORD_INFO_BITS
        };
        let info = (dword >> (30 - info_bits)) & ((1 << info_bits) - 1);
        set_bits(&mut out, pos, info_bits, info);
        pos += info_bits;
    }
    Ok(out)
}

/// Offset in the condensed buffer of 1-based ICD bit `icd_bit`.
pub const fn bit_conv(icd_bit: usize) -> usize {
    let word = icd_bit / 30;
    if word == 0 {
        icd_bit - 1
    } else {
        icd_bit - 1 - 4 - (word - 1) * 8
    }
}

/// One field of the subframe layout, as the ICD numbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcdField {
    pub name: &'static str,
    pub icd_bit: usize,
    pub width: usize,
    pub signed: bool,
}

impl IcdField {
    const fn unsigned(name: &'static str, icd_bit: usize, width: usize) -> Self {
        Self {
            name,
            icd_bit,
            width,
            signed: false,
        }
    }

    const fn signed(name: &'static str, icd_bit: usize, width: usize) -> Self {
        Self {
            name,
            icd_bit,
            width,
            signed: true,
        }
    }

    pub const fn offset(&self) -> usize {
        bit_conv(self.icd_bit)
    }

    /// Reads the field, sign extended when the ICD defines it as two's
    /// complement. No field is wider than 24 bits.
    pub fn read(&self, cond: &[u8]) -> i32 {
        if self.signed {
            get_bits_signed(cond, self.offset(), self.width)
        } else {
            get_bits(cond, self.offset(), self.width) as i32
        }
    }
}

pub const FRA_ID: IcdField = IcdField::unsigned("FraID", 16, 3);
pub const SOW: IcdField = IcdField::unsigned("SOW", 19, 20);
pub const PNUM: IcdField = IcdField::unsigned("Pnum", 44, 7);

pub const SAT_H1: IcdField = IcdField::unsigned("SatH1", 43, 1);
pub const AODC: IcdField = IcdField::unsigned("AODC", 44, 5);
pub const URAI: IcdField = IcdField::unsigned("URAI", 49, 4);
pub const WN: IcdField = IcdField::unsigned("WN", 61, 13);
pub const T0C: IcdField = IcdField::unsigned("t0c", 74, 17);
pub const TGD1: IcdField = IcdField::signed("TGD1", 99, 10);
pub const A2: IcdField = IcdField::signed("a2", 215, 11);
pub const A0: IcdField = IcdField::signed("a0", 226, 24);
pub const A1: IcdField = IcdField::signed("a1", 258, 22);
pub const AODE: IcdField = IcdField::unsigned("AODE", 288, 5);

pub const AM_EP_ID: IcdField = IcdField::unsigned("AmEpID", 291, 2);
pub const WN_A: IcdField = IcdField::unsigned("WNa", 190, 8);
pub const T0A: IcdField = IcdField::unsigned("t0a", 198, 8);
pub const AM_ID: IcdField = IcdField::unsigned("AmID", 216, 2);

/// ICD bit of the first 9-bit health entry in subframe 5.
const HEALTH_ICD_BIT: usize = 51;
const HEALTH_WIDTH: usize = 9;

/// What a subframe 4/5 page carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageContent {
    AlmanacEpoch,
    Health {
        first_sv: u8,
        count: u8,
        extras: &'static [IcdField],
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRule {
    pub fra_id: u8,
    pub pages: RangeInclusive<u8>,
    pub content: PageContent,
}

/// D1 subframe 4/5 pages and their contents, first match wins.
pub fn page_rules() -> [PageRule; 5] {
    [
        PageRule {
            fra_id: 4,
            pages: 1..=24,
            content: PageContent::AlmanacEpoch,
        },
        PageRule {
            fra_id: 5,
            pages: 1..=6,
            content: PageContent::AlmanacEpoch,
        },
        PageRule {
            fra_id: 5,
            pages: 7..=7,
            content: PageContent::Health {
                first_sv: 1,
                count: 19,
                extras: &[],
            },
        },
        PageRule {
            fra_id: 5,
            pages: 8..=8,
            content: PageContent::Health {
                first_sv: 20,
                count: 10,
                extras: &[WN_A, T0A],
            },
        },
        PageRule {
            fra_id: 5,
            pages: 24..=24,
            content: PageContent::Health {
                first_sv: 31,
                count: 14,
                extras: &[AM_ID],
            },
        },
    ]
}

fn page_content(fra_id: u8, page: u8) -> Option<PageContent> {
    page_rules()
        .into_iter()
        .find(|rule| rule.fra_id == fra_id && rule.pages.contains(&page))
        .map(|rule| rule.content)
}

bitflags! {
    /// Abnormal signal flags of a 9-bit health entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct BeidouHealthFlags: u16 {
        const B1I_ABNORMAL = 1 << 7;
        const B2I_ABNORMAL = 1 << 6;
        const B3I_ABNORMAL = 1 << 5;
        const NAVIGATION_ABNORMAL = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BeidouHealth {
    NoClock,
    NoSatellite,
    Ok,
    Abnormal(BeidouHealthFlags),
}

impl BeidouHealth {
    pub fn from_code(code: u16) -> Self {
        match code {
            256 => BeidouHealth::NoClock,
            511 => BeidouHealth::NoSatellite,
            _ => {
                let flags = BeidouHealthFlags::from_bits_truncate(code);
                if flags.is_empty() {
                    BeidouHealth::Ok
                } else {
                    BeidouHealth::Abnormal(flags)
                }
            },
        }
    }
}

impl fmt::Display for BeidouHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = match self {
            BeidouHealth::NoClock => return f.write_str("no clock"),
            BeidouHealth::NoSatellite => return f.write_str("no satellite"),
            BeidouHealth::Ok => return f.write_str("ok"),
            BeidouHealth::Abnormal(flags) => flags,
        };
        let names = [
            (BeidouHealthFlags::B1I_ABNORMAL, "B1I abnormal"),
            (BeidouHealthFlags::B2I_ABNORMAL, "B2I abnormal"),
            (BeidouHealthFlags::B3I_ABNORMAL, "B3I abnormal"),
            (BeidouHealthFlags::NAVIGATION_ABNORMAL, "navigation abnormal"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if flags.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Text classification of a 9-bit health entry.
pub fn health_of(code: u16) -> String {
    BeidouHealth::from_code(code).to_string()
}

/// Frame 1 clock and accuracy terms.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BeidouClock {
    pub week_number: u16,
    /// Clock reference time (s)
    pub t0c: u32,
    pub aodc: u8,
    pub aode: u8,
    pub sat_h1: u8,
    pub urai: u8,
    pub tgd1: i16,
    pub a0: i32,
    pub a1: i32,
    pub a2: i16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BeidouFrame {
    pub fra_id: u8,
    pub sow: u32,
    /// Page number of subframes 4 and 5, zero otherwise
    pub page: u8,
    /// Populated for subframe 1
    pub clock: Option<BeidouClock>,
}

/// Parses the header of any subframe and the clock terms of subframe 1.
pub fn parse(cond: &[u8; BEIDOU_CONDENSED_LEN]) -> BeidouFrame {
    let fra_id = FRA_ID.read(cond) as u8;
    let sow = SOW.read(cond) as u32;
    let page = match fra_id {
        4 | 5 => PNUM.read(cond) as u8,
        _ => 0,
    };
    let clock = (fra_id == 1).then(|| BeidouClock {
        week_number: WN.read(cond) as u16,
        t0c: T0C.read(cond) as u32 * 8,
        aodc: AODC.read(cond) as u8,
        aode: AODE.read(cond) as u8,
        sat_h1: SAT_H1.read(cond) as u8,
        urai: URAI.read(cond) as u8,
        tgd1: TGD1.read(cond) as i16,
        a0: A0.read(cond),
        a1: A1.read(cond),
        a2: A2.read(cond) as i16,
    });

    BeidouFrame {
        fra_id,
        sow,
        page,
        clock,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HealthEntry {
    pub sv: u8,
    pub code: u16,
    pub health: BeidouHealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NamedField {
    pub name: &'static str,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BeidouDetail {
    None,
    Clock {
        clock: BeidouClock,
        /// URAI in meters, `None` when not available
        urai_m: Option<f64>,
    },
    AlmanacEpoch {
        page: u8,
        am_ep_id: u8,
    },
    Health {
        page: u8,
        entries: Vec<HealthEntry>,
        extras: Vec<NamedField>,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BeidouReport {
    pub sv: u32,
    pub sow: u32,
    pub fra_id: u8,
    pub detail: BeidouDetail,
}

pub fn decode_d1(sv: u32, contents: &[u8]) -> Result<BeidouReport, DecodeError> {
    let cond = condense(contents)?;
    let frame = parse(&cond);

    let detail = if let Some(clock) = frame.clock {
        BeidouDetail::Clock {
            urai_m: accuracy::num_ura(clock.urai),
            clock,
        }
    } else {
        match page_content(frame.fra_id, frame.page) {
            Some(PageContent::AlmanacEpoch) => BeidouDetail::AlmanacEpoch {
                page: frame.page,
                am_ep_id: AM_EP_ID.read(&cond) as u8,
            },
            Some(PageContent::Health {
                first_sv,
                count,
                extras,
            }) => BeidouDetail::Health {
                page: frame.page,
                entries: health_entries(&cond, first_sv, count),
                extras: extras
                    .iter()
                    .map(|field| NamedField {
                        name: field.name,
                        value: field.read(&cond) as u32,
                    })
                    .collect(),
            },
            None => BeidouDetail::None,
        }
    };

    Ok(BeidouReport {
        sv,
        sow: frame.sow,
        fra_id: frame.fra_id,
        detail,
    })
}

fn health_entries(cond: &[u8], first_sv: u8, count: u8) -> Vec<HealthEntry> {
    let start = bit_conv(HEALTH_ICD_BIT);
    (0..count)
        .map(|n| {
            let code = get_bits(cond, start + usize::from(n) * HEALTH_WIDTH, HEALTH_WIDTH) as u16;
            HealthEntry {
                sv: first_sv + n,
                code,
                health: BeidouHealth::from_code(code),
            }
        })
        .collect()
}

/// D2 subframes are only identified, not decoded further.
pub fn decode_d2(sv: u32, contents: &[u8]) -> Result<BeidouReport, DecodeError> {
    let cond = condense(contents)?;
    Ok(BeidouReport {
        sv,
        sow: SOW.read(&cond) as u32,
        fra_id: FRA_ID.read(&cond) as u8,
        detail: BeidouDetail::None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(cond: &mut [u8], field: IcdField, value: i32) {
        set_bits(cond, field.offset(), field.width, value as u32);
    }

    /// Expands condensed bits into receiver words with padding and parity set.
    fn raw_words(cond: &[u8; BEIDOU_CONDENSED_LEN]) -> Vec<u8> {
        let mut raw = Vec::with_capacity(BEIDOU_RAW_LEN);
        let mut pos = 0;
        for w in 0..BEIDOU_WORD_COUNT {
            let bits = if w == 0 {
                FIRST_WORD_INFO_BITS
            } else {
                WORD_INFO_BITS
            };
            let info = get_bits(cond, pos, bits);
            pos += bits;
            let parity = (1u32 << (30 - bits)) - 1;
            let dword = (0b11 << 30) | (info << (30 - bits)) | parity;
            raw.extend_from_slice(&dword.to_be_bytes());
        }
        raw
    }

    fn subframe(fra_id: i32, sow: i32) -> [u8; BEIDOU_CONDENSED_LEN] {
        let mut cond = [0u8; BEIDOU_CONDENSED_LEN];
        set_bits(&mut cond, 0, 11, 0b111_0001_0010);
        write(&mut cond, FRA_ID, fra_id);
        write(&mut cond, SOW, sow);
        cond
    }

    #[test]
    fn bit_conversion() {
        assert_eq!(bit_conv(1), 0);
        assert_eq!(bit_conv(26), 25);
        assert_eq!(bit_conv(31), 26);
        assert_eq!(bit_conv(52), 47);
        assert_eq!(bit_conv(61), 48);
        assert_eq!(bit_conv(291), 222);
    }

    #[test]
    fn fields_fit_the_condensed_buffer() {
        let fields = [
            FRA_ID, SOW, PNUM, SAT_H1, AODC, URAI, WN, T0C, TGD1, A2, A0, A1, AODE, AM_EP_ID, WN_A,
            T0A, AM_ID,
        ];
        for field in fields {
            assert!(
                field.offset() + field.width <= BEIDOU_CONDENSED_LEN * 8,
                "{}",
                field.name
            );
        }
    }

    #[test]
    fn condense_keeps_information_bits() {
        let mut cond = [0u8; BEIDOU_CONDENSED_LEN];
        for (i, b) in cond.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37) ^ 0x5a;
        }
        assert_eq!(condense(&raw_words(&cond)).unwrap(), cond);
        assert!(matches!(
            condense(&[0; 20]),
            Err(DecodeError::InvalidPayloadLen { got: 20, .. })
        ));
    }

    #[test]
    fn sow_spans_words() {
        // 8 bits in word 1, 12 in word 2
        let cond = subframe(1, 0xabcde);
        let frame = parse(&cond);
        assert_eq!(frame.sow, 0xabcde);
        assert_eq!(frame.fra_id, 1);
    }

    #[test]
    fn health_classification() {
        assert_eq!(health_of(256), "no clock");
        assert_eq!(health_of(511), "no satellite");
        assert_eq!(health_of(0), "ok");
        assert_eq!(health_of(0b1), "ok");

        let text = health_of(0b1010_0010);
        assert!(text.contains("B1I abnormal"));
        assert!(text.contains("B3I abnormal"));
        assert!(text.contains("navigation abnormal"));
        assert!(!text.contains("B2I"));
        assert_eq!(text, "B1I abnormal B3I abnormal navigation abnormal");
    }

    #[test]
    fn frame1_clock() {
        let mut cond = subframe(1, 86_400);
        write(&mut cond, SAT_H1, 1);
        write(&mut cond, AODC, 17);
        write(&mut cond, URAI, 3);
        write(&mut cond, WN, 800);
        write(&mut cond, T0C, 10_800);
        write(&mut cond, TGD1, -5);
        write(&mut cond, A0, -1_000_000);
        write(&mut cond, A1, 12_345);
        write(&mut cond, AODE, 30);

        let report = decode_d1(6, &raw_words(&cond)).unwrap();
        assert_eq!(report.sow, 86_400);
        assert_eq!(report.fra_id, 1);
        assert_eq!(
            report.detail,
            BeidouDetail::Clock {
                clock: BeidouClock {
                    week_number: 800,
                    t0c: 86_400,
                    aodc: 17,
                    aode: 30,
                    sat_h1: 1,
                    urai: 3,
                    tgd1: -5,
                    a0: -1_000_000,
                    a1: 12_345,
                    a2: 0,
                },
                urai_m: accuracy::num_ura(3),
            }
        );
    }

    #[test]
    fn almanac_epoch_pages() {
        let mut cond = subframe(4, 12);
        write(&mut cond, PNUM, 24);
        write(&mut cond, AM_EP_ID, 2);
        assert_eq!(
            decode_d1(6, &raw_words(&cond)).unwrap().detail,
            BeidouDetail::AlmanacEpoch {
                page: 24,
                am_ep_id: 2
            }
        );

        let mut cond = subframe(5, 12);
        write(&mut cond, PNUM, 6);
        write(&mut cond, AM_EP_ID, 1);
        assert_eq!(
            decode_d1(6, &raw_words(&cond)).unwrap().detail,
            BeidouDetail::AlmanacEpoch {
                page: 6,
                am_ep_id: 1
            }
        );

        // frame 4 page 25 is outside every rule
        let mut cond = subframe(4, 12);
        write(&mut cond, PNUM, 25);
        assert_eq!(
            decode_d1(6, &raw_words(&cond)).unwrap().detail,
            BeidouDetail::None
        );
    }

    #[test]
    fn health_page_7() {
        let mut cond = subframe(5, 30);
        write(&mut cond, PNUM, 7);
        let start = bit_conv(HEALTH_ICD_BIT);
        set_bits(&mut cond, start, 9, 256);
        set_bits(&mut cond, start + 9 * 18, 9, 0b1010_0010);

        let BeidouDetail::Health {
            page,
            entries,
            extras,
        } = decode_d1(6, &raw_words(&cond)).unwrap().detail
        else {
            panic!("expected health page");
        };
        assert_eq!(page, 7);
        assert_eq!(entries.len(), 19);
        assert!(extras.is_empty());
        assert_eq!(entries[0].sv, 1);
        assert_eq!(entries[0].health, BeidouHealth::NoClock);
        assert_eq!(entries[1].health, BeidouHealth::Ok);
        assert_eq!(entries[18].sv, 19);
        assert_eq!(entries[18].code, 0b1010_0010);
    }

    #[test]
    fn health_page_8_almanac_week() {
        let mut cond = subframe(5, 30);
        write(&mut cond, PNUM, 8);
        write(&mut cond, WN_A, 200);
        write(&mut cond, T0A, 17);
        set_bits(&mut cond, bit_conv(HEALTH_ICD_BIT), 9, 511);

        let BeidouDetail::Health {
            entries, extras, ..
        } = decode_d1(6, &raw_words(&cond)).unwrap().detail
        else {
            panic!("expected health page");
        };
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].sv, 20);
        assert_eq!(entries[0].health, BeidouHealth::NoSatellite);
        assert_eq!(entries[9].sv, 29);
        assert_eq!(
            extras,
            vec![
                NamedField {
                    name: "WNa",
                    value: 200
                },
                NamedField {
                    name: "t0a",
                    value: 17
                },
            ]
        );
    }

    #[test]
    fn health_page_24_am_id() {
        let mut cond = subframe(5, 30);
        write(&mut cond, PNUM, 24);
        write(&mut cond, AM_ID, 3);

        let BeidouDetail::Health {
            entries, extras, ..
        } = decode_d1(6, &raw_words(&cond)).unwrap().detail
        else {
            panic!("expected health page");
        };
        assert_eq!(entries.len(), 14);
        assert_eq!(entries[0].sv, 31);
        assert_eq!(entries[13].sv, 44);
        assert_eq!(extras, vec![NamedField { name: "AmID", value: 3 }]);
    }

    #[test]
    fn d2_reports_header_only() {
        let mut cond = subframe(1, 4242);
        write(&mut cond, WN, 800);
        let report = decode_d2(40, &raw_words(&cond)).unwrap();
        assert_eq!(report.sv, 40);
        assert_eq!(report.sow, 4242);
        assert_eq!(report.fra_id, 1);
        assert_eq!(report.detail, BeidouDetail::None);
    }
}
