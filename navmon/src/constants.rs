/// Marker opening every transport frame.
pub const FRAME_MAGIC: [u8; 4] = *b"bert";
pub(crate) const FRAME_MAGIC_LEN: usize = 4;
pub(crate) const FRAME_LENGTH_LEN: usize = 2;
pub const MAX_FRAME_PAYLOAD_LEN: usize = u16::MAX as usize;

pub const SECONDS_PER_WEEK: i32 = 7 * 86_400;

pub(crate) const GPS_RAW_LEN: usize = 40; // 10 words of 32 bits
pub(crate) const GPS_CONDENSED_LEN: usize = 30; // 10 words of 24 data bits

pub(crate) const BEIDOU_RAW_LEN: usize = 40;
pub(crate) const BEIDOU_CONDENSED_LEN: usize = 28; // 26 + 9 * 22 information bits

pub(crate) const GALILEO_INAV_WORD_LEN: usize = 16;
pub(crate) const GALILEO_PAGE_PAIR_LEN: usize = 32; // even + odd page, 8 words
/// Highest Galileo satellite id
pub const GALILEO_MAX_SV: u32 = 36;
/// Galileo almanac reference time unit (s)
pub const GALILEO_T0A_SCALE: u32 = 600;
