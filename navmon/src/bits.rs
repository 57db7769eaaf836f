//! Bit field access in navigation message buffers.
//!
//! Bits are numbered MSB first: bit 0 is the most significant bit of byte 0,
//! which is how every navigation ICD counts them.

/// Reads `len` (at most 32) bits starting at bit `pos` as an unsigned value.
///
/// Bits beyond the end of `buf` read as zero; decoders check payload lengths
/// before extracting fields.
pub fn get_bits(buf: &[u8], pos: usize, len: usize) -> u32 {
    debug_assert!(len <= 32);
    (pos..pos + len).fold(0u32, |acc, i| {
        let byte = buf.get(i / 8).copied().unwrap_or(0);
        (acc << 1) | u32::from((byte >> (7 - i % 8)) & 1)
    })
}

/// Reads a `len` bit two's complement field.
pub fn get_bits_signed(buf: &[u8], pos: usize, len: usize) -> i32 {
    let value = get_bits(buf, pos, len);
    if len == 0 || len >= 32 {
        return value as i32;
    }
    let sign_bit = 1u32 << (len - 1);
    if value & sign_bit > 0 {
        (value | !((1u32 << len) - 1)) as i32
    } else {
        value as i32
    }
}

/// Writes the low `len` bits of `value` at bit `pos`.
///
/// # Panics
///
/// Panics if the field does not fit in `buf`.
pub fn set_bits(buf: &mut [u8], pos: usize, len: usize, value: u32) {
    debug_assert!(len <= 32);
    for i in 0..len {
        let bit = (value >> (len - 1 - i)) & 1;
        let at = pos + i;
        let mask = 0x80u8 >> (at % 8);
        if bit == 1 {
            buf[at / 8] |= mask;
        } else {
            buf[at / 8] &= !mask;
        }
    }
}
