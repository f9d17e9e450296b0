// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Signed/unsigned 16-bit register codec.
//!
//! The controller stores signed engineering values (temperatures in
//! hundredths of a degree, offsets, setpoints) as two's-complement words.
//! Status registers carry raw unsigned words and are passed through.

use crate::error::CodecError;

/// Largest raw register word.
pub const WORD_MAX: i32 = u16::MAX as i32;

/// Decodes a raw register word into a signed value.
///
/// Accepts `0..=65535`; words above `32767` map to `raw - 65536`.
///
/// # Errors
///
/// Returns [`CodecError::OutOfRange`] if `raw` is not a valid 16-bit word.
///
/// # Example
///
/// ```
/// use copmax_modbus::codec::decode_signed16;
///
/// assert_eq!(decode_signed16(65535).unwrap(), -1);
/// assert_eq!(decode_signed16(2150).unwrap(), 2150);
/// ```
pub fn decode_signed16(raw: i32) -> Result<i16, CodecError> {
    if !(0..=WORD_MAX).contains(&raw) {
        return Err(CodecError::out_of_range(
            raw as i64,
            "unsigned 16-bit",
            0,
            WORD_MAX as i64,
        ));
    }

    Ok(raw as u16 as i16)
}

/// Encodes a signed value into a raw register word.
///
/// Accepts `-32768..=32767`; negative values map to `value + 65536`.
///
/// # Errors
///
/// Returns [`CodecError::OutOfRange`] if `value` does not fit a signed 16-bit register.
///
/// # Example
///
/// ```
/// use copmax_modbus::codec::encode_signed16;
///
/// assert_eq!(encode_signed16(-1).unwrap(), 65535);
/// assert!(encode_signed16(40000).is_err());
/// ```
pub fn encode_signed16(value: i32) -> Result<u16, CodecError> {
    let narrowed = i16::try_from(value).map_err(|_| {
        CodecError::out_of_range(
            value as i64,
            "signed 16-bit",
            i16::MIN as i64,
            i16::MAX as i64,
        )
    })?;

    Ok(narrowed as u16)
}

/// Scales a setpoint and encodes it for a holding-register write.
///
/// The product is range-checked before narrowing, so an overflowing scale
/// factor is reported instead of wrapping.
pub fn encode_scaled(value: i32, multiplier: i32) -> Result<u16, CodecError> {
    let scaled = (value as i64) * (multiplier as i64);
    let scaled = i32::try_from(scaled).map_err(|_| {
        CodecError::out_of_range(scaled, "signed 16-bit", i16::MIN as i64, i16::MAX as i64)
    })?;
    encode_signed16(scaled)
}

// =============================================================================
// Word helpers
// =============================================================================

/// How the words of a register group are exposed to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Two's-complement signed value.
    Signed,
    /// Raw unsigned word.
    Raw,
}

/// Decodes a single wire word according to `kind`.
#[inline]
pub fn decode_word(word: u16, kind: ValueKind) -> Result<i32, CodecError> {
    match kind {
        ValueKind::Signed => decode_signed16(word as i32).map(i32::from),
        ValueKind::Raw => Ok(word as i32),
    }
}

/// Decodes consecutive wire words starting at `start` into `(address, value)` pairs.
pub fn decode_words(
    start: u16,
    words: &[u16],
    kind: ValueKind,
) -> Result<Vec<(u16, i32)>, CodecError> {
    words
        .iter()
        .enumerate()
        .map(|(offset, &word)| {
            let address = u16::try_from(start as usize + offset).map_err(|_| {
                CodecError::out_of_range(
                    start as i64 + offset as i64,
                    "register address",
                    0,
                    u16::MAX as i64,
                )
            })?;
            Ok((address, decode_word(word, kind)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fixed_points() {
        assert_eq!(decode_signed16(0).unwrap(), 0);
        assert_eq!(decode_signed16(32767).unwrap(), 32767);
        assert_eq!(decode_signed16(32768).unwrap(), -32768);
        assert_eq!(decode_signed16(65535).unwrap(), -1);
    }

    #[test]
    fn test_decode_rejects_out_of_domain() {
        assert!(matches!(
            decode_signed16(65536),
            Err(CodecError::OutOfRange { value: 65536, .. })
        ));
        assert!(decode_signed16(-1).is_err());
    }

    #[test]
    fn test_encode_fixed_points() {
        assert_eq!(encode_signed16(0).unwrap(), 0);
        assert_eq!(encode_signed16(-1).unwrap(), 65535);
        assert_eq!(encode_signed16(-32768).unwrap(), 32768);
        assert_eq!(encode_signed16(32767).unwrap(), 32767);
    }

    #[test]
    fn test_encode_rejects_out_of_domain() {
        assert!(encode_signed16(32768).is_err());
        assert!(encode_signed16(-32769).is_err());
    }

    #[test]
    fn test_round_trip_over_full_domain() {
        for raw in 0..=WORD_MAX {
            let decoded = decode_signed16(raw).unwrap();
            assert_eq!(encode_signed16(decoded as i32).unwrap() as i32, raw);
        }
    }

    #[test]
    fn test_encode_scaled() {
        assert_eq!(encode_scaled(21, 100).unwrap(), 2100);
        assert_eq!(encode_scaled(-5, 100).unwrap(), 65036);
        assert_eq!(encode_scaled(7, 1).unwrap(), 7);
        assert!(encode_scaled(400, 100).is_err());
        assert!(encode_scaled(i32::MAX, i32::MAX).is_err());
    }

    #[test]
    fn test_decode_words() {
        let words = [2150u16, 65436, 7];
        let signed = decode_words(38, &words, ValueKind::Signed).unwrap();
        assert_eq!(signed, vec![(38, 2150), (39, -100), (40, 7)]);

        let raw = decode_words(6, &words, ValueKind::Raw).unwrap();
        assert_eq!(raw, vec![(6, 2150), (7, 65436), (8, 7)]);
    }

    #[test]
    fn test_decode_words_rejects_address_overflow() {
        assert!(decode_words(u16::MAX, &[1, 2], ValueKind::Raw).is_err());
    }
}
