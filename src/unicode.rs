//! UTF-8 and UTF-16 primitives shared by the tokenizer and the writer.
//!
//! The decoder validates the full RFC 3629 range: lead-byte classes,
//! continuation bits, the tightened second-byte bounds that exclude
//! overlong encodings and surrogate-range code points, and the U+10FFFF
//! ceiling.

use thiserror::Error;

/// An error returned by [`decode_utf8`].
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeUtf8Error {
    /// The slice ends in the middle of a multi-byte sequence.
    #[error("truncated UTF-8 sequence")]
    Truncated,

    /// The bytes do not form a well-formed UTF-8 sequence.
    #[error("malformed UTF-8 sequence")]
    Malformed,
}

/// An error returned by [`encode_utf8`] for code points beyond U+10FFFF.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("code point beyond U+10FFFF")]
pub struct IllegalCodepointError;

#[inline]
fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Decode the first UTF-8 sequence in `bytes` and return the code point
/// together with the number of bytes consumed (1–4).
pub fn decode_utf8(bytes: &[u8]) -> Result<(u32, usize), DecodeUtf8Error> {
    let first = *bytes.first().ok_or(DecodeUtf8Error::Truncated)?;

    if first < 0x80 {
        return Ok((first as u32, 1));
    }
    if first < 0xC2 {
        // stray continuation byte or overlong 2-byte lead
        return Err(DecodeUtf8Error::Malformed);
    }

    let len = if first < 0xE0 {
        2
    } else if first < 0xF0 {
        3
    } else if first < 0xF5 {
        4
    } else {
        return Err(DecodeUtf8Error::Malformed);
    };

    if bytes.len() < len {
        for &b in &bytes[1..] {
            if !is_continuation(b) {
                return Err(DecodeUtf8Error::Malformed);
            }
        }
        return Err(DecodeUtf8Error::Truncated);
    }

    let second = bytes[1];
    if !is_continuation(second) {
        return Err(DecodeUtf8Error::Malformed);
    }
    // Second-byte bounds: 0xE0 must not encode below U+0800 (overlong),
    // 0xED must not encode the surrogate range, 0xF0 must not encode
    // below U+10000 (overlong), 0xF4 must not exceed U+10FFFF.
    match first {
        0xE0 if second < 0xA0 => return Err(DecodeUtf8Error::Malformed),
        0xED if second >= 0xA0 => return Err(DecodeUtf8Error::Malformed),
        0xF0 if second < 0x90 => return Err(DecodeUtf8Error::Malformed),
        0xF4 if second >= 0x90 => return Err(DecodeUtf8Error::Malformed),
        _ => {}
    }

    let mut codepoint = (first as u32) & (0x7F >> len);
    codepoint = (codepoint << 6) | (second as u32 & 0x3F);
    for &b in &bytes[2..len] {
        if !is_continuation(b) {
            return Err(DecodeUtf8Error::Malformed);
        }
        codepoint = (codepoint << 6) | (b as u32 & 0x3F);
    }

    Ok((codepoint, len))
}

/// Encode `codepoint` into `buf` and return the number of bytes written
/// (1–4).
pub fn encode_utf8(codepoint: u32, buf: &mut [u8; 4]) -> Result<usize, IllegalCodepointError> {
    if codepoint < 0x80 {
        buf[0] = codepoint as u8;
        Ok(1)
    } else if codepoint <= 0x7FF {
        buf[0] = (codepoint >> 6) as u8 + 0xC0;
        buf[1] = (codepoint as u8 & 0x3F) + 0x80;
        Ok(2)
    } else if codepoint <= 0xFFFF {
        buf[0] = (codepoint >> 12) as u8 + 0xE0;
        buf[1] = ((codepoint >> 6) as u8 & 0x3F) + 0x80;
        buf[2] = (codepoint as u8 & 0x3F) + 0x80;
        Ok(3)
    } else if codepoint <= 0x10FFFF {
        buf[0] = (codepoint >> 18) as u8 + 0xF0;
        buf[1] = ((codepoint >> 12) as u8 & 0x3F) + 0x80;
        buf[2] = ((codepoint >> 6) as u8 & 0x3F) + 0x80;
        buf[3] = (codepoint as u8 & 0x3F) + 0x80;
        Ok(4)
    } else {
        Err(IllegalCodepointError)
    }
}

/// Combine a UTF-16 surrogate pair into the code point it encodes. The
/// caller must have verified that `high` is in 0xD800–0xDBFF and `low`
/// in 0xDC00–0xDFFF.
pub fn combine_surrogates(high: u16, low: u16) -> u32 {
    debug_assert!((0xD800..=0xDBFF).contains(&high));
    debug_assert!((0xDC00..=0xDFFF).contains(&low));
    (((high as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00) + 0x10000
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(decode_utf8(b"a"), Ok((0x61, 1)));
        assert_eq!(decode_utf8(&[0x00]), Ok((0, 1)));
    }

    #[test]
    fn multi_byte_classes() {
        assert_eq!(decode_utf8("é".as_bytes()), Ok((0xE9, 2)));
        assert_eq!(decode_utf8("€".as_bytes()), Ok((0x20AC, 3)));
        assert_eq!(decode_utf8("😀".as_bytes()), Ok((0x1F600, 4)));
    }

    #[test]
    fn rejects_stray_continuation() {
        assert_eq!(decode_utf8(&[0x80]), Err(DecodeUtf8Error::Malformed));
        assert_eq!(decode_utf8(&[0xBF]), Err(DecodeUtf8Error::Malformed));
    }

    #[test]
    fn rejects_overlong() {
        // overlong "/" in two and three bytes
        assert_eq!(decode_utf8(&[0xC0, 0xAF]), Err(DecodeUtf8Error::Malformed));
        assert_eq!(
            decode_utf8(&[0xE0, 0x80, 0xAF]),
            Err(DecodeUtf8Error::Malformed)
        );
        // overlong U+FFFF in four bytes
        assert_eq!(
            decode_utf8(&[0xF0, 0x8F, 0xBF, 0xBF]),
            Err(DecodeUtf8Error::Malformed)
        );
    }

    #[test]
    fn rejects_surrogates_and_out_of_range() {
        // U+D800
        assert_eq!(
            decode_utf8(&[0xED, 0xA0, 0x80]),
            Err(DecodeUtf8Error::Malformed)
        );
        // U+110000
        assert_eq!(
            decode_utf8(&[0xF4, 0x90, 0x80, 0x80]),
            Err(DecodeUtf8Error::Malformed)
        );
        assert_eq!(decode_utf8(&[0xF5]), Err(DecodeUtf8Error::Malformed));
    }

    #[test]
    fn truncated_is_distinguished() {
        assert_eq!(decode_utf8(&[0xE2, 0x82]), Err(DecodeUtf8Error::Truncated));
        assert_eq!(decode_utf8(&[]), Err(DecodeUtf8Error::Truncated));
        // a bad continuation inside a truncated prefix is still malformed
        assert_eq!(
            decode_utf8(&[0xE2, 0x41]),
            Err(DecodeUtf8Error::Malformed)
        );
    }

    #[test]
    fn encode_round_trips() {
        let mut buf = [0u8; 4];
        for &cp in &[0x61u32, 0xE9, 0x20AC, 0x1F600, 0x10FFFF] {
            let n = encode_utf8(cp, &mut buf).unwrap();
            assert_eq!(decode_utf8(&buf[..n]), Ok((cp, n)));
        }
        assert_eq!(encode_utf8(0x110000, &mut buf), Err(IllegalCodepointError));
    }

    #[test]
    fn surrogate_combination() {
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), 0x1F600);
        assert_eq!(combine_surrogates(0xD800, 0xDC00), 0x10000);
        assert_eq!(combine_surrogates(0xDBFF, 0xDFFF), 0x10FFFF);
    }
}
