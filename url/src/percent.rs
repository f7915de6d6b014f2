//! Per-component percent-encoding escape sets and the streaming
//! encode/decode routines built on top of them.
//!
//! Grounded on the shape of `percent_encode.rs` in the reference browser
//! engine's web crate, generalized from free functions to [`AsciiSet`]
//! values so the six escape sets can be composed by union instead of
//! duplicated predicate logic.

use crate::ascii::hex_value;
use crate::error::ValidationError;
use crate::set::AsciiSet;

const HEX_DIGITS_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Every C0 control and every byte above `0x7E`. This is the baseline that
/// every other escape set below builds on.
pub const C0: AsciiSet = AsciiSet::from_range(0x00, 0x1f).merge(AsciiSet::from_range(0x7f, 0xff));

pub const FRAGMENT: AsciiSet = C0
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`');

pub const PATH: AsciiSet = FRAGMENT.add(b'#').add(b'?').add(b'{').add(b'}');

pub const USER_INFO: AsciiSet = PATH
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'|');

pub const QUERY_NONSPECIAL: AsciiSet =
    C0.add(b' ').add(b'"').add(b'<').add(b'>').add(b'#');

pub const QUERY_SPECIAL: AsciiSet = QUERY_NONSPECIAL.add(b'\'');

/// Percent-encodes `src` against `set`, forwarding contiguous unescaped runs
/// and individual `%HH` triples to `emit` as they're produced. Bytes not in
/// `set` are passed through byte-for-byte (including UTF-8 continuation
/// bytes, which is why multi-byte sequences made entirely of bytes outside
/// `set` survive intact).
pub fn encode_stream(src: &[u8], set: &AsciiSet, mut emit: impl FnMut(&[u8])) {
    let mut run_start = 0;
    let mut triple = [0u8; 3];
    for (i, &byte) in src.iter().enumerate() {
        if set.contains(byte) {
            if run_start < i {
                emit(&src[run_start..i]);
            }
            encode_byte(byte, &mut triple);
            emit(&triple);
            run_start = i + 1;
        }
    }
    if run_start < src.len() {
        emit(&src[run_start..]);
    }
}

/// Percent-encodes `src` into an owned buffer.
pub fn encode(src: &[u8], set: &AsciiSet) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    encode_stream(src, set, |chunk| out.extend_from_slice(chunk));
    out
}

/// Like [`encode_stream`], but walks `src` back to front and calls `emit`
/// once per chunk in the order the chunks should be *prepended* to the
/// output — used when a segment buffer is assembled from its tail forward
/// (e.g. popping path segments during `..` resolution).
pub fn encode_reverse_stream(src: &[u8], set: &AsciiSet, mut emit: impl FnMut(&[u8])) {
    let mut run_end = src.len();
    let mut triple = [0u8; 3];
    let mut i = src.len();
    while i > 0 {
        i -= 1;
        let byte = src[i];
        if set.contains(byte) {
            if i + 1 < run_end {
                emit(&src[i + 1..run_end]);
            }
            encode_byte(byte, &mut triple);
            emit(&triple);
            run_end = i;
        }
    }
    if run_end > 0 {
        emit(&src[0..run_end]);
    }
}

fn encode_byte(byte: u8, triple: &mut [u8; 3]) {
    triple[0] = b'%';
    triple[1] = HEX_DIGITS_UPPER[(byte >> 4) as usize];
    triple[2] = HEX_DIGITS_UPPER[(byte & 0xf) as usize];
}

/// Percent-decodes `src`. Any `%` not followed by two hex digits is copied
/// through literally (this mirrors the construction-pass contract, which
/// only ever decodes bytes already validated by [`validate_percent_escapes`]
/// or the host parser's own opaque-host pass).
pub fn decode(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        if src[i] == b'%' {
            if let Some((hi, lo)) = src.get(i + 1).zip(src.get(i + 2)) {
                if let (Some(hi), Some(lo)) = (hex_value(*hi), hex_value(*lo)) {
                    out.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(src[i]);
        i += 1;
    }
    out
}

/// Checks that every `%` in `src` is followed by two hex digits and that
/// every decoded Unicode scalar is a URL code point. Returns the collected
/// non-fatal violations; an empty vector means `src` is already in
/// canonical percent-escaped form.
///
/// `src` is expected to already be valid UTF-8 (the top-level scanner
/// rejects invalid UTF-8 before any component is sliced out of it, and
/// every slice boundary downstream falls on an ASCII delimiter, which can
/// never land inside a multi-byte sequence). If a caller ever hands this
/// malformed bytes anyway, the whole slice is reported as one
/// `InvalidUrlCodePoint` violation rather than decoded scalar-by-scalar.
pub fn validate_percent_escapes(src: &[u8]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Ok(text) = std::str::from_utf8(src) else {
        errors.push(ValidationError::InvalidUrlCodePoint);
        return errors;
    };
    for (i, c) in text.char_indices() {
        if c == '%' {
            let bytes = text.as_bytes();
            let ok = bytes
                .get(i + 1)
                .zip(bytes.get(i + 2))
                .is_some_and(|(hi, lo)| hex_value(*hi).is_some() && hex_value(*lo).is_some());
            if !ok {
                errors.push(ValidationError::UnescapedPercentSign);
            }
        } else if !crate::ascii::is_url_code_point(c) {
            errors.push(ValidationError::InvalidUrlCodePoint);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_passes_safe_bytes_through() {
        assert_eq!(encode(b"hello", &PATH), b"hello");
    }

    #[test]
    fn encode_escapes_space_in_fragment_set() {
        assert_eq!(encode(b"a b", &FRAGMENT), b"a%20b");
    }

    #[test]
    fn user_info_escapes_at_sign() {
        assert_eq!(encode(b"a@b", &USER_INFO), b"a%40b");
    }

    #[test]
    fn encode_is_idempotent_on_percent_triples() {
        let once = encode(b"100% done", &PATH);
        let twice = encode(&once, &PATH);
        assert_eq!(once, twice);
    }

    #[test]
    fn decode_roundtrips_encode() {
        let encoded = encode(b"a b@c", &USER_INFO);
        assert_eq!(decode(&encoded), b"a b@c");
    }

    #[test]
    fn decode_leaves_malformed_percent_alone() {
        assert_eq!(decode(b"100%zz"), b"100%zz");
    }

    #[test]
    fn reverse_stream_matches_forward_stream_content() {
        let mut forward = Vec::new();
        encode_stream(b"a b", &FRAGMENT, |c| forward.extend_from_slice(c));
        let mut reversed_chunks = Vec::new();
        encode_reverse_stream(b"a b", &FRAGMENT, |c| reversed_chunks.push(c.to_vec()));
        let mut rebuilt = Vec::new();
        for chunk in reversed_chunks.into_iter().rev() {
            rebuilt.extend_from_slice(&chunk);
        }
        assert_eq!(forward, rebuilt);
    }

    #[test]
    fn validate_flags_bad_percent_escape() {
        let errors = validate_percent_escapes(b"100%zz");
        assert_eq!(errors, vec![ValidationError::UnescapedPercentSign]);
    }

    #[test]
    fn validate_accepts_well_formed_escape() {
        assert!(validate_percent_escapes(b"100%20done").is_empty());
    }

    #[test]
    fn validate_flags_noncharacter_scalar_in_multibyte_input() {
        // U+FDD0 is a valid UTF-8 scalar but not a URL code point; this is
        // only detectable by decoding the input as UTF-8 rather than
        // inspecting each raw byte in isolation.
        let errors = validate_percent_escapes("a\u{fdd0}b".as_bytes());
        assert_eq!(errors, vec![ValidationError::InvalidUrlCodePoint]);
    }

    #[test]
    fn validate_accepts_ordinary_multibyte_scalar() {
        assert!(validate_percent_escapes("caf\u{e9}".as_bytes()).is_empty());
    }
}
