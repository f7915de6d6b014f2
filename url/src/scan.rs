//! The scanning pass (§4.5.1, §4.5.2): a single forward sweep over the
//! filtered input that classifies byte ranges into components without
//! applying any percent-encoding or path normalization. Its output, a
//! [`ScanMap`], is consumed exactly once by [`crate::url::construct`].
//!
//! Grounded on the reference browser engine's `crates/url/src/parser.rs`
//! state-machine shape (one state per named WHATWG parser state, dispatched
//! from a `match`), generalized into the two-pass split this system calls
//! for: rather than mutating a `URL` incrementally while scanning, each
//! branch below returns a fully-populated [`ScanMap`] with raw (unencoded)
//! component bytes, deferring all percent-encoding and dot-segment
//! resolution to construction.
//!
//! Relative-URL resolution (copying components from `base`) is resolved
//! eagerly here rather than deferred via a `components_to_copy_from_base`
//! bitset: the filtered input is already an owned, compacted buffer (see
//! [`crate::input`]), so materializing the merged raw path list costs
//! nothing beyond what copying offsets would, and keeps every downstream
//! consumer — tests included — working with plain owned bytes instead of a
//! second index table. This is recorded as a deliberate simplification in
//! `DESIGN.md`.

use crate::ascii;
use crate::error::{HostParseError, ParseError, ValidationError};
use crate::host::{self, Host};
use crate::input::FilteredInput;
use crate::url::{SchemeKind, Url};

/// A parsed authority section, already host/port-validated. Credentials
/// and host are stored as raw (unencoded) bytes; percent-encoding of the
/// credentials happens during construction.
pub(crate) struct RawAuthority {
    pub username: Vec<u8>,
    pub password: Option<Vec<u8>>,
    pub host: Host,
    pub port: Option<u16>,
}

/// The materialized result of a scan: everything [`crate::url::construct`]
/// needs to build a canonical [`Url`], with components already merged
/// against `base` where the input was relative.
pub(crate) struct ScanMap {
    pub scheme: Vec<u8>,
    pub scheme_kind: SchemeKind,
    pub cannot_be_a_base_url: bool,
    pub authority: Option<RawAuthority>,
    /// Raw, unencoded path segments. For `cannot_be_a_base_url` URLs this
    /// holds exactly one element: the whole opaque path body.
    pub raw_path_segments: Vec<Vec<u8>>,
    pub query: Option<Vec<u8>>,
    pub fragment: Option<Vec<u8>>,
}

pub(crate) fn scan(input: &[u8], base: Option<&Url>, errors: &mut Vec<ValidationError>) -> Result<ScanMap, ParseError> {
    let filtered = FilteredInput::new(input);
    errors.extend(filtered.validation_errors());
    let bytes = filtered.compact();

    // The scheme (if any) is pure ASCII by construction (`detect_scheme`
    // only accepts alphanumerics, `+`, `-`, `.`), so any invalid UTF-8 can
    // only live in the unicode-accepting states that follow it (userinfo,
    // host, path, query, fragment). Checking the whole buffer up front
    // means every one of those states gets the fatal check for free
    // without threading it through each branch below.
    if std::str::from_utf8(&bytes).is_err() {
        return Err(ParseError::InvalidUtf8);
    }

    match detect_scheme(&bytes) {
        Some(scheme_end) => scan_with_scheme(&bytes, scheme_end, base, errors),
        None => scan_without_scheme(&bytes, base, errors),
    }
}

fn detect_scheme(bytes: &[u8]) -> Option<usize> {
    match bytes.first() {
        Some(&b) if ascii::is_alpha(b) => {},
        _ => return None,
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b':' => return Some(i),
            b if ascii::is_alphanumeric(b) || matches!(b, b'+' | b'-' | b'.') => i += 1,
            _ => return None,
        }
    }
    None
}

fn scan_with_scheme(
    bytes: &[u8],
    scheme_end: usize,
    base: Option<&Url>,
    errors: &mut Vec<ValidationError>,
) -> Result<ScanMap, ParseError> {
    let scheme: Vec<u8> = bytes[..scheme_end].iter().map(|&b| ascii::ascii_lowercase(b)).collect();
    let scheme_kind = SchemeKind::from_bytes(&scheme);
    let rest = &bytes[scheme_end + 1..];

    if scheme_kind == SchemeKind::File {
        if !rest.starts_with(b"/") && !rest.starts_with(b"\\") {
            errors.push(ValidationError::FileSchemeMissingFollowingSolidus);
        }
        return scan_file(scheme, rest, base, errors);
    }

    if !scheme_kind.is_special() {
        if rest.starts_with(b"//") {
            return scan_authority_then_path(scheme, scheme_kind, &rest[2..], errors);
        }
        if rest.starts_with(b"/") {
            return scan_absolute_path_no_authority(scheme, scheme_kind, rest, errors);
        }
        return Ok(scan_cannot_be_a_base(scheme, scheme_kind, rest, errors));
    }

    // Special, non-file: when the explicit scheme matches the base URL's
    // scheme, the WHATWG "special relative or authority" state takes over
    // instead of the plain "special authority slashes" dispatch below —
    // unless the body is itself introduced by "//", the rest is resolved
    // exactly as if no scheme had been written at all (e.g. "http:foo"
    // against base "http://example.com/bar" merges as a relative
    // reference instead of failing to find an authority).
    if let Some(base) = base {
        if base.scheme_kind() == scheme_kind && !rest.starts_with(b"//") {
            return scan_relative(base, rest, errors);
        }
    }

    // Special: consume up to two leading slashes (forward or backward)
    // before the authority.
    let mut i = 0;
    let mut slashes = 0;
    while slashes < 2 && i < rest.len() && matches!(rest[i], b'/' | b'\\') {
        if rest[i] == b'\\' {
            errors.push(ValidationError::UnexpectedReverseSolidus);
        }
        i += 1;
        slashes += 1;
    }
    if slashes == 0 {
        errors.push(ValidationError::MissingSolidusBeforeAuthority);
    }
    scan_authority_then_path(scheme, scheme_kind, &rest[i..], errors)
}

fn scan_without_scheme(bytes: &[u8], base: Option<&Url>, errors: &mut Vec<ValidationError>) -> Result<ScanMap, ParseError> {
    let Some(base) = base else {
        return Err(ParseError::MissingScheme);
    };

    if base.cannot_be_a_base_url() {
        if bytes.first() == Some(&b'#') {
            let fragment = Some(bytes[1..].to_vec());
            return Ok(ScanMap {
                scheme: base.scheme().to_vec(),
                scheme_kind: base.scheme_kind(),
                cannot_be_a_base_url: true,
                authority: None,
                raw_path_segments: vec![base.path().to_vec()],
                query: non_empty_query(base),
                fragment,
            });
        }
        return Err(ParseError::MissingScheme);
    }

    if base.scheme_kind() == SchemeKind::File {
        return scan_file(base.scheme().to_vec(), bytes, Some(base), errors);
    }

    scan_relative(base, bytes, errors)
}

fn non_empty_query(base: &Url) -> Option<Vec<u8>> {
    let q = base.query();
    (!q.is_empty()).then(|| q[1..].to_vec())
}

fn non_empty_fragment(base: &Url) -> Option<Vec<u8>> {
    let f = base.fragment();
    (!f.is_empty()).then(|| f[1..].to_vec())
}

fn scan_relative(base: &Url, bytes: &[u8], errors: &mut Vec<ValidationError>) -> Result<ScanMap, ParseError> {
    let scheme = base.scheme().to_vec();
    let scheme_kind = base.scheme_kind();

    if bytes.starts_with(b"//") || (scheme_kind.is_special() && bytes.starts_with(b"\\\\")) {
        return scan_authority_then_path(scheme, scheme_kind, &bytes[2..], errors);
    }

    if bytes.first() == Some(&b'/') || (scheme_kind.is_special() && bytes.first() == Some(&b'\\')) {
        if bytes.first() == Some(&b'\\') {
            errors.push(ValidationError::UnexpectedReverseSolidus);
        }
        // Absolute path, authority copied from base.
        let (path_bytes, query, fragment) = split_path_query_fragment(bytes);
        return Ok(ScanMap {
            scheme,
            scheme_kind,
            cannot_be_a_base_url: false,
            authority: Some(base_authority(base)),
            raw_path_segments: split_path_segments(path_bytes, scheme_kind, errors),
            query,
            fragment,
        });
    }

    if bytes.first() == Some(&b'?') {
        let (_, query, fragment) = split_path_query_fragment(bytes);
        return Ok(ScanMap {
            scheme,
            scheme_kind,
            cannot_be_a_base_url: false,
            authority: Some(base_authority(base)),
            raw_path_segments: base.base_path_segments(),
            query,
            fragment,
        });
    }

    if bytes.first() == Some(&b'#') {
        return Ok(ScanMap {
            scheme,
            scheme_kind,
            cannot_be_a_base_url: false,
            authority: Some(base_authority(base)),
            raw_path_segments: base.base_path_segments(),
            query: non_empty_query(base),
            fragment: Some(bytes[1..].to_vec()),
        });
    }

    if bytes.is_empty() {
        return Ok(ScanMap {
            scheme,
            scheme_kind,
            cannot_be_a_base_url: false,
            authority: Some(base_authority(base)),
            raw_path_segments: base.base_path_segments(),
            query: non_empty_query(base),
            fragment: non_empty_fragment(base),
        });
    }

    // Plain relative reference: merge with base path (drop last segment).
    errors.push(ValidationError::RelativeUrlMissingBeginningSolidus);
    let (path_bytes, query, fragment) = split_path_query_fragment(bytes);
    let mut merged = base.base_path_segments();
    merged.pop();
    merged.extend(split_path_segments(path_bytes, scheme_kind, errors));
    Ok(ScanMap {
        scheme,
        scheme_kind,
        cannot_be_a_base_url: false,
        authority: Some(base_authority(base)),
        raw_path_segments: merged,
        query,
        fragment,
    })
}

fn base_authority(base: &Url) -> RawAuthority {
    RawAuthority {
        username: base.username().to_vec(),
        password: {
            let p = base.password();
            (!p.is_empty()).then(|| p[1..].to_vec())
        },
        host: base.host().clone(),
        port: base.port(),
    }
}

fn scan_cannot_be_a_base(scheme: Vec<u8>, scheme_kind: SchemeKind, rest: &[u8], errors: &mut Vec<ValidationError>) -> ScanMap {
    let (path_bytes, query, fragment) = split_path_query_fragment(rest);
    errors.extend(crate::percent::validate_percent_escapes(path_bytes));
    ScanMap {
        scheme,
        scheme_kind,
        cannot_be_a_base_url: true,
        authority: None,
        raw_path_segments: vec![path_bytes.to_vec()],
        query,
        fragment,
    }
}

fn scan_absolute_path_no_authority(
    scheme: Vec<u8>,
    scheme_kind: SchemeKind,
    rest: &[u8],
    errors: &mut Vec<ValidationError>,
) -> Result<ScanMap, ParseError> {
    let (path_bytes, query, fragment) = split_path_query_fragment(rest);
    Ok(ScanMap {
        scheme,
        scheme_kind,
        cannot_be_a_base_url: false,
        authority: None,
        raw_path_segments: split_path_segments(path_bytes, scheme_kind, errors),
        query,
        fragment,
    })
}

fn scan_authority_then_path(
    scheme: Vec<u8>,
    scheme_kind: SchemeKind,
    rest: &[u8],
    errors: &mut Vec<ValidationError>,
) -> Result<ScanMap, ParseError> {
    let authority_end = rest
        .iter()
        .position(|&b| b == b'/' || b == b'?' || b == b'#' || (scheme_kind.is_special() && b == b'\\'))
        .unwrap_or(rest.len());
    let authority_text = &rest[..authority_end];
    let tail = &rest[authority_end..];

    let raw_authority = parse_authority_text(authority_text, scheme_kind, errors)?;
    if raw_authority.host.is_empty() && scheme_kind.is_special() && scheme_kind != SchemeKind::File {
        return Err(ParseError::EmptyHost);
    }

    let (path_bytes, query, fragment) = split_path_query_fragment(tail);
    Ok(ScanMap {
        scheme,
        scheme_kind,
        cannot_be_a_base_url: false,
        authority: Some(raw_authority),
        raw_path_segments: split_path_segments(path_bytes, scheme_kind, errors),
        query,
        fragment,
    })
}

fn parse_authority_text(text: &[u8], scheme_kind: SchemeKind, errors: &mut Vec<ValidationError>) -> Result<RawAuthority, ParseError> {
    let (credentials, host_port) = match text.iter().rposition(|&b| b == b'@') {
        Some(at) => (Some(&text[..at]), &text[at + 1..]),
        None => (None, text),
    };

    let (username, password) = match credentials {
        Some(creds) if creds.is_empty() => return Err(ParseError::MissingCredentials),
        Some(creds) => match creds.iter().position(|&b| b == b':') {
            Some(colon) => (creds[..colon].to_vec(), Some(creds[colon + 1..].to_vec())),
            None => (creds.to_vec(), None),
        },
        None => (Vec::new(), None),
    };
    if credentials.is_some_and(|creds| creds.contains(&b'@')) {
        errors.push(ValidationError::UnexpectedCommercialAt);
    }

    let (host_text, port_text) = split_host_port(host_port)?;
    let host = host::parse_host(host_text, !scheme_kind.is_special()).map_err(ParseError::HostParser)?;

    let port = match port_text {
        None => None,
        Some(p) if p.is_empty() => None,
        Some(p) => {
            if !p.iter().all(|&b| ascii::is_digit(b)) {
                return Err(ParseError::PortInvalid);
            }
            let value: u64 = p
                .iter()
                .fold(0u64, |acc, &b| acc.saturating_mul(10).saturating_add((b - b'0') as u64));
            if value > 65535 {
                return Err(ParseError::PortOutOfRange);
            }
            Some(value as u16)
        },
    };

    if host.is_empty() && port.is_some() {
        errors.push(ValidationError::UnexpectedPortWithoutHost);
    }

    Ok(RawAuthority { username, password, host, port })
}

fn split_host_port(host_port: &[u8]) -> Result<(&[u8], Option<&[u8]>), ParseError> {
    if host_port.first() == Some(&b'[') {
        let Some(close) = host_port.iter().position(|&b| b == b']') else {
            return Err(ParseError::HostParser(HostParseError::UnclosedIpv6));
        };
        let host = &host_port[..=close];
        let after = &host_port[close + 1..];
        let port = match after.first() {
            Some(b':') => Some(&after[1..]),
            None => None,
            Some(_) => return Err(ParseError::HostParser(HostParseError::ForbiddenHostCodePoint)),
        };
        return Ok((host, port));
    }

    match host_port.iter().position(|&b| b == b':') {
        Some(colon) => Ok((&host_port[..colon], Some(&host_port[colon + 1..]))),
        None => Ok((host_port, None)),
    }
}

/// Splits `bytes` into `(path, query, fragment)` on the first `?`/`#`,
/// taking care that a `#` before the first `?` ends the query search too.
fn split_path_query_fragment(bytes: &[u8]) -> (&[u8], Option<Vec<u8>>, Option<Vec<u8>>) {
    let (before_fragment, fragment) = match bytes.iter().position(|&b| b == b'#') {
        Some(i) => (&bytes[..i], Some(bytes[i + 1..].to_vec())),
        None => (bytes, None),
    };
    let (path, query) = match before_fragment.iter().position(|&b| b == b'?') {
        Some(i) => (&before_fragment[..i], Some(before_fragment[i + 1..].to_vec())),
        None => (before_fragment, None),
    };
    (path, query, fragment)
}

fn split_path_segments(path: &[u8], scheme_kind: SchemeKind, errors: &mut Vec<ValidationError>) -> Vec<Vec<u8>> {
    errors.extend(crate::percent::validate_percent_escapes(path));
    // An empty path (as opposed to a path consisting of a single `/`, which
    // still strips down to an empty remainder below) means no path at all:
    // `path.split(..)` on an empty slice would otherwise still yield one
    // (empty) segment, forcing a spurious `/` onto the end of a non-special
    // scheme's authority-only URL during construction.
    if path.is_empty() {
        return Vec::new();
    }
    let path = path.strip_prefix(b"/").unwrap_or(path);
    let is_special = scheme_kind.is_special();
    if is_special && path.contains(&b'\\') {
        errors.push(ValidationError::UnexpectedReverseSolidus);
    }
    path.split(|&b| b == b'/' || (is_special && b == b'\\'))
        .map(|s| s.to_vec())
        .collect()
}

fn scan_file(scheme: Vec<u8>, rest: &[u8], base: Option<&Url>, errors: &mut Vec<ValidationError>) -> Result<ScanMap, ParseError> {
    let scheme_kind = SchemeKind::File;
    let mut i = 0;
    let mut slashes = 0;
    while slashes < 2 && i < rest.len() && matches!(rest[i], b'/' | b'\\') {
        if rest[i] == b'\\' {
            errors.push(ValidationError::UnexpectedReverseSolidus);
        }
        i += 1;
        slashes += 1;
    }
    let tail = &rest[i..];

    if slashes == 2 {
        // A `file:` host that itself looks like a Windows drive letter
        // (`file://c:/foo`) is never treated as a network host — it is
        // reinterpreted as the start of the path, with an empty host, the
        // same as if only zero or one slash had introduced it.
        let authority_end = tail
            .iter()
            .position(|&b| matches!(b, b'/' | b'\\' | b'?' | b'#'))
            .unwrap_or(tail.len());
        if ascii::is_windows_drive_letter(&tail[..authority_end]) {
            errors.push(ValidationError::UnexpectedWindowsDriveLetterHost);
            let (path_bytes, query, fragment) = split_path_query_fragment(tail);
            return Ok(ScanMap {
                scheme,
                scheme_kind,
                cannot_be_a_base_url: false,
                authority: Some(RawAuthority { username: Vec::new(), password: None, host: Host::Empty, port: None }),
                raw_path_segments: split_path_segments(path_bytes, scheme_kind, errors),
                query,
                fragment,
            });
        }
        return scan_authority_then_path(scheme, scheme_kind, tail, errors);
    }

    // 0 or 1 leading slash: no network authority, host is empty (or
    // copied from base when the remaining body is not itself a drive
    // letter path).
    let (path_bytes, query, fragment) = split_path_query_fragment(tail);
    let has_drive_letter_prefix = ascii::has_windows_drive_letter_prefix(path_bytes);

    let copy_from_base = matches!(base, Some(b) if b.scheme_kind() == SchemeKind::File) && !has_drive_letter_prefix;
    let base_to_copy = base.filter(|_| copy_from_base);

    let host = match base_to_copy {
        Some(b) => b.host().clone(),
        None => Host::Empty,
    };

    let raw_path_segments = match (slashes, base_to_copy) {
        (0, Some(b)) => {
            let mut merged = b.base_path_segments();
            merged.pop();
            merged.extend(split_path_segments(path_bytes, scheme_kind, errors));
            merged
        },
        _ => split_path_segments(path_bytes, scheme_kind, errors),
    };

    Ok(ScanMap {
        scheme,
        scheme_kind,
        cannot_be_a_base_url: false,
        authority: Some(RawAuthority { username: Vec::new(), password: None, host, port: None }),
        raw_path_segments,
        query,
        fragment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_simple_scheme() {
        assert_eq!(detect_scheme(b"http://x"), Some(4));
    }

    #[test]
    fn no_scheme_when_no_colon() {
        assert_eq!(detect_scheme(b"/just/a/path"), None);
    }

    #[test]
    fn no_scheme_when_first_byte_not_alpha() {
        assert_eq!(detect_scheme(b"1http://x"), None);
    }

    #[test]
    fn splits_host_and_port() {
        assert_eq!(split_host_port(b"example.com:8080").unwrap(), (b"example.com".as_slice(), Some(b"8080".as_slice())));
    }

    #[test]
    fn splits_bracketed_ipv6_host() {
        let (host, port) = split_host_port(b"[::1]:8080").unwrap();
        assert_eq!(host, b"[::1]");
        assert_eq!(port, Some(b"8080".as_slice()));
    }

    #[test]
    fn split_pqf_handles_all_three() {
        let (p, q, f) = split_path_query_fragment(b"/a/b?q=1#frag");
        assert_eq!(p, b"/a/b");
        assert_eq!(q, Some(b"q=1".to_vec()));
        assert_eq!(f, Some(b"frag".to_vec()));
    }
}
