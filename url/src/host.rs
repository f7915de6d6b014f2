//! Host parsing: the dispatch between IPv6 literal, IPv4 literal, opaque
//! host, and domain, plus the `Host` value type itself (§3.2).
//!
//! Grounded on the reference browser engine's `web/url/src/host.rs`, with
//! punycode/IDNA transcoding removed (explicitly out of scope) and the
//! domain/IP representations narrowed to the bit-exact forms §3.2 asks for.

use crate::ascii::{ascii_lowercase, is_forbidden_domain_code_point, is_forbidden_host_code_point};
use crate::error::HostParseError;
use crate::ip::{self, parse_ipv4, parse_ipv6, serialize_ipv6};
use crate::percent;

/// A parsed host, in one of the four forms the WHATWG host parser can
/// produce. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    Domain(Vec<u8>),
    Ipv4(u32),
    Ipv6([u16; 8]),
    Opaque(Vec<u8>),
    Empty,
}

impl Host {
    /// The canonical serialized form of this host, as it appears in a URL's
    /// authority.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Host::Domain(bytes) | Host::Opaque(bytes) => bytes.clone(),
            Host::Ipv4(addr) => serialize_ipv4(*addr).into_bytes(),
            Host::Ipv6(groups) => {
                let mut out = Vec::with_capacity(41);
                out.push(b'[');
                out.extend_from_slice(serialize_ipv6(groups).as_bytes());
                out.push(b']');
                out
            },
            Host::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Host::Empty)
    }
}

fn serialize_ipv4(addr: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (addr >> 24) & 0xff,
        (addr >> 16) & 0xff,
        (addr >> 8) & 0xff,
        addr & 0xff
    )
}

/// Parses `bytes` as a host. `is_not_special` selects the opaque-host path
/// for non-special schemes; special schemes (including `file`) always parse
/// a domain or IPv4/IPv6 literal.
pub fn parse_host(bytes: &[u8], is_not_special: bool) -> Result<Host, HostParseError> {
    if bytes.is_empty() {
        return Ok(Host::Empty);
    }

    if bytes.first() == Some(&b'[') {
        let Some(b']') = bytes.last() else {
            return Err(HostParseError::UnclosedIpv6);
        };
        let interior = &bytes[1..bytes.len() - 1];
        return parse_ipv6(interior)
            .map(Host::Ipv6)
            .map_err(HostParseError::Ipv6);
    }

    if is_not_special {
        return parse_opaque_host(bytes);
    }

    parse_domain_or_ipv4(bytes)
}

fn parse_opaque_host(bytes: &[u8]) -> Result<Host, HostParseError> {
    for &byte in bytes {
        if byte != b'%' && is_forbidden_host_code_point(byte) {
            return Err(HostParseError::ForbiddenHostCodePoint);
        }
    }
    Ok(Host::Opaque(percent::encode(bytes, &percent::C0)))
}

fn parse_domain_or_ipv4(bytes: &[u8]) -> Result<Host, HostParseError> {
    let decoded = percent::decode(bytes);

    if decoded.is_empty() {
        return Err(HostParseError::EmptyHost);
    }
    for &byte in &decoded {
        if is_forbidden_domain_code_point(byte) {
            return Err(HostParseError::ForbiddenHostCodePoint);
        }
    }

    let lowered: Vec<u8> = decoded.iter().map(|&b| ascii_lowercase(b)).collect();

    if ip::ends_in_number(&lowered) {
        let candidate = lowered.strip_suffix(b".").unwrap_or(&lowered);
        return parse_ipv4(candidate)
            .map(Host::Ipv4)
            .map_err(HostParseError::Ipv4);
    }

    Ok(Host::Domain(lowered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_domain() {
        assert_eq!(
            parse_host(b"Example.COM", false),
            Ok(Host::Domain(b"example.com".to_vec()))
        );
    }

    #[test]
    fn parses_ipv4_domain() {
        assert_eq!(parse_host(b"0xbadf00d", false), Ok(Host::Ipv4(0x0badf00d)));
    }

    #[test]
    fn parses_ipv6_bracketed() {
        let host = parse_host(b"[::1]", false).unwrap();
        assert_eq!(host, Host::Ipv6([0, 0, 0, 0, 0, 0, 0, 1]));
        assert_eq!(host.serialize(), b"[::1]");
    }

    #[test]
    fn rejects_unclosed_ipv6() {
        assert_eq!(parse_host(b"[::1", false), Err(HostParseError::UnclosedIpv6));
    }

    #[test]
    fn opaque_host_allows_percent_and_rejects_forbidden() {
        assert!(parse_host(b"a%20b", true).is_ok());
        assert_eq!(
            parse_host(b"a b", true),
            Err(HostParseError::ForbiddenHostCodePoint)
        );
    }

    #[test]
    fn domain_rejects_forbidden_code_point() {
        assert_eq!(
            parse_host(b"exa mple.com", false),
            Err(HostParseError::ForbiddenHostCodePoint)
        );
    }

    #[test]
    fn empty_host_is_empty_variant() {
        assert_eq!(parse_host(b"", false), Ok(Host::Empty));
        assert!(Host::Empty.is_empty());
    }
}
