//! A WHATWG-conformant URL parser, host parser, and percent-encoder.
//!
//! The public surface is deliberately small: [`parse`] and
//! [`parse_with_errors`] turn bytes into a [`Url`], [`serialize`] turns a
//! [`Url`] back into bytes, and [`component_bytes`] slices out one piece of
//! it. Everything else (accessor/setter ergonomics, `application/
//! x-www-form-urlencoded` query helpers, IDNA) lives outside this crate.
//!
//! Grounded on the reference browser engine's `web/url` crate, restructured
//! into the two explicit passes this system is built around: [`scan`]
//! classifies the input into raw components without encoding anything,
//! and [`url::construct`] turns that classification plus any base URL into
//! the canonical, percent-encoded, normalized [`Url`].

pub mod ascii;
pub mod error;
pub mod host;
pub mod input;
pub mod ip;
pub mod percent;
mod scan;
pub mod set;
mod url;

pub use error::{HostParseError, Ipv4Error, Ipv6Error, ParseError, ValidationError};
pub use host::Host;
pub use url::{Component, SchemeKind, Url};

/// Parses `input` (optionally resolved against `base`) into a [`Url`].
/// Non-fatal violations are silently ignored; use [`parse_with_errors`] to
/// collect them.
pub fn parse(input: &[u8], base: Option<&Url>) -> Result<Url, ParseError> {
    let mut errors = Vec::new();
    let map = scan::scan(input, base, &mut errors)?;
    log::trace!("scan complete: scheme_kind={:?}", map.scheme_kind);
    let result = url::construct(map, &mut errors);
    log::trace!("construction complete");
    Ok(result)
}

/// Like [`parse`], but also returns every non-fatal [`ValidationError`]
/// encountered, in the order they were observed. The first element is
/// `None` when the parse fails fatally.
pub fn parse_with_errors(input: &[u8], base: Option<&Url>) -> (Option<Url>, Vec<ValidationError>) {
    let mut errors = Vec::new();
    match scan::scan(input, base, &mut errors) {
        Ok(map) => {
            let result = url::construct(map, &mut errors);
            (Some(result), errors)
        },
        Err(e) => {
            log::debug!("parse failed: {e}");
            (None, errors)
        },
    }
}

/// The canonical serialized form of `url`. `exclude_fragment` drops the
/// trailing `#fragment`, if any.
pub fn serialize(url: &Url, exclude_fragment: bool) -> Vec<u8> {
    url.serialize(exclude_fragment)
}

/// Slices out one component of `url`'s canonical serialization. Password
/// and port slices include their leading separator; query and fragment
/// slices include their leading `?`/`#`.
pub fn component_bytes(url: &Url, component: Component) -> Option<&[u8]> {
    url.component_bytes(component)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(input: &str, base: Option<&Url>) -> Url {
        parse(input.as_bytes(), base).unwrap()
    }

    fn serialize_str(url: &Url) -> String {
        String::from_utf8(serialize(url, false)).unwrap()
    }

    #[test]
    fn simple_http_url_round_trips() {
        let url = parse_str("http://example.com/foo/bar/baz?a=b&c=d&e=f", None);
        assert_eq!(serialize_str(&url), "http://example.com/foo/bar/baz?a=b&c=d&e=f");
    }

    #[test]
    fn tabs_and_newlines_are_stripped() {
        let url = parse_str("htt\tps://exa\nmple.com/p", None);
        assert_eq!(serialize_str(&url), "https://example.com/p");
    }

    #[test]
    fn ipv6_host_is_compressed_on_output() {
        let url = parse_str("http://[2001:0db8:85a3:0000:0000:8a2e:0370:7334]/", None);
        assert_eq!(serialize_str(&url), "http://[2001:db8:85a3::8a2e:370:7334]/");
    }

    #[test]
    fn hex_ipv4_host_is_normalized_to_dotted_decimal() {
        let url = parse_str("http://0xbadf00d/", None);
        assert_eq!(serialize_str(&url), "http://11.173.240.13/");
    }

    #[test]
    fn file_url_normalizes_dot_segments_and_drive_letter() {
        let url = parse_str("file:c:/x/./y/../z", None);
        assert_eq!(serialize_str(&url), "file:///c:/x/z");
    }

    #[test]
    fn relative_reference_resolves_against_base() {
        let base = parse_str("http://a.com/x/y/z", None);
        let url = parse_str("../baz", Some(&base));
        assert_eq!(serialize_str(&url), "http://a.com/x/baz");
    }

    #[test]
    fn fragment_only_against_cannot_be_a_base_url() {
        let base = parse_str("mailto:a@b", None);
        assert!(base.cannot_be_a_base_url());
        let url = parse_str("#frag", Some(&base));
        assert_eq!(serialize_str(&url), "mailto:a@b#frag");
    }

    #[test]
    fn embedded_ipv4_in_ipv6_never_reserializes_as_dotted() {
        let url = parse_str("http://[::ffff:192.168.0.1]/", None);
        assert_eq!(serialize_str(&url), "http://[::ffff:c0a8:1]/");
    }

    #[test]
    fn lone_colon_fails_without_base() {
        assert!(parse(b":", None).is_err());
    }

    #[test]
    fn malformed_ipv6_literals_fail() {
        assert!(parse(b"http://[12345::]", None).is_err());
        assert!(parse(b"http://[:::]", None).is_err());
        assert!(parse(b"http://[0:1:2:3:0001:0002:0003:0004:0005]", None).is_err());
        assert!(parse(b"http://[::ffff:555.168.0.1]", None).is_err());
    }

    #[test]
    fn empty_host_on_special_scheme_fails() {
        assert!(parse(b"http://:443", None).is_err());
    }

    #[test]
    fn bad_port_fails() {
        assert!(parse(b"http://example.com:70000", None).is_err());
        assert!(parse(b"http://example.com:7z", None).is_err());
    }

    #[test]
    fn port_boundaries() {
        assert!(parse(b"http://example.com:0", None).is_ok());
        assert!(parse(b"http://example.com:65535", None).is_ok());
        assert!(parse(b"http://example.com:65536", None).is_err());
    }

    #[test]
    fn default_port_is_elided() {
        let url = parse_str("http://example.com:80/", None);
        assert_eq!(serialize_str(&url), "http://example.com/");
    }

    #[test]
    fn non_default_port_is_kept() {
        let url = parse_str("http://example.com:8080/", None);
        assert_eq!(serialize_str(&url), "http://example.com:8080/");
    }

    #[test]
    fn serialize_can_exclude_fragment() {
        let url = parse_str("http://example.com/#frag", None);
        assert_eq!(String::from_utf8(serialize(&url, true)).unwrap(), "http://example.com/");
    }

    #[test]
    fn component_bytes_reports_absence_as_none() {
        let url = parse_str("http://example.com/", None);
        assert_eq!(component_bytes(&url, Component::Query), None);
        assert_eq!(component_bytes(&url, Component::Fragment), None);
        assert_eq!(component_bytes(&url, Component::Path), Some(b"/".as_slice()));
    }

    #[test]
    fn parse_with_errors_reports_tab_skip() {
        let (url, errors) = parse_with_errors(b"ht\ttp://example.com", None);
        assert!(url.is_some());
        assert!(errors.contains(&ValidationError::UnexpectedAsciiTabOrNewline));
    }

    #[test]
    fn explicit_scheme_matching_base_merges_as_relative() {
        // "http:foo" carries no authority of its own; since it repeats the
        // base's scheme it is resolved exactly like a schemeless relative
        // reference instead of failing to find an empty-host authority.
        let base = parse_str("http://example.com/a/b", None);
        let url = parse_str("http:foo", Some(&base));
        assert_eq!(serialize_str(&url), "http://example.com/a/foo");
    }

    #[test]
    fn explicit_scheme_matching_base_with_double_slash_still_parses_authority() {
        let base = parse_str("http://example.com/a/b", None);
        let url = parse_str("http://other.example/c", Some(&base));
        assert_eq!(serialize_str(&url), "http://other.example/c");
    }

    #[test]
    fn file_url_with_drive_letter_authority_reinterprets_as_empty_host() {
        let (url, errors) = parse_with_errors(b"file://c:/foo/bar", None);
        let url = url.unwrap();
        assert_eq!(serialize_str(&url), "file:///c:/foo/bar");
        assert!(errors.contains(&ValidationError::UnexpectedWindowsDriveLetterHost));
    }

    #[test]
    fn non_special_port_without_host_is_a_validation_error_not_a_failure() {
        let (url, errors) = parse_with_errors(b"non-special://:443", None);
        assert!(url.is_some());
        assert!(errors.contains(&ValidationError::UnexpectedPortWithoutHost));
    }

    #[test]
    fn non_first_drive_letter_segment_in_file_path_is_a_validation_error() {
        let (url, errors) = parse_with_errors(b"file:///a/c:/b", None);
        let url = url.unwrap();
        assert_eq!(serialize_str(&url), "file:///a/c:/b");
        assert!(errors.contains(&ValidationError::UnexpectedWindowsDriveLetter));
    }

    #[test]
    fn invalid_utf8_in_path_is_a_fatal_error() {
        let mut input = b"http://example.com/".to_vec();
        input.push(0xff);
        assert_eq!(parse(&input, None), Err(ParseError::InvalidUtf8));
    }

    #[test]
    fn non_special_authority_with_no_path_has_no_trailing_slash() {
        let url = parse_str("foo://host", None);
        assert_eq!(serialize_str(&url), "foo://host");
    }

    #[test]
    fn non_special_authority_with_query_but_no_path_has_no_trailing_slash() {
        let url = parse_str("foo://host?q=1", None);
        assert_eq!(serialize_str(&url), "foo://host?q=1");
    }

    #[test]
    fn special_authority_with_no_path_still_gets_a_slash() {
        let url = parse_str("http://host", None);
        assert_eq!(serialize_str(&url), "http://host/");
    }

    #[test]
    fn file_url_with_host_and_drive_letter_path_clears_the_host() {
        // "host" parses as a perfectly normal network host here, but the
        // path that follows starts with a drive letter; per the file-path
        // normalization rule the drive letter wins and the host is cleared.
        let (url, errors) = parse_with_errors(b"file://host/c:/foo", None);
        let url = url.unwrap();
        assert_eq!(serialize_str(&url), "file:///c:/foo");
        assert_eq!(url.host(), &Host::Empty);
        assert!(errors.contains(&ValidationError::UnexpectedHostFileScheme));
    }
}
