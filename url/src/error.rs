//! Error catalogues for the three fallible layers: the top-level parser,
//! the host sub-parser, and the IPv4/IPv6 literal parsers.
//!
//! Fatal errors abort a parse outright (see [`ParseError`]); everything else
//! is a [`ValidationError`], which is collected but does not stop the parse.

use error_derive::Error;

/// A fatal failure of the top-level URL parser. Returned by [`crate::parse`]
/// and wrapped in the `Err` side of [`crate::parse_with_errors`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[msg = "relative URL without a base"]
    MissingScheme,
    #[msg = "invalid scheme start character"]
    InvalidSchemeStart,
    #[msg = "port number out of range"]
    PortOutOfRange,
    #[msg = "port contains a non-digit"]
    PortInvalid,
    #[msg = "special scheme requires a non-empty host"]
    EmptyHost,
    #[msg = "host parsing failed"]
    HostParser(HostParseError),
    #[msg = "credentials terminator '@' found with nothing before it"]
    MissingCredentials,
    #[msg = "input is not valid UTF-8 where a unicode component was expected"]
    InvalidUtf8,
}

/// Failure of [`crate::host::parse_host`].
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum HostParseError {
    #[msg = "host is empty"]
    EmptyHost,
    #[msg = "host contains a forbidden host code point"]
    ForbiddenHostCodePoint,
    #[msg = "IPv6 literal is missing its closing ']'"]
    UnclosedIpv6,
    #[msg = "invalid IPv4 address"]
    Ipv4(Ipv4Error),
    #[msg = "invalid IPv6 address"]
    Ipv6(Ipv6Error),
}

/// Failure of the lenient IPv4 literal parser (used both for bare IPv4 hosts
/// and, with stricter settings, for the dotted tail of an IPv6 literal).
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum Ipv4Error {
    #[msg = "IPv4 address has too many parts"]
    TooManyPieces,
    #[msg = "IPv4 address part overflows its allotted width"]
    PieceOverflows,
    #[msg = "IPv4 address part uses an unsupported radix"]
    UnsupportedRadix,
    #[msg = "IPv4 address part contains an invalid character"]
    InvalidCharacter,
    #[msg = "IPv4 address part begins with an invalid character"]
    PieceBeginsWithInvalidCharacter,
}

/// Failure of the IPv6 literal parser.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum Ipv6Error {
    #[msg = "IPv6 address starts with a lone ':'"]
    UnexpectedLeadingColon,
    #[msg = "IPv6 address ends with a lone ':'"]
    UnexpectedTrailingColon,
    #[msg = "unexpected character in IPv6 address"]
    UnexpectedCharacter,
    #[msg = "IPv6 address has more than one '::' compression"]
    MultipleCompressedPieces,
    #[msg = "IPv4 tail is not in the last two pieces of the IPv6 address"]
    InvalidPositionForIpv4Address,
    #[msg = "IPv6 address does not have enough pieces"]
    NotEnoughPieces,
    #[msg = "IPv6 address has too many pieces"]
    TooManyPieces,
    #[msg = "embedded IPv4 address is invalid"]
    InvalidIpv4Address(Ipv4Error),
    #[msg = "IPv6 address is empty"]
    EmptyInput,
}

/// A non-fatal violation reported while scanning or constructing a URL. The
/// parse still succeeds; these exist so strict callers (linters, the WPT
/// conformance suite) can tell a merely-unusual URL from the canonical
/// serialization the parser settled on.
///
/// Collected via [`crate::parse_with_errors`]; ignored by [`crate::parse`].
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ValidationError {
    /// Leading or trailing C0 control or space was trimmed from the input.
    ///
    /// ## Example
    /// `"  http://example.com  "` trims to `"http://example.com"`.
    #[msg = "input had leading or trailing C0 control or space"]
    UnexpectedC0ControlOrSpace,
    /// A tab or newline was present and silently skipped.
    ///
    /// ## Example
    /// `"ht\ntp://example.com"` scans the same as `"http://example.com"`.
    #[msg = "input contained a tab or newline"]
    UnexpectedAsciiTabOrNewline,
    /// A `file:` URL's scheme was not immediately followed by `/` or `\`.
    ///
    /// ## Example
    /// `"file:c:/a"` is missing the solidus after `file:`.
    #[msg = "file scheme not followed by a solidus"]
    FileSchemeMissingFollowingSolidus,
    /// The scheme contains bytes outside `[a-zA-Z0-9+\-.]` or does not start
    /// with an ASCII letter.
    #[msg = "invalid scheme"]
    InvalidScheme,
    /// A relative URL's authority-bearing body did not begin with `/`.
    #[msg = "relative URL missing its beginning solidus"]
    RelativeUrlMissingBeginningSolidus,
    /// A `\` was used where `/` was expected (only meaningful for special
    /// schemes, which treat the two interchangeably).
    #[msg = "unexpected reverse solidus"]
    UnexpectedReverseSolidus,
    /// A special URL's authority was not introduced by `//`.
    #[msg = "missing solidus before authority"]
    MissingSolidusBeforeAuthority,
    /// A literal `@` appeared inside the authority after credentials were
    /// already terminated.
    #[msg = "unexpected '@' in authority"]
    UnexpectedCommercialAt,
    /// A `:` introduced a port but no host preceded it.
    #[msg = "port without host"]
    UnexpectedPortWithoutHost,
    /// A Windows drive letter appeared where a path segment was expected.
    #[msg = "unexpected Windows drive letter in path"]
    UnexpectedWindowsDriveLetter,
    /// A Windows drive letter appeared in host position of a `file:` URL.
    #[msg = "unexpected Windows drive letter in host"]
    UnexpectedWindowsDriveLetterHost,
    /// A `file:` URL had a non-empty host alongside a drive-letter path.
    #[msg = "unexpected non-empty host for file scheme"]
    UnexpectedHostFileScheme,
    /// Consecutive empty path segments were collapsed on a `file:` URL.
    #[msg = "unexpected empty path segment"]
    UnexpectedEmptyPath,
    /// A byte outside the URL code-point set appeared unescaped.
    #[msg = "invalid URL code point"]
    InvalidUrlCodePoint,
    /// A `%` was not followed by two hex digits.
    #[msg = "unescaped '%' not followed by two hex digits"]
    UnescapedPercentSign,
}
