//! The [`Url`] value type: a contiguous serialized byte buffer plus a
//! fixed-size header of component lengths (§3.1), and the construction
//! pass that turns a [`crate::scan::ScanMap`] into one.
//!
//! Grounded on the reference browser engine's `crates/url/src/url.rs`,
//! which stores a `URL` as `serialization: ascii::String` plus cumulative
//! offset fields (`scheme_end`, `username_start`, ...). We keep the single
//! contiguous buffer idea but store component *lengths* rather than
//! cumulative offsets, since every separator between components (`://`,
//! `@`, the port's `:`) is either a fixed literal or already folded into a
//! neighboring component's stored length (see the doc comment on
//! [`Url::username`] and friends for which).

use crate::ascii;
use crate::error::ValidationError;
use crate::host::Host;
use crate::percent;
use crate::scan::ScanMap;

/// The classification of a URL's scheme. Special schemes get a default
/// port, mandatory non-empty hosts (except `file`), and backslash-as-slash
/// leniency; `Other` schemes get none of that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    Ftp,
    Http,
    Https,
    Ws,
    Wss,
    File,
    Other,
}

impl SchemeKind {
    pub fn from_bytes(scheme: &[u8]) -> Self {
        match scheme {
            b"ftp" => Self::Ftp,
            b"http" => Self::Http,
            b"https" => Self::Https,
            b"ws" => Self::Ws,
            b"wss" => Self::Wss,
            b"file" => Self::File,
            _ => Self::Other,
        }
    }

    pub fn is_special(&self) -> bool {
        !matches!(self, Self::Other)
    }

    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Ftp => Some(21),
            Self::Http | Self::Ws => Some(80),
            Self::Https | Self::Wss => Some(443),
            Self::File | Self::Other => None,
        }
    }
}

/// A component selector for [`Url::component_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Scheme,
    Username,
    Password,
    Hostname,
    Port,
    Path,
    Query,
    Fragment,
    Authority,
}

/// A parsed, normalized, immutable URL: one contiguous byte buffer holding
/// the canonical serialization, plus a header of component lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    buffer: Vec<u8>,
    scheme_kind: SchemeKind,
    cannot_be_a_base_url: bool,
    has_authority: bool,
    host: Host,
    port: Option<u16>,

    scheme_len: usize,
    username_len: usize,
    /// Includes the leading `:`; 0 when the password is absent or empty.
    password_len: usize,
    host_len: usize,
    /// Includes the leading `:`; 0 when the port is absent (equal to the
    /// scheme default, or not given).
    port_len: usize,
    path_len: usize,
    /// Includes the leading `?`; 0 when the query is absent.
    query_len: usize,
    /// Includes the leading `#`; 0 when the fragment is absent.
    fragment_len: usize,
}

impl Url {
    pub fn scheme_kind(&self) -> SchemeKind {
        self.scheme_kind
    }

    pub fn cannot_be_a_base_url(&self) -> bool {
        self.cannot_be_a_base_url
    }

    pub fn has_authority(&self) -> bool {
        self.has_authority
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The scheme, lowercase, without the trailing `:`.
    pub fn scheme(&self) -> &[u8] {
        &self.buffer[0..self.scheme_len]
    }

    fn authority_start(&self) -> usize {
        // scheme + ':' + "//"
        self.scheme_len + 1 + if self.has_authority { 2 } else { 0 }
    }

    /// The username, with no leading separator. Empty when absent.
    pub fn username(&self) -> &[u8] {
        let start = self.authority_start();
        &self.buffer[start..start + self.username_len]
    }

    /// The password, *including* its leading `:`. Empty when absent.
    pub fn password(&self) -> &[u8] {
        let start = self.authority_start() + self.username_len;
        &self.buffer[start..start + self.password_len]
    }

    fn has_credentials(&self) -> bool {
        self.username_len > 0 || self.password_len > 0
    }

    fn host_start(&self) -> usize {
        self.authority_start()
            + self.username_len
            + self.password_len
            + if self.has_credentials() { 1 } else { 0 }
    }

    /// The serialized hostname (no brackets stripped for IPv6 — they're
    /// part of the stored bytes, matching the wire form).
    pub fn hostname(&self) -> &[u8] {
        let start = self.host_start();
        &self.buffer[start..start + self.host_len]
    }

    /// The port, *including* its leading `:`. Empty when absent.
    pub fn port_bytes(&self) -> &[u8] {
        let start = self.host_start() + self.host_len;
        &self.buffer[start..start + self.port_len]
    }

    fn path_start(&self) -> usize {
        self.host_start() + self.host_len + self.port_len
    }

    /// The path, including its leading `/` for non-opaque paths.
    pub fn path(&self) -> &[u8] {
        let start = self.path_start();
        &self.buffer[start..start + self.path_len]
    }

    fn query_start(&self) -> usize {
        self.path_start() + self.path_len
    }

    /// The query, including its leading `?`. Empty when absent.
    pub fn query(&self) -> &[u8] {
        let start = self.query_start();
        &self.buffer[start..start + self.query_len]
    }

    fn fragment_start(&self) -> usize {
        self.query_start() + self.query_len
    }

    /// The fragment, including its leading `#`. Empty when absent.
    pub fn fragment(&self) -> &[u8] {
        let start = self.fragment_start();
        &self.buffer[start..start + self.fragment_len]
    }

    /// The authority (`user:pass@host:port`), or an empty slice when there
    /// is none.
    pub fn authority(&self) -> &[u8] {
        if !self.has_authority {
            return &[];
        }
        let start = self.authority_start();
        let end = self.host_start() + self.host_len + self.port_len;
        &self.buffer[start..end]
    }

    /// The canonical serialized form. `exclude_fragment` drops the
    /// trailing `#fragment`, if any.
    pub fn serialize(&self, exclude_fragment: bool) -> Vec<u8> {
        if exclude_fragment && self.fragment_len > 0 {
            self.buffer[..self.fragment_start()].to_vec()
        } else {
            self.buffer.clone()
        }
    }

    pub fn component_bytes(&self, component: Component) -> Option<&[u8]> {
        let bytes = match component {
            Component::Scheme => self.scheme(),
            Component::Username => self.username(),
            Component::Password => self.password(),
            Component::Hostname => self.hostname(),
            Component::Port => self.port_bytes(),
            Component::Path => self.path(),
            Component::Query => self.query(),
            Component::Fragment => self.fragment(),
            Component::Authority => self.authority(),
        };
        if matches!(
            component,
            Component::Password | Component::Port | Component::Query | Component::Fragment | Component::Authority
        ) && bytes.is_empty()
            && !(component == Component::Authority && self.has_authority)
        {
            return None;
        }
        Some(bytes)
    }

    /// Path segments split on `/`, with no leading empty element — used by
    /// relative-resolution merging and by [`crate::scan`] to assemble a new
    /// URL's path against this one as the base.
    pub(crate) fn base_path_segments(&self) -> Vec<Vec<u8>> {
        if self.path_len == 0 {
            return Vec::new();
        }
        self.path()[1..].split(|&b| b == b'/').map(|s| s.to_vec()).collect()
    }
}

/// Builds the final [`Url`] from a completed scan, applying per-component
/// percent-encoding and path normalization (§4.5.3, §4.5.4).
///
/// Path normalization runs *before* the host is committed to the buffer:
/// a `file:` URL whose first resolved path segment is a Windows drive
/// letter clears a non-empty host (§4.5.4's `unexpected_host_file_scheme`
/// case), so the host bytes can't be finalized until normalization has had
/// a chance to veto them.
pub(crate) fn construct(map: ScanMap, errors: &mut Vec<ValidationError>) -> Url {
    let scheme_len = map.scheme.len();
    let has_authority = map.authority.is_some() || map.scheme_kind == SchemeKind::File;

    let mut username_bytes = Vec::new();
    let mut password_bytes = Vec::new(); // includes the leading ':' when present
    let mut host = Host::Empty;
    let mut host_bytes = Vec::new();
    let mut port = None;
    let mut port_bytes = Vec::new();

    if let Some(auth) = &map.authority {
        username_bytes = percent::encode(&auth.username, &percent::USER_INFO);

        if let Some(p) = auth.password.as_ref().filter(|p| !p.is_empty()) {
            password_bytes.push(b':');
            password_bytes.extend_from_slice(&percent::encode(p, &percent::USER_INFO));
        }

        host = auth.host.clone();
        host_bytes = host.serialize();
        if map.scheme_kind == SchemeKind::File && host_bytes == b"localhost" {
            host_bytes.clear();
            host = Host::Empty;
        }

        port = auth.port;
        if let Some(p) = port {
            if Some(p) != map.scheme_kind.default_port() {
                port_bytes = format!(":{p}").into_bytes();
            }
        }
    }

    let has_credentials = !username_bytes.is_empty() || !password_bytes.is_empty();

    let mut path_bytes = Vec::new();
    if map.cannot_be_a_base_url {
        let opaque = map.raw_path_segments.first().cloned().unwrap_or_default();
        path_bytes = percent::encode(&opaque, &percent::C0);
    } else {
        let host_was_empty = host.is_empty();
        if write_normalized_path(&mut path_bytes, &map, host_was_empty, errors) {
            host = Host::Empty;
            host_bytes.clear();
        }
        if path_bytes.is_empty() && map.scheme_kind.is_special() {
            path_bytes.push(b'/');
        }
    }

    let mut buffer =
        Vec::with_capacity(scheme_len + 3 + host_bytes.len() + path_bytes.len() + map.query.as_ref().map_or(0, Vec::len) + 16);

    buffer.extend_from_slice(&map.scheme);
    buffer.push(b':');
    if has_authority {
        buffer.extend_from_slice(b"//");
    }
    buffer.extend_from_slice(&username_bytes);
    buffer.extend_from_slice(&password_bytes);
    if has_credentials {
        buffer.push(b'@');
    }
    buffer.extend_from_slice(&host_bytes);
    buffer.extend_from_slice(&port_bytes);
    let path_start = buffer.len();
    buffer.extend_from_slice(&path_bytes);
    let path_len = buffer.len() - path_start;

    let query_start = buffer.len();
    if let Some(query) = &map.query {
        buffer.push(b'?');
        let set = if map.scheme_kind.is_special() {
            &percent::QUERY_SPECIAL
        } else {
            &percent::QUERY_NONSPECIAL
        };
        errors.extend(percent::validate_percent_escapes(query));
        percent::encode_stream(query, set, |chunk| buffer.extend_from_slice(chunk));
    }
    let query_len = buffer.len() - query_start;

    let fragment_start = buffer.len();
    if let Some(fragment) = &map.fragment {
        buffer.push(b'#');
        errors.extend(percent::validate_percent_escapes(fragment));
        percent::encode_stream(fragment, &percent::FRAGMENT, |chunk| buffer.extend_from_slice(chunk));
    }
    let fragment_len = buffer.len() - fragment_start;

    Url {
        buffer,
        scheme_kind: map.scheme_kind,
        cannot_be_a_base_url: map.cannot_be_a_base_url,
        has_authority,
        host,
        port,
        scheme_len,
        username_len: username_bytes.len(),
        password_len: password_bytes.len(),
        host_len: host_bytes.len(),
        port_len: port_bytes.len(),
        path_len,
        query_len,
        fragment_len,
    }
}

/// Walks the raw (unencoded, unsplit-by-base) segment list, applying
/// dot-segment resolution and Windows drive-letter handling, and writes
/// the normalized, percent-encoded path straight into `buffer` (§4.5.4).
/// Returns `true` if a drive-letter first segment requires the caller to
/// clear an already-established non-empty host.
fn write_normalized_path(buffer: &mut Vec<u8>, map: &ScanMap, host_was_empty: bool, errors: &mut Vec<ValidationError>) -> bool {
    let is_file = map.scheme_kind == SchemeKind::File;
    let mut emitted: Vec<Vec<u8>> = Vec::new();
    let mut clear_host = false;
    let segments = &map.raw_path_segments;

    for (i, segment) in segments.iter().enumerate() {
        let is_last = i + 1 == segments.len();

        if ascii::is_double_dot_segment(segment) {
            let popped_drive_letter = is_file
                && emitted.len() == 1
                && ascii::is_normalized_windows_drive_letter(&emitted[0]);
            if !popped_drive_letter {
                emitted.pop();
            }
            if is_last {
                emitted.push(Vec::new());
            }
            continue;
        }

        if ascii::is_single_dot_segment(segment) {
            if is_last {
                emitted.push(Vec::new());
            }
            continue;
        }

        if is_file && emitted.is_empty() && ascii::is_windows_drive_letter(segment) {
            let mut normalized = segment.clone();
            normalized[1] = b':';
            emitted.push(normalized);
            if !host_was_empty {
                errors.push(ValidationError::UnexpectedHostFileScheme);
                clear_host = true;
            }
            continue;
        }

        if is_file && !emitted.is_empty() && ascii::is_windows_drive_letter(segment) {
            errors.push(ValidationError::UnexpectedWindowsDriveLetter);
        }

        emitted.push(segment.clone());
    }

    if is_file {
        // Collapse consecutive leading empty segments, per the file path
        // edge case in §4.5.4.
        let mut leading_empty = 0;
        while leading_empty + 1 < emitted.len() && emitted[leading_empty].is_empty() {
            leading_empty += 1;
        }
        if leading_empty > 0 {
            errors.push(ValidationError::UnexpectedEmptyPath);
            emitted.drain(0..leading_empty);
        }
    }

    for segment in &emitted {
        buffer.push(b'/');
        percent::encode_stream(segment, &percent::PATH, |chunk| buffer.extend_from_slice(chunk));
    }

    clear_host
}
