//! IRI parsing and the parsed [`Iri`] value.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;
use std::sync::{OnceLock, PoisonError, RwLock};

use log::*;

use crate::charset;
use crate::chars;
use crate::path;
use crate::pct;
use crate::resolve::resolve;
use crate::scheme::Scheme;
use crate::Error;

/// The page name appended when a URL resolves to a directory.
///
/// `None` means the initial `"index.html"`. Must be set before any
/// concurrent parse traffic.
static DEFAULT_PAGE: RwLock<Option<Box<str>>> = RwLock::new(None);

/// Set the process-global default page name.
pub fn set_default_page(page: &str) {
	*DEFAULT_PAGE
		.write()
		.unwrap_or_else(PoisonError::into_inner) = Some(page.into());
}

/// The current default page name, initially `"index.html"`.
pub fn default_page() -> String {
	DEFAULT_PAGE
		.read()
		.unwrap_or_else(PoisonError::into_inner)
		.as_deref()
		.unwrap_or("index.html")
		.to_owned()
}

/// The host of a parsed IRI.
///
/// Either a range into the IRI's working buffer (lowercased in place), or
/// the separately owned result of an IDN-to-ASCII conversion. This is the
/// safe rendition of the original's `host_allocated` ownership flag.
enum HostName {
	Spanned(Range<usize>),
	Mapped(Box<str>),
}

/// A parsed, normalized IRI.
///
/// Created by [`Iri::parse`] or [`Iri::parse_with_base`] and immutable
/// afterwards; the only interior mutation is the lazily built
/// [`connection_part`](Iri::connection_part) cache, which sits behind a
/// [`OnceLock`] so values can be shared read-only across threads.
///
/// Components are percent-unescaped and UTF-8-transcoded at parse time
/// and are exposed as borrowed byte slices into a single backing buffer.
/// A second, pristine copy of the (post-transcode, post-unescape) input
/// is kept for diagnostics and is what [`Iri::uri`] and the `Display`
/// implementation show.
///
/// ## Example
///
/// ```rust
/// # fn main() -> Result<(), webiri::Error> {
/// let iri = webiri::Iri::parse("http://Example.COM/a/../b?q#f", None)?;
///
/// assert_eq!(iri.host(), Some(&b"example.com"[..]));
/// assert_eq!(iri.path(), Some(&b"b"[..]));
/// assert_eq!(iri.resolv_port(), Some(&b"80"[..]));
/// # Ok(())
/// # }
/// ```
pub struct Iri {
	/// Pristine copy of the preprocessed input.
	uri: Box<[u8]>,
	/// Working copy the component ranges point into.
	data: Box<[u8]>,
	scheme: Scheme,
	userinfo: Option<Range<usize>>,
	host: Option<HostName>,
	port: Option<Range<usize>>,
	path: Option<Range<usize>>,
	query: Option<Range<usize>>,
	fragment: Option<Range<usize>>,
	connection_part: OnceLock<String>,
}

/// C strings end at the first NUL; a `%00` that unescaped into the buffer
/// clamps it the same way.
fn clamp_at_nul(buf: &mut Vec<u8>) {
	if let Some(i) = buf.iter().position(|&b| b == 0) {
		debug!("URL clamped at embedded NUL byte (offset {i})");
		buf.truncate(i);
	}
}

/// C `atoi`: optional leading whitespace and sign, then leading digits;
/// anything else reads as 0.
fn atoi(s: &[u8]) -> i64 {
	let mut i = 0;
	while i < s.len() && chars::is_space(s[i]) {
		i += 1;
	}

	let negative = match s.get(i) {
		Some(b'-') => {
			i += 1;
			true
		}
		Some(b'+') => {
			i += 1;
			false
		}
		_ => false,
	};

	let mut n: i64 = 0;
	while i < s.len() && s[i].is_ascii_digit() {
		n = n.wrapping_mul(10).wrapping_add((s[i] - b'0') as i64);
		i += 1;
	}

	if negative {
		-n
	} else {
		n
	}
}

fn idn_to_ascii(host: &[u8]) -> Option<String> {
	let host = match std::str::from_utf8(host) {
		Ok(host) => host,
		Err(_) => {
			error!("toASCII failed: host is not valid UTF-8");
			return None;
		}
	};

	match idna::domain_to_ascii(host) {
		Ok(ascii) => {
			debug!("idn '{host}' -> '{ascii}'");
			Some(ascii)
		}
		Err(e) => {
			error!("toASCII failed: {e:?}");
			None
		}
	}
}

impl Iri {
	/// Parse `url` into an [`Iri`].
	///
	/// Leading whitespace is skipped. If the input contains `%` it is
	/// percent-unescaped first; if the (possibly unescaped) text then
	/// still contains non-ASCII bytes it is transcoded to UTF-8 from
	/// `encoding` (ISO-8859-1 when `None`). This ordering matters: a
	/// `%HH` sequence may itself decode into part of a multi-byte UTF-8
	/// character. Transcoding failures keep the original bytes.
	///
	/// A URL without a `scheme://` prefix is taken to be http. For http
	/// and https a missing or empty host is an error.
	pub fn parse<S: AsRef<[u8]> + ?Sized>(url: &S, encoding: Option<&str>) -> Result<Iri, Error> {
		let mut url = url.as_ref();

		if let Some(i) = url.iter().position(|&b| b == 0) {
			url = &url[..i];
		}
		while let Some((&c, rest)) = url.split_first() {
			if !chars::is_space(c) {
				break;
			}
			url = rest;
		}
		if url.is_empty() {
			return Err(Error::EmptyUrl);
		}

		// first unescape, then convert to UTF-8
		let mut buf = url.to_vec();
		if buf.contains(&b'%') {
			pct::unescape(&mut buf);
			clamp_at_nul(&mut buf);
		}
		if charset::needs_encoding(&buf) {
			if let Some(utf8) = charset::to_utf8(&buf, encoding) {
				buf = utf8;
			}
			// on error, use what we have
		}

		let uri: Box<[u8]> = buf.clone().into_boxed_slice();
		let mut data = buf;
		let len = data.len();

		let mut s = 0;
		while s < len && !chars::is_gendelim(data[s]) {
			s += 1;
		}

		let scheme;
		if s + 1 < len && data[s] == b':' && data[s + 1] == b'/' {
			scheme = Scheme::from_bytes(&data[..s]);
			s += 1;
		} else {
			// no scheme: assume http and rewind
			scheme = Scheme::Http;
			s = 0;
		}
		let default_port = scheme.default_port();

		if s + 1 < len && data[s] == b'/' && data[s + 1] == b'/' {
			s += 2;
		}

		// authority
		let authority_start = s;
		while s < len && data[s] != b'/' && data[s] != b'?' && data[s] != b'#' {
			s += 1;
		}
		let authority = authority_start..s;
		let mut delim = 0u8;
		if s < len {
			delim = data[s];
			s += 1;
		}

		// left over: [path][?query][#fragment]
		let mut path_range = None;
		let mut query = None;
		let mut fragment = None;

		if delim == b'/' {
			let start = s;
			while s < len && data[s] != b'?' && data[s] != b'#' {
				s += 1;
			}
			path_range = Some(start..s);
			delim = 0;
			if s < len {
				delim = data[s];
				s += 1;
			}
		}

		if delim == b'?' {
			let start = s;
			while s < len && data[s] != b'#' {
				s += 1;
			}
			query = Some(start..s);
			delim = 0;
			if s < len {
				delim = data[s];
				s += 1;
			}
		}

		if delim == b'#' {
			fragment = Some(s..len);
		}

		let mut userinfo = None;
		let mut host_range: Option<Range<usize>> = None;
		let mut port = None;

		if !authority.is_empty() {
			let mut s = authority.start;
			let end = authority.end;

			if let Some(at) = data[authority].iter().position(|&b| b == b'@') {
				userinfo = Some(s..s + at);
				s += at + 1;
			}

			if s < end && data[s] == b'[' {
				match data[s..end].iter().rposition(|&b| b == b']') {
					Some(close) => {
						host_range = Some(s + 1..s + close);
						s += close + 1;
					}
					None => {
						// something is broken
						host_range = Some(s + 1..end);
						s = end;
					}
				}
			} else {
				let start = s;
				while s < end && data[s] != b':' {
					s += 1;
				}
				host_range = Some(start..s);
			}

			if s < end && data[s] == b':' && s + 1 < end {
				let candidate = s + 1..end;
				let keep = match default_port {
					None => true,
					Some(default) => {
						&data[candidate.clone()] != default.as_bytes()
							&& atoi(&data[candidate.clone()]) != atoi(default.as_bytes())
					}
				};
				if keep {
					port = Some(candidate);
				}
			}
		}

		// host canonicalization: locale-free lowercasing, then IDN
		let host = match host_range {
			Some(range) => {
				data[range.clone()].make_ascii_lowercase();
				if charset::needs_encoding(&data[range.clone()]) {
					match idn_to_ascii(&data[range.clone()]) {
						Some(ascii) => Some(HostName::Mapped(ascii.into_boxed_str())),
						None => Some(HostName::Spanned(range)),
					}
				} else {
					Some(HostName::Spanned(range))
				}
			}
			None => None,
		};

		if matches!(scheme, Scheme::Http | Scheme::Https) {
			let missing = match &host {
				Some(HostName::Spanned(range)) => range.is_empty(),
				Some(HostName::Mapped(mapped)) => mapped.is_empty(),
				None => true,
			};
			if missing {
				let uri = String::from_utf8_lossy(&uri).into_owned();
				error!("missing host/domain in URI '{uri}'");
				return Err(Error::MissingHost(uri));
			}
		}

		if let Some(range) = &mut path_range {
			let new_len = path::normalize(&mut data[range.clone()]);
			range.end = range.start + new_len;
		}

		Ok(Iri {
			uri,
			data: data.into_boxed_slice(),
			scheme,
			userinfo,
			host,
			port,
			path: path_range,
			query,
			fragment,
			connection_part: OnceLock::new(),
		})
	}

	/// Parse `url`, resolving it against `base` first when it is relative.
	///
	/// Fails with [`Error::UnresolvedReference`] when `url` is an
	/// absolute-path reference and no base is given.
	pub fn parse_with_base<S: AsRef<[u8]> + ?Sized>(
		base: Option<&Iri>,
		url: &S,
		encoding: Option<&str>,
	) -> Result<Iri, Error> {
		let mut buf = Vec::new();
		match resolve(base, url.as_ref(), &mut buf) {
			Some(abs) => Iri::parse(abs, encoding),
			None => Err(Error::UnresolvedReference),
		}
	}

	#[inline]
	fn slice(&self, range: &Option<Range<usize>>) -> Option<&[u8]> {
		range.as_ref().map(|r| &self.data[r.clone()])
	}

	/// The scheme; http when the input carried none.
	#[inline]
	pub fn scheme(&self) -> &Scheme {
		&self.scheme
	}

	/// True iff the scheme is one the retrieval tool knows how to speak.
	#[inline]
	pub fn supported(&self) -> bool {
		!matches!(self.scheme, Scheme::Other(_))
	}

	/// The userinfo part of the authority, kept opaque.
	#[inline]
	pub fn userinfo(&self) -> Option<&[u8]> {
		self.slice(&self.userinfo)
	}

	/// The host, lowercased and IDN-mapped to ASCII where possible.
	pub fn host(&self) -> Option<&[u8]> {
		match &self.host {
			Some(HostName::Spanned(range)) => Some(&self.data[range.clone()]),
			Some(HostName::Mapped(mapped)) => Some(mapped.as_bytes()),
			None => None,
		}
	}

	/// The explicit port, absent when it matched the scheme's default.
	#[inline]
	pub fn port(&self) -> Option<&[u8]> {
		self.slice(&self.port)
	}

	/// The port to connect to: the explicit port if any, otherwise the
	/// scheme's default. Absent only for schemes without a default.
	pub fn resolv_port(&self) -> Option<&[u8]> {
		match &self.port {
			Some(range) => Some(&self.data[range.clone()]),
			None => self.scheme.default_port().map(str::as_bytes),
		}
	}

	/// The path, without its leading `/` and with dot segments removed.
	#[inline]
	pub fn path(&self) -> Option<&[u8]> {
		self.slice(&self.path)
	}

	#[inline]
	pub fn query(&self) -> Option<&[u8]> {
		self.slice(&self.query)
	}

	#[inline]
	pub fn fragment(&self) -> Option<&[u8]> {
		self.slice(&self.fragment)
	}

	/// The full unescaped, transcoded input, kept for diagnostics.
	#[inline]
	pub fn uri(&self) -> &[u8] {
		&self.uri
	}

	/// The `"scheme://host[:port]"` prefix, used as a connection pooling
	/// key. Built on first request and cached.
	pub fn connection_part(&self) -> &str {
		self.connection_part.get_or_init(|| {
			let host = String::from_utf8_lossy(self.host().unwrap_or_default());
			let mut tag = String::with_capacity(self.scheme.as_str().len() + host.len() + 10);

			tag.push_str(self.scheme.as_str());
			tag.push_str("://");
			tag.push_str(&host);
			if let Some(port) = self.port() {
				tag.push(':');
				tag.push_str(&String::from_utf8_lossy(port));
			}

			tag
		})
	}

	/// Compare against `other` in RFC 2616 §3.2.3 style.
	///
	/// Path and query compare case-insensitively, then scheme, port and
	/// host decide; the fragment is deliberately ignored.
	pub fn compare(&self, other: &Iri) -> Ordering {
		fn casecmp(a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
			match (a, b) {
				(Some(a), Some(b)) => a
					.iter()
					.map(u8::to_ascii_lowercase)
					.cmp(b.iter().map(u8::to_ascii_lowercase)),
				(None, None) => Ordering::Equal,
				(None, Some(_)) => Ordering::Less,
				(Some(_), None) => Ordering::Greater,
			}
		}

		fn bytecmp(a: Option<&[u8]>, b: Option<&[u8]>) -> Ordering {
			match (a, b) {
				(Some(a), Some(b)) => a.cmp(b),
				(None, None) => Ordering::Equal,
				(None, Some(_)) => Ordering::Less,
				(Some(_), None) => Ordering::Greater,
			}
		}

		match casecmp(self.path(), other.path()) {
			Ordering::Equal => (),
			ordering => return ordering,
		}

		match casecmp(self.query(), other.query()) {
			Ordering::Equal => (),
			ordering => return ordering,
		}

		if self.scheme != other.scheme {
			return self.scheme.cmp(&other.scheme);
		}

		if self.port() != other.port() {
			match bytecmp(self.port(), other.port()) {
				Ordering::Equal => (),
				ordering => return ordering,
			}
		}

		// host is already lowercase
		bytecmp(self.host(), other.host())
	}

	/// The host with every non-unreserved byte percent-escaped.
	pub fn escaped_host<'a>(&self, buf: &'a mut String) -> &'a str {
		pct::escape(self.host().unwrap_or_default(), buf)
	}

	/// The on-the-wire resource: escaped path, then `?` and the escaped
	/// query, then `#` and the escaped fragment, each part only when
	/// present.
	pub fn escaped_resource<'a>(&self, buf: &'a mut String) -> &'a str {
		if let Some(path) = self.path() {
			pct::escape_path(path, buf);
		}

		if let Some(query) = self.query() {
			buf.push('?');
			pct::escape_query(query, buf);
		}

		if let Some(fragment) = self.fragment() {
			buf.push('#');
			pct::escape(fragment, buf);
		}

		buf
	}

	/// Append the local path derived from this IRI to `buf`.
	///
	/// The path is `/`-prefixed (or `/`-separated from what `buf` already
	/// holds) and transcoded from UTF-8 to `encoding` when one is given;
	/// a directory-like result gets the default page appended.
	pub fn to_path<'a>(&self, buf: &'a mut Vec<u8>, encoding: Option<&str>) -> &'a [u8] {
		buf.push(b'/');

		if let Some(path) = self.path() {
			let local = local_encoded(path, encoding);
			buf.extend_from_slice(&local);
		}

		if buf.is_empty() || buf.last() == Some(&b'/') {
			buf.extend_from_slice(default_page().as_bytes());
		}

		buf
	}

	/// Append the local filename derived from this IRI to `buf`: the last
	/// path segment (or the default page), then the query as a filename
	/// suffix.
	pub fn to_filename<'a>(&self, buf: &'a mut Vec<u8>, encoding: Option<&str>) -> &'a [u8] {
		if let Some(path) = self.path() {
			let name = match path.iter().rposition(|&b| b == b'/') {
				Some(i) => &path[i + 1..],
				None => path,
			};
			let local = local_encoded(name, encoding);
			buf.extend_from_slice(&local);
		}

		if buf.is_empty() || buf.last() == Some(&b'/') {
			buf.extend_from_slice(default_page().as_bytes());
		}

		self.query_as_filename(buf, encoding)
	}

	/// Append `?` and the query, transcoded and with any `/` replaced by
	/// `%2F` so the result stays a single path component.
	pub fn query_as_filename<'a>(&self, buf: &'a mut Vec<u8>, encoding: Option<&str>) -> &'a [u8] {
		if let Some(query) = self.query() {
			buf.push(b'?');

			let local = local_encoded(query, encoding);
			let mut begin = 0;
			for (i, &c) in local.iter().enumerate() {
				if c == b'/' {
					buf.extend_from_slice(&local[begin..i]);
					buf.extend_from_slice(b"%2F");
					begin = i + 1;
				}
			}
			buf.extend_from_slice(&local[begin..]);
		}

		buf
	}
}

/// Transcode UTF-8 `src` for local use under `encoding`; failures and the
/// UTF-8 case keep the bytes as they are.
fn local_encoded<'a>(src: &'a [u8], encoding: Option<&str>) -> Cow<'a, [u8]> {
	match encoding {
		Some(enc) if !enc.eq_ignore_ascii_case("utf-8") => {
			match charset::from_utf8(src, Some(enc)) {
				Some(out) => Cow::Owned(out),
				None => Cow::Borrowed(src),
			}
		}
		_ => Cow::Borrowed(src),
	}
}

impl fmt::Display for Iri {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		String::from_utf8_lossy(&self.uri).fmt(f)
	}
}

impl fmt::Debug for Iri {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "Iri({})", String::from_utf8_lossy(&self.uri))
	}
}
