//! IRI/URI processing for HTTP(S) retrieval tools.
//!
//! This crate turns raw user-supplied location strings (possibly in a
//! non-UTF-8 local encoding, possibly containing internationalized domain
//! names, possibly percent-escaped, possibly relative) into a normalized,
//! component-decomposed [`Iri`] that networking code can consume, and
//! reverses that decomposition for on-the-wire use and for deriving
//! local filenames.
//!
//! ```text
//!     http://user@example.com:8042/over/there?name=ferret#nose
//!     \__/   \___________________/\_________/ \_________/ \__/
//!      |              |                |           |        |
//!   scheme        authority           path       query   fragment
//! ```
//!
//! ## Parsing
//!
//! [`Iri::parse`] percent-unescapes its input, transcodes it to UTF-8
//! when it carries non-ASCII bytes (ISO-8859-1 is assumed when no source
//! encoding is given), splits it into components, lowercases the host,
//! converts internationalized hosts to their ASCII form and removes dot
//! segments from the path:
//!
//! ```rust
//! use webiri::Iri;
//!
//! # fn main() -> Result<(), webiri::Error> {
//! let iri = Iri::parse("http://Example.COM/a/../b", None)?;
//!
//! assert_eq!(iri.host(), Some(&b"example.com"[..]));
//! assert_eq!(iri.path(), Some(&b"b"[..]));
//! assert_eq!(iri.port(), None);
//! assert_eq!(iri.resolv_port(), Some(&b"80"[..]));
//! # Ok(())
//! # }
//! ```
//!
//! ## Reference resolution
//!
//! Relative references found in documents are merged against their base
//! IRI with [`resolve`], or in one step with [`Iri::parse_with_base`]:
//!
//! ```rust
//! use webiri::Iri;
//!
//! # fn main() -> Result<(), webiri::Error> {
//! let base = Iri::parse("http://a/b/c/d", None)?;
//! let iri = Iri::parse_with_base(Some(&base), "../g", None)?;
//!
//! assert_eq!(iri.uri(), b"http://a/b/g");
//! # Ok(())
//! # }
//! ```
//!
//! ## Escaped views
//!
//! Components are stored unescaped; [`Iri::escaped_host`] and
//! [`Iri::escaped_resource`] re-escape them for the wire, each component
//! under its own character class, while [`Iri::to_path`] and
//! [`Iri::to_filename`] derive local names for fetched documents.
//!
//! ## Robots exclusion
//!
//! [`Robots::parse`] extracts the disallowed paths and sitemap URLs a
//! site advertises for a given user-agent.

pub mod chars;
pub mod charset;
mod iri;
pub mod path;
mod pct;
mod resolve;
mod robots;
mod scheme;

pub use iri::{default_page, set_default_page, Iri};
pub use pct::{escape, escape_path, escape_query, unescape};
pub use resolve::resolve;
pub use robots::Robots;
pub use scheme::Scheme;

/// Parsing and resolution errors.
///
/// Transcoding and IDN failures are not errors: they are logged and the
/// original bytes are kept, so that retrieval can still be attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// The URL was empty (or whitespace only).
	#[error("empty URL")]
	EmptyUrl,

	/// An http or https URL carried no host.
	#[error("missing host/domain in URI '{0}'")]
	MissingHost(String),

	/// A rootless reference was resolved without a base IRI.
	#[error("cannot resolve relative reference without a base IRI")]
	UnresolvedReference,
}
