//! Reference resolution.
//!
//! Merges a (possibly relative) reference against a base IRI and emits a
//! well-formed absolute URI into a caller buffer. The output is meant to
//! be fed back into [`Iri::parse`](crate::Iri::parse).

use log::*;
use smallvec::SmallVec;

use crate::iri::Iri;
use crate::path;

/// Stack space for the scratch copy of an absolute-path reference; longer
/// references spill to the heap.
const RESOLVE_BUFFER_LEN: usize = 256;

/// Resolve `reference` against `base`, writing the absolute form into `buf`.
///
/// Returns the resolved bytes, either borrowed from `buf` or, when no
/// rewriting is needed, from `reference` itself. Returns `None` for an
/// absolute-path or network-path reference without a base.
pub fn resolve<'a>(base: Option<&Iri>, reference: &'a [u8], buf: &'a mut Vec<u8>) -> Option<&'a [u8]> {
	if reference.first() == Some(&b'/') {
		let base = base?;
		let mut tmp: SmallVec<[u8; RESOLVE_BUFFER_LEN]> = SmallVec::from_slice(reference);

		buf.clear();
		if reference.len() >= 2 && reference[1] == b'/' {
			// network-path reference: //authority/path...
			if let Some(i) = tmp.iter().skip(2).position(|&b| b == b'/') {
				let offset = 2 + i + 1;
				let len = path::normalize(&mut tmp[offset..]);
				tmp.truncate(offset + len);
			}

			buf.extend_from_slice(base.scheme().as_str().as_bytes());
			buf.push(b':');
			buf.extend_from_slice(&tmp);
		} else {
			// absolute path
			let len = path::normalize(&mut tmp);
			tmp.truncate(len);

			buf.extend_from_slice(base.connection_part().as_bytes());
			buf.push(b'/');
			buf.extend_from_slice(&tmp);
		}

		debug!("resolved to '{}'", String::from_utf8_lossy(buf));
		Some(buf.as_slice())
	} else if reference.contains(&b':') {
		// absolute URI, copied verbatim
		buf.clear();
		buf.extend_from_slice(reference);
		Some(buf.as_slice())
	} else if let Some(base) = base {
		// relative path, merged onto the base directory
		buf.clear();
		buf.extend_from_slice(base.connection_part().as_bytes());
		buf.push(b'/');

		let tail = buf.len();

		if let Some(base_path) = base.path() {
			if let Some(i) = base_path.iter().rposition(|&b| b == b'/') {
				buf.extend_from_slice(&base_path[..=i]);
			}
		}
		buf.extend_from_slice(reference);

		let len = path::normalize(&mut buf[tail..]);
		buf.truncate(tail + len);

		debug!("resolved to '{}'", String::from_utf8_lossy(buf));
		Some(buf.as_slice())
	} else {
		Some(reference)
	}
}
