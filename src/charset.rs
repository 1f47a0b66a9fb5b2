//! Charset adapter.
//!
//! Wraps [`encoding_rs`] the way the original tool wrapped iconv: labels
//! are resolved at call time, equal labels short-circuit to a plain copy,
//! and any failure is logged while the caller keeps its original bytes.

use encoding_rs::Encoding;
use log::*;

/// Default character set for most browsers, assumed when the caller
/// supplies no encoding label.
pub const DEFAULT_ENCODING: &str = "iso-8859-1";

/// Checks whether `s` contains any byte outside the ASCII range.
#[inline]
pub fn needs_encoding(s: &[u8]) -> bool {
	s.iter().any(|&b| b >= 0x80)
}

/// Convert `src` from `from` to `to`.
///
/// Labels are compared ASCII-case-insensitively; equal labels return a
/// copy of `src` without validation. A missing label defaults to
/// [`DEFAULT_ENCODING`]. Returns `None` when a label is unknown, the
/// input is malformed under `from`, or the output is unmappable under
/// `to`; the caller is expected to keep its original bytes in that case.
pub fn transcode(src: &[u8], from: Option<&str>, to: Option<&str>) -> Option<Vec<u8>> {
	let from = from.unwrap_or(DEFAULT_ENCODING);
	let to = to.unwrap_or(DEFAULT_ENCODING);

	if from.eq_ignore_ascii_case(to) {
		return Some(src.to_vec());
	}

	let from_enc = match Encoding::for_label(from.as_bytes()) {
		Some(enc) => enc,
		None => {
			error!("failed to prepare encoding '{from}' into '{to}'");
			return None;
		}
	};
	let to_enc = match Encoding::for_label(to.as_bytes()) {
		Some(enc) => enc,
		None => {
			error!("failed to prepare encoding '{from}' into '{to}'");
			return None;
		}
	};

	let decoded = match from_enc.decode_without_bom_handling_and_without_replacement(src) {
		Some(s) => s,
		None => {
			error!("failed to convert '{from}' string into '{to}'");
			return None;
		}
	};

	if to_enc == encoding_rs::UTF_8 {
		debug!(
			"converted '{}' ({from}) -> '{decoded}' ({to})",
			String::from_utf8_lossy(src)
		);
		return Some(decoded.into_owned().into_bytes());
	}

	let (out, _, had_errors) = to_enc.encode(&decoded);
	if had_errors {
		error!("failed to convert '{from}' string into '{to}'");
		return None;
	}

	debug!(
		"converted '{}' ({from}) -> '{}' ({to})",
		String::from_utf8_lossy(src),
		String::from_utf8_lossy(&out)
	);
	Some(out.into_owned())
}

/// Convert `src` from the given source encoding into UTF-8.
#[inline]
pub fn to_utf8(src: &[u8], encoding: Option<&str>) -> Option<Vec<u8>> {
	transcode(src, encoding, Some("utf-8"))
}

/// Convert UTF-8 `src` into the given destination encoding.
#[inline]
pub fn from_utf8(src: &[u8], encoding: Option<&str>) -> Option<Vec<u8>> {
	transcode(src, Some("utf-8"), encoding)
}
