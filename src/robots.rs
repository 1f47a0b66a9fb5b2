//! Robots Exclusion file parser.
//!
//! Parses a robots.txt body into the list of paths disallowed for a given
//! client and the advertised sitemap URLs. Only the `User-agent:`,
//! `Disallow:` and `Sitemap:` directives are recognized; `Allow:`,
//! `Crawl-delay:`, `Host:` and `Clean-param:` are reserved and ignored,
//! as are comments and anything else.

use crate::chars;

#[inline]
fn starts_with_ignore_case(s: &[u8], prefix: &[u8]) -> bool {
	s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[inline]
fn skip_blank(mut s: &[u8]) -> &[u8] {
	while let [b' ' | b'\t', rest @ ..] = s {
		s = rest;
	}
	s
}

#[inline]
fn token(s: &[u8]) -> &[u8] {
	let end = s
		.iter()
		.position(|&b| chars::is_space(b))
		.unwrap_or(s.len());
	&s[..end]
}

/// The relevant content of a robots.txt file for one client.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Robots {
	paths: Vec<String>,
	sitemaps: Vec<String>,
}

impl Robots {
	/// Parse a robots.txt body for the given client name.
	///
	/// A `User-agent:` line opens collection when its value matches
	/// `client` as an ASCII-case-insensitive prefix, or is `*`; the next
	/// agent line closes it again. An empty `Disallow:` inside an open
	/// block means "all allowed" and discards previously collected
	/// paths. `Sitemap:` lines are collected regardless of the current
	/// block. Returns `None` for empty input.
	pub fn parse(data: &[u8], client: Option<&str>) -> Option<Robots> {
		if data.is_empty() {
			return None;
		}

		let mut robots = Robots::default();
		// 0 = searching, 1 = in a matching block, 2 = done collecting
		let mut collect = 0;

		for line in data.split(|&b| b == b'\n') {
			if collect < 2 && starts_with_ignore_case(line, b"User-agent:") {
				if collect == 0 {
					let value = skip_blank(&line[11..]);
					if let Some(client) = client {
						if starts_with_ignore_case(value, client.as_bytes()) {
							collect = 1;
						}
					}
					if collect == 0 && value.first() == Some(&b'*') {
						collect = 1;
					}
				} else {
					collect = 2;
				}
			} else if collect == 1 && starts_with_ignore_case(line, b"Disallow:") {
				let value = skip_blank(&line[9..]);
				if value.is_empty() || value[0] == b'\r' {
					// all allowed
					robots.paths.clear();
					collect = 2;
				} else {
					robots
						.paths
						.push(String::from_utf8_lossy(token(value)).into_owned());
				}
			} else if starts_with_ignore_case(line, b"Sitemap:") {
				let value = skip_blank(&line[8..]);
				robots
					.sitemaps
					.push(String::from_utf8_lossy(token(value)).into_owned());
			}
		}

		Some(robots)
	}

	/// The disallowed paths, in file order.
	#[inline]
	pub fn paths(&self) -> &[String] {
		&self.paths
	}

	/// The advertised sitemap URLs, in file order.
	#[inline]
	pub fn sitemaps(&self) -> &[String] {
		&self.sitemaps
	}
}
