use std::cmp::Ordering;

use webiri::{Error, Iri, Robots, Scheme};

#[test]
fn components() {
	let iri = Iri::parse("http://user:pw@example.com:8080/a/b?q=1#frag", None).unwrap();

	assert_eq!(*iri.scheme(), Scheme::Http);
	assert_eq!(iri.userinfo(), Some(&b"user:pw"[..]));
	assert_eq!(iri.host(), Some(&b"example.com"[..]));
	assert_eq!(iri.port(), Some(&b"8080"[..]));
	assert_eq!(iri.resolv_port(), Some(&b"8080"[..]));
	assert_eq!(iri.path(), Some(&b"a/b"[..]));
	assert_eq!(iri.query(), Some(&b"q=1"[..]));
	assert_eq!(iri.fragment(), Some(&b"frag"[..]));
	assert_eq!(iri.uri(), b"http://user:pw@example.com:8080/a/b?q=1#frag");
}

#[test]
fn host_is_lowercased_and_path_normalized() {
	let iri = Iri::parse("http://Example.COM/a/../b", None).unwrap();

	assert_eq!(*iri.scheme(), Scheme::Http);
	assert_eq!(iri.host(), Some(&b"example.com"[..]));
	assert_eq!(iri.path(), Some(&b"b"[..]));
	assert_eq!(iri.port(), None);
	assert_eq!(iri.resolv_port(), Some(&b"80"[..]));
}

#[test]
fn host_never_contains_uppercase() {
	let urls = [
		"http://WWW.EXAMPLE.COM/",
		"https://MiXeD.CaSe.Org:8443/x",
		"HTTP://UPPER.SCHEME.NET",
	];

	for url in &urls {
		let iri = Iri::parse(url, None).unwrap();
		let host = iri.host().expect("no host");
		assert!(
			!host.iter().any(u8::is_ascii_uppercase),
			"uppercase left in host of '{url}'"
		);
	}
}

#[test]
fn default_port_is_suppressed() {
	let tests: &[(&str, Option<&[u8]>, Option<&[u8]>)] = &[
		("http://example.com/x", None, Some(b"80")),
		("http://example.com:80/x", None, Some(b"80")),
		("http://example.com:0080/x", None, Some(b"80")),
		("https://example.com:443/x", None, Some(b"443")),
		("https://example.com:444/x", Some(b"444"), Some(b"444")),
		("http://example.com:8080/x", Some(b"8080"), Some(b"8080")),
	];

	for (url, port, resolv_port) in tests {
		let iri = Iri::parse(url, None).unwrap();
		assert_eq!(iri.port(), *port, "port of '{url}'");
		assert_eq!(iri.resolv_port(), *resolv_port, "resolv_port of '{url}'");
	}
}

#[test]
fn missing_scheme_defaults_to_http() {
	let iri = Iri::parse("example.com/path", None).unwrap();

	assert_eq!(*iri.scheme(), Scheme::Http);
	assert!(iri.supported());
	assert_eq!(iri.host(), Some(&b"example.com"[..]));
	assert_eq!(iri.resolv_port(), Some(&b"80"[..]));
}

#[test]
fn unknown_scheme_has_no_default_port() {
	let iri = Iri::parse("ftp://ftp.example.com/pub", None).unwrap();

	assert_eq!(iri.scheme().as_str(), "ftp");
	assert!(!iri.supported());
	assert_eq!(iri.port(), None);
	assert_eq!(iri.resolv_port(), None);

	let iri = Iri::parse("ftp://ftp.example.com:21/pub", None).unwrap();
	assert_eq!(iri.port(), Some(&b"21"[..]));
	assert_eq!(iri.resolv_port(), Some(&b"21"[..]));
}

#[test]
fn ipv6_literals() {
	let iri = Iri::parse("http://[::1]:8080/x", None).unwrap();
	assert_eq!(iri.host(), Some(&b"::1"[..]));
	assert_eq!(iri.port(), Some(&b"8080"[..]));

	let iri = Iri::parse("http://[2001:DB8::1]/x", None).unwrap();
	assert_eq!(iri.host(), Some(&b"2001:db8::1"[..]));
	assert_eq!(iri.port(), None);
	assert_eq!(iri.resolv_port(), Some(&b"80"[..]));
}

#[test]
fn idn_host_is_mapped_to_ascii() {
	let iri = Iri::parse("http://MÜller.de/x", Some("utf-8")).unwrap();
	assert_eq!(iri.host(), Some(&b"xn--mller-kva.de"[..]));
}

#[test]
fn latin1_input_is_transcoded() {
	// 0xFC is u-umlaut in the default browser charset
	let iri = Iri::parse(&b"http://example.com/D\xfcrst"[..], None).unwrap();
	assert_eq!(iri.path(), Some("Dürst".as_bytes()));
}

#[test]
fn malformed_input_is_rejected() {
	assert!(matches!(Iri::parse("", None), Err(Error::EmptyUrl)));
	assert!(matches!(Iri::parse("   ", None), Err(Error::EmptyUrl)));
	assert!(matches!(
		Iri::parse("http://", None),
		Err(Error::MissingHost(_))
	));
	assert!(matches!(
		Iri::parse("http:///foo", None),
		Err(Error::MissingHost(_))
	));
	assert!(matches!(
		Iri::parse("https://user@/foo", None),
		Err(Error::MissingHost(_))
	));
}

#[test]
fn embedded_nul_clamps_the_url() {
	let iri = Iri::parse("http://example.com/foo%00%51", Some("utf-8")).unwrap();
	assert_eq!(iri.path(), Some(&b"foo"[..]));
}

#[test]
fn escaped_slash_joins_the_path() {
	let iri = Iri::parse("http://example.com/a%2Fb/../c", Some("utf-8")).unwrap();
	assert_eq!(iri.path(), Some(&b"a/c"[..]));
}

#[test]
fn boundary_paths() {
	let iri = Iri::parse("http://example.com", None).unwrap();
	assert_eq!(iri.path(), None);

	let iri = Iri::parse("http://example.com/", None).unwrap();
	assert_eq!(iri.path(), Some(&b""[..]));

	// a lone scheme token reads as a host under the http default
	let iri = Iri::parse("http:", None).unwrap();
	assert_eq!(*iri.scheme(), Scheme::Http);
	assert_eq!(iri.host(), Some(&b"http"[..]));
}

#[test]
fn leading_whitespace_is_skipped() {
	let iri = Iri::parse(" \t\nhttp://example.com/x", None).unwrap();
	assert_eq!(iri.host(), Some(&b"example.com"[..]));
	assert_eq!(iri.uri(), b"http://example.com/x");
}

#[test]
fn parsing_is_deterministic() {
	let url = "http://example.com/a/./b?q#f";
	let a = Iri::parse(url, Some("utf-8")).unwrap();
	let b = Iri::parse(url, Some("utf-8")).unwrap();

	assert_eq!(a.uri(), b.uri());
	assert_eq!(a.compare(&b), Ordering::Equal);
}

#[test]
fn connection_part_is_cached_form() {
	let tests = [
		("http://example.com/x", "http://example.com"),
		("http://example.com:8080/x", "http://example.com:8080"),
		("https://example.com:443/x", "https://example.com"),
	];

	for (url, expected) in &tests {
		let iri = Iri::parse(url, None).unwrap();
		assert_eq!(iri.connection_part(), *expected, "url '{url}'");
		// second lookup returns the cached value
		assert_eq!(iri.connection_part(), *expected, "url '{url}'");
	}
}

#[test]
fn parse_with_base_resolves_relative_references() {
	let base = Iri::parse("http://a/b/c/d", None).unwrap();

	let iri = Iri::parse_with_base(Some(&base), "../g", None).unwrap();
	assert_eq!(iri.uri(), b"http://a/b/g");

	let base = Iri::parse("http://a/b/c/", None).unwrap();
	let iri = Iri::parse_with_base(Some(&base), "//x/y", None).unwrap();
	assert_eq!(iri.host(), Some(&b"x"[..]));
	assert_eq!(iri.path(), Some(&b"y"[..]));
}

#[test]
fn parse_with_base_without_base() {
	assert!(matches!(
		Iri::parse_with_base(None, "/rooted", None),
		Err(Error::UnresolvedReference)
	));

	let iri = Iri::parse_with_base(None, "http://x/y", None).unwrap();
	assert_eq!(iri.host(), Some(&b"x"[..]));
}

#[test]
fn round_trip_of_unreserved_url() {
	let url = "http://example.com/azAZ09-._~";
	let iri = Iri::parse(url, None).unwrap();

	let mut host = String::new();
	let mut resource = String::new();
	let rebuilt = format!(
		"{}://{}/{}",
		iri.scheme(),
		iri.escaped_host(&mut host),
		iri.escaped_resource(&mut resource)
	);

	assert_eq!(rebuilt, url);
}

#[test]
fn filenames() {
	let tests: &[(&str, &[u8])] = &[
		("http://example.com/a/b.html", b"b.html"),
		("http://example.com/a/b.html?x=1", b"b.html?x=1"),
		("http://example.com/a/b.html?x=1/2", b"b.html?x=1%2F2"),
		("http://example.com/dir/", b"index.html"),
		("http://example.com/", b"index.html"),
		("http://example.com", b"index.html"),
		("http://example.com/?q", b"index.html?q"),
	];

	for (url, expected) in tests {
		let iri = Iri::parse(url, None).unwrap();
		let mut buf = Vec::new();
		assert_eq!(iri.to_filename(&mut buf, None), *expected, "url '{url}'");
	}
}

#[test]
fn local_paths() {
	let tests: &[(&str, &[u8])] = &[
		("http://example.com/a/b.html", b"/a/b.html"),
		("http://example.com/dir/", b"/dir/index.html"),
		("http://example.com", b"/index.html"),
	];

	for (url, expected) in tests {
		let iri = Iri::parse(url, None).unwrap();
		let mut buf = Vec::new();
		assert_eq!(iri.to_path(&mut buf, None), *expected, "url '{url}'");
	}
}

#[test]
fn local_path_appends_to_prefix() {
	let iri = Iri::parse("http://example.com/a/b.html", None).unwrap();
	let mut buf = b"docs".to_vec();
	assert_eq!(iri.to_path(&mut buf, None), b"docs/a/b.html");
}

#[test]
fn filename_transcodes_to_local_encoding() {
	let iri = Iri::parse("http://example.com/D%C3%BCrst", Some("utf-8")).unwrap();

	let mut buf = Vec::new();
	assert_eq!(iri.to_filename(&mut buf, Some("iso-8859-1")), b"D\xfcrst");

	// unknown local encodings keep the UTF-8 bytes
	let mut buf = Vec::new();
	assert_eq!(
		iri.to_filename(&mut buf, Some("no-such-charset")),
		"Dürst".as_bytes()
	);
}

#[test]
fn robots_scenario() {
	let robots = Robots::parse(
		b"User-agent: *\nDisallow: /priv\nSitemap: http://s/s.xml\n",
		Some("bot"),
	)
	.unwrap();
	assert_eq!(robots.paths(), &["/priv"][..]);
	assert_eq!(robots.sitemaps(), &["http://s/s.xml"][..]);

	let robots = Robots::parse(b"User-agent: *\nDisallow:\n", Some("bot")).unwrap();
	assert_eq!(robots.paths(), &[] as &[&str]);
}
