// URI parsing and reference resolution.
//
// A deliberately small URI model: enough to absolutize the href/src/data
// attributes found while rendering. Parsing splits a string into its
// components; resolution follows the transform-references algorithm of
// RFC 3986 §5.2.2 (without dot-segment removal). Every component is bounded;
// exceeding a bound is a parse/resolve failure, never a truncation.

/// Maximum accepted component lengths, in bytes.
const MAX_SCHEME: usize = 47;
const MAX_USERINFO: usize = 255;
const MAX_HOST: usize = 255;
const MAX_PORT: usize = 5;
const MAX_PATH: usize = 1023;
const MAX_QUERY: usize = 1023;
const MAX_FRAGMENT: usize = 1023;

/// A parsed URI reference.
///
/// `has_authority` records whether the reference carried (or, for
/// protocol-relative references, implied) a `//` authority part; it controls
/// the separator that [`Uri::format`] re-inserts after the scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Uri {
    pub scheme: String,
    pub has_authority: bool,
    pub userinfo: String,
    pub host: String,
    pub port: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

/// Whether `s` starts with a scheme part (`ALPHA (ALPHA|DIGIT|+|-|.)* ":"`).
pub(crate) fn has_scheme(s: &str) -> bool {
    let b = s.as_bytes();
    if !b.first().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    let end = b
        .iter()
        .position(|&c| !is_scheme_byte(c))
        .unwrap_or(b.len());
    b.get(end) == Some(&b':')
}

fn is_scheme_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'+' || c == b'-' || c == b'.'
}

impl Uri {
    /// Parse a URI reference. Returns `None` on malformed input (bad port,
    /// unterminated IPv6 bracket) or when a component exceeds its bound.
    pub(crate) fn parse(s: &str) -> Option<Uri> {
        let mut u = Uri::default();
        let mut rest = s;

        if let Some(after) = rest.strip_prefix("//") {
            // Protocol-relative reference.
            u.has_authority = true;
            rest = u.parse_authority(after)?;
        } else if has_scheme(rest) {
            let colon = rest.find(':').unwrap_or(0);
            u.scheme = bounded(&rest[..colon], MAX_SCHEME)?;
            rest = &rest[colon + 1..];
            if let Some(after) = rest.strip_prefix("//") {
                u.has_authority = true;
                rest = u.parse_authority(after)?;
            }
        }

        // Path runs until the query or fragment.
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        u.path = bounded(&rest[..end], MAX_PATH)?;
        rest = &rest[end..];

        if let Some(after) = rest.strip_prefix('?') {
            let end = after.find('#').unwrap_or(after.len());
            u.query = bounded(&after[..end], MAX_QUERY)?;
            rest = &after[end..];
        }

        if let Some(after) = rest.strip_prefix('#') {
            u.fragment = bounded(after, MAX_FRAGMENT)?;
        }

        Some(u)
    }

    /// Parse `userinfo@host:port` starting just past the `//`. Returns the
    /// unconsumed remainder (path, query, fragment).
    fn parse_authority<'a>(&mut self, s: &'a str) -> Option<&'a str> {
        let mut rest = s;

        let end = rest.find(['@', '/', '?', '#']).unwrap_or(rest.len());
        if rest.as_bytes().get(end) == Some(&b'@') {
            self.userinfo = bounded(&rest[..end], MAX_USERINFO)?;
            rest = &rest[end + 1..];
        }

        if rest.starts_with('[') {
            // Bracketed IPv6 host, bracket included in the component.
            let close = rest.find(']')?;
            if close < 3 {
                return None;
            }
            self.host = bounded(&rest[..=close], MAX_HOST)?;
            rest = &rest[close + 1..];
        } else {
            let end = rest.find([':', '/', '?', '#']).unwrap_or(rest.len());
            self.host = bounded(&rest[..end], MAX_HOST)?;
            rest = &rest[end..];
        }

        if let Some(after) = rest.strip_prefix(':') {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            self.port = bounded(&after[..end], MAX_PORT)?;
            rest = &after[end..];
            if !self.port.is_empty() {
                // Port may be empty, otherwise decimal 1..=65535.
                if !self.port.bytes().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                match self.port.parse::<u32>() {
                    Ok(n) if (1..=65535).contains(&n) => {}
                    _ => return None,
                }
            }
        }

        Some(rest)
    }

    /// Resolve `self` as a reference against `base`, RFC 3986 §5.2.2 style.
    /// Returns `None` when the merged path exceeds its bound.
    pub(crate) fn resolve(&self, base: &Uri) -> Option<Uri> {
        let mut a = Uri {
            fragment: self.fragment.clone(),
            ..Uri::default()
        };

        if !self.scheme.is_empty() || !self.host.is_empty() {
            if self.scheme.is_empty() {
                a.scheme = base.scheme.clone();
                a.has_authority = self.has_authority || base.has_authority;
            } else {
                a.scheme = self.scheme.clone();
                a.has_authority = self.has_authority;
            }
            a.userinfo = self.userinfo.clone();
            a.host = self.host.clone();
            a.port = self.port.clone();
            a.path = self.path.clone();
            a.query = self.query.clone();
            return Some(a);
        }

        a.scheme = base.scheme.clone();
        a.has_authority = base.has_authority;
        a.userinfo = base.userinfo.clone();
        a.host = base.host.clone();
        a.port = base.port.clone();

        if self.path.is_empty() {
            a.path = base.path.clone();
        } else if self.path.starts_with('/') {
            a.path = self.path.clone();
        } else {
            // Merge: replace everything after the last segment of the base
            // path with the reference path.
            let mut merged = String::new();
            if !base.host.is_empty() && !base.path.starts_with('/') {
                merged.push('/');
            }
            if let Some(slash) = base.path.rfind('/') {
                merged.push_str(&base.path[..=slash]);
            }
            merged.push_str(&self.path);
            if merged.len() > MAX_PATH {
                return None;
            }
            a.path = merged;
        }

        if !self.path.is_empty() || !self.query.is_empty() {
            a.query = self.query.clone();
        } else {
            a.query = base.query.clone();
        }

        Some(a)
    }

    /// Serialize back to a string, inserting separators only for the
    /// components that are present.
    pub(crate) fn format(&self) -> String {
        let mut out = String::new();
        if !self.scheme.is_empty() {
            out.push_str(&self.scheme);
            out.push(':');
        }
        if self.has_authority {
            out.push_str("//");
        }
        if !self.userinfo.is_empty() {
            out.push_str(&self.userinfo);
            out.push('@');
        }
        out.push_str(&self.host);
        if !self.port.is_empty() {
            out.push(':');
            out.push_str(&self.port);
        }
        if !self.host.is_empty() && !self.path.is_empty() && !self.path.starts_with('/') {
            out.push('/');
        }
        out.push_str(&self.path);
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query);
        }
        if !self.fragment.is_empty() {
            out.push('#');
            out.push_str(&self.fragment);
        }
        out
    }
}

fn bounded(s: &str, max: usize) -> Option<String> {
    if s.len() > max {
        return None;
    }
    Some(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Uri {
        Uri::parse(s).unwrap_or_else(|| panic!("should parse: {s}"))
    }

    #[test]
    fn parse_absolute() {
        let u = parse("https://user:pw@example.com:8080/a/b?x=1#frag");
        assert_eq!(u.scheme, "https");
        assert!(u.has_authority);
        assert_eq!(u.userinfo, "user:pw");
        assert_eq!(u.host, "example.com");
        assert_eq!(u.port, "8080");
        assert_eq!(u.path, "/a/b");
        assert_eq!(u.query, "x=1");
        assert_eq!(u.fragment, "frag");
    }

    #[test]
    fn parse_scheme_without_authority() {
        let u = parse("mailto:someone@example.com");
        assert_eq!(u.scheme, "mailto");
        assert!(!u.has_authority);
        assert!(u.host.is_empty());
        assert_eq!(u.path, "someone@example.com");
    }

    #[test]
    fn parse_protocol_relative() {
        let u = parse("//example.com/p");
        assert!(u.scheme.is_empty());
        assert!(u.has_authority);
        assert_eq!(u.host, "example.com");
        assert_eq!(u.path, "/p");
    }

    #[test]
    fn parse_path_only() {
        let u = parse("a/b/c");
        assert!(u.scheme.is_empty());
        assert!(u.host.is_empty());
        assert_eq!(u.path, "a/b/c");
    }

    #[test]
    fn parse_ipv6_host() {
        let u = parse("http://[2001:db8::1]:80/x");
        assert_eq!(u.host, "[2001:db8::1]");
        assert_eq!(u.port, "80");
        assert_eq!(u.path, "/x");
    }

    #[test]
    fn parse_rejects_bad_ports() {
        assert!(Uri::parse("http://h:0/").is_none());
        assert!(Uri::parse("http://h:65536/").is_none());
        assert!(Uri::parse("http://h:x/").is_none());
        // An empty port is tolerated.
        assert!(Uri::parse("http://h:/").is_some());
    }

    #[test]
    fn parse_rejects_oversized_components() {
        let long = "h".repeat(300);
        assert!(Uri::parse(&format!("http://{long}/")).is_none());
        let path = "p".repeat(2000);
        assert!(Uri::parse(&format!("http://h/{path}")).is_none());
    }

    #[test]
    fn parse_rejects_unterminated_ipv6() {
        assert!(Uri::parse("http://[::1/").is_none());
    }

    #[test]
    fn digit_start_is_not_a_scheme() {
        assert!(!has_scheme("1x:y"));
        let u = parse("1x:y");
        assert!(u.scheme.is_empty());
        assert_eq!(u.path, "1x:y");
    }

    #[test]
    fn round_trips() {
        for s in [
            "https://example.com/a/b?x=1#f",
            "https://user@h:81/p",
            "http://[::1]/p",
            "mailto:a@b",
            "//h/p",
            "a/b",
            "/abs?q",
            "https://h",
        ] {
            assert_eq!(parse(s).format(), s, "round-trip of {s}");
        }
    }

    #[test]
    fn resolve_identity_for_absolute() {
        let u = parse("https://h/a/b?q#f");
        assert_eq!(u.resolve(&u).unwrap(), u);
    }

    #[test]
    fn resolve_relative_path() {
        let base = parse("https://h/a/b?x");
        assert_eq!(parse("c").resolve(&base).unwrap().format(), "https://h/a/c");
        assert_eq!(parse("/c").resolve(&base).unwrap().format(), "https://h/c");
    }

    #[test]
    fn resolve_empty_reference_keeps_path_and_query() {
        let base = parse("https://h/a/b?x");
        assert_eq!(parse("").resolve(&base).unwrap().format(), "https://h/a/b?x");
    }

    #[test]
    fn resolve_query_only() {
        let base = parse("https://h/a/b?x");
        assert_eq!(parse("?y").resolve(&base).unwrap().format(), "https://h/a/b?y");
    }

    #[test]
    fn resolve_fragment_only() {
        let base = parse("https://h/a/b?x");
        assert_eq!(
            parse("#top").resolve(&base).unwrap().format(),
            "https://h/a/b?x#top"
        );
    }

    #[test]
    fn resolve_protocol_relative_inherits_scheme() {
        let base = parse("https://h/a");
        assert_eq!(
            parse("//other/p").resolve(&base).unwrap().format(),
            "https://other/p"
        );
    }

    #[test]
    fn resolve_inserts_leading_slash_for_bare_base_path() {
        let base = parse("https://h");
        assert_eq!(parse("x").resolve(&base).unwrap().format(), "https://h/x");
    }
}
