use cookie::Cookie as RawCookie;
use std::collections::BTreeMap;

/// Key a jar entry is stored under: (domain, path, name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CookieKey {
    domain: String,
    path: String,
    name: String,
}

/// Cookie jar shared across every flow in one authentication run. Uses
/// a `BTreeMap` rather than a `HashMap` so the persisted form has a
/// stable iteration order and round-trips byte-for-byte.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    entries: BTreeMap<CookieKey, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a response's Set-Cookie header values into the jar. A cookie
    /// with `Max-Age=0` or an `Expires` in the past is removed instead of
    /// stored: every cookie the server set ends up either present or
    /// explicitly cleared, never left stale.
    pub fn merge_set_cookies<'a>(&mut self, host: &str, path: &str, set_cookies: impl IntoIterator<Item = &'a str>) {
        for raw in set_cookies {
            let Ok(parsed) = RawCookie::parse(raw.to_string()) else {
                continue;
            };
            let domain = parsed
                .domain()
                .map(|d| d.trim_start_matches('.').to_ascii_lowercase())
                .unwrap_or_else(|| host.to_ascii_lowercase());
            let cookie_path = parsed.path().unwrap_or("/").to_string();
            let key = CookieKey {
                domain,
                path: cookie_path,
                name: parsed.name().to_string(),
            };

            let expired = parsed.max_age().map(|d| d.is_zero()).unwrap_or(false)
                || parsed
                    .expires_datetime()
                    .map(|when| when < cookie::time::OffsetDateTime::now_utc())
                    .unwrap_or(false);

            if expired {
                self.entries.remove(&key);
            } else {
                self.entries
                    .insert(key, parsed.value().to_string());
            }
        }
    }

    /// Cookies matching `host`/`path`, emitted as a single `Cookie:` header
    /// value.
    pub fn header_for(&self, host: &str, path: &str) -> Option<String> {
        let host = host.to_ascii_lowercase();
        let pairs: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| domain_matches(&host, &key.domain) && path_matches(path, &key.path))
            .map(|(key, value)| format!("{}={}", key.name, value))
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    pub fn get(&self, host: &str, path: &str, name: &str) -> Option<&str> {
        let host = host.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| {
                key.name == name && domain_matches(&host, &key.domain) && path_matches(path, &key.path)
            })
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A stable, sorted view used by the persistence layer; round-tripping
    /// through it must be byte-equal.
    pub fn to_sorted_pairs(&self) -> Vec<(String, String, String, String)> {
        self.entries
            .iter()
            .map(|(key, value)| {
                (
                    key.domain.clone(),
                    key.path.clone(),
                    key.name.clone(),
                    value.clone(),
                )
            })
            .collect()
    }

    pub fn from_sorted_pairs(pairs: Vec<(String, String, String, String)>) -> Self {
        let mut entries = BTreeMap::new();
        for (domain, path, name, value) in pairs {
            entries.insert(CookieKey { domain, path, name }, value);
        }
        Self { entries }
    }
}

fn domain_matches(host: &str, cookie_domain: &str) -> bool {
    host == cookie_domain || host.ends_with(&format!(".{cookie_domain}"))
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if cookie_path == "/" {
        return true;
    }
    request_path == cookie_path
        || (request_path.starts_with(cookie_path)
            && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_and_emits_simple_cookie() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookies("example.com", "/", ["sid=abc; Path=/"]);
        assert_eq!(jar.header_for("example.com", "/login"), Some("sid=abc".to_string()));
    }

    #[test]
    fn last_write_wins_on_same_key() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookies("example.com", "/", ["sid=first; Path=/"]);
        jar.merge_set_cookies("example.com", "/", ["sid=second; Path=/"]);
        assert_eq!(jar.get("example.com", "/", "sid"), Some("second"));
    }

    #[test]
    fn max_age_zero_clears_cookie() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookies("example.com", "/", ["sid=abc; Path=/"]);
        jar.merge_set_cookies("example.com", "/", ["sid=abc; Path=/; Max-Age=0"]);
        assert!(jar.get("example.com", "/", "sid").is_none());
    }

    #[test]
    fn path_scoping_restricts_matches() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookies("example.com", "/", ["scoped=x; Path=/admin"]);
        assert!(jar.header_for("example.com", "/public").is_none());
        assert_eq!(
            jar.header_for("example.com", "/admin/panel"),
            Some("scoped=x".to_string())
        );
    }

    #[test]
    fn domain_scoping_allows_subdomains() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookies("example.com", "/", ["a=b; Domain=example.com; Path=/"]);
        assert_eq!(jar.header_for("sub.example.com", "/"), Some("a=b".to_string()));
        assert!(jar.header_for("other.com", "/").is_none());
    }

    #[test]
    fn round_trips_through_sorted_pairs() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookies("example.com", "/", ["a=1; Path=/", "b=2; Path=/x"]);
        let pairs = jar.to_sorted_pairs();
        let restored = CookieJar::from_sorted_pairs(pairs.clone());
        assert_eq!(restored.to_sorted_pairs(), pairs);
    }
}
