//! Origin-relative resource keys
//!
//! Cache regions are keyed by request URL, the resource manifest by
//! origin-relative path. This module converts between the two.
//!
//! | URL | Key |
//! |-----|-----|
//! | `http://host` | `/` |
//! | `http://host/` | `/` |
//! | `http://host/#/settings` | `/` |
//! | `http://host/main.js?v=123` | `main.js` |
//! | `http://other/main.js` | none (foreign origin) |

use std::fmt;

/// Key aliasing the root document
pub const ROOT_KEY: &str = "/";

/// Query prefix used by the host page to bust HTTP caches
const CACHE_BUSTER: &str = "?v=";

/// Scheme, host and port of the site, without a trailing slash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(String);

impl Origin {
    /// Create an origin, dropping any trailing slashes
    pub fn new(origin: impl AsRef<str>) -> Self {
        Self(origin.as_ref().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical request URL for a manifest key
    pub fn url_for(&self, key: &str) -> String {
        if key == ROOT_KEY {
            format!("{}/", self.0)
        } else {
            format!("{}/{}", self.0, key.trim_start_matches('/'))
        }
    }

    /// Key of a stored cache entry, as used when diffing during activation
    ///
    /// Returns `None` for URLs outside this origin.
    pub fn entry_key(&self, url: &str) -> Option<String> {
        let path = self.relative_path(url)?;
        if path.is_empty() {
            Some(ROOT_KEY.to_string())
        } else {
            Some(path.to_string())
        }
    }

    /// Key of an intercepted request
    ///
    /// Drops any fragment and the cache-busting `?v=` suffix; whatever is
    /// left of an empty path maps to [`ROOT_KEY`].
    pub fn request_key(&self, url: &str) -> Option<String> {
        let path = self.relative_path(url)?;
        let path = match path.find('#') {
            Some(idx) => &path[..idx],
            None => path,
        };
        let path = match path.find(CACHE_BUSTER) {
            Some(idx) => &path[..idx],
            None => path,
        };
        if path.is_empty() {
            Some(ROOT_KEY.to_string())
        } else {
            Some(path.to_string())
        }
    }

    /// Path after `origin/`, or `None` when the URL belongs elsewhere
    fn relative_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        let rest = url.strip_prefix(self.0.as_str())?;
        match rest.chars().next() {
            None => Some(rest),
            Some('/') => Some(&rest[1..]),
            Some('#') | Some('?') => Some(rest),
            // e.g. `http://host:8080` against origin `http://host`
            Some(_) => None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
