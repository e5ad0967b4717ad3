//! `Cache-Control` and `Expires` helpers.
//!
//! [`patch_cache_control`] merges directives into whatever `Cache-Control`
//! header a response already carries instead of overwriting it.

use chrono::Utc;
use http::header::{CACHE_CONTROL, EXPIRES};
use http::HeaderValue;

use crate::response::HttpResponse;

/// The value of one cache directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// A bare directive such as `no-store`; `false` removes it.
    Flag(bool),
    /// A directive with a number of seconds, such as `max-age=60`.
    Seconds(u64),
}

/// Cache-Control options. Unset options leave the header alone.
///
/// # Examples
///
/// ```
/// use brackets_http::cache::{patch_cache_control, CacheControl};
/// use brackets_http::HttpResponse;
///
/// let mut response = HttpResponse::ok("");
/// let options = CacheControl {
///     public: Some(true),
///     max_age: Some(60),
///     ..CacheControl::default()
/// };
/// patch_cache_control(&mut response, &options);
/// assert_eq!(response.header("cache-control"), Some("public, max-age=60"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    pub public: Option<bool>,
    pub private: Option<bool>,
    pub no_cache: Option<bool>,
    pub no_store: Option<bool>,
    pub no_transform: Option<bool>,
    pub must_revalidate: Option<bool>,
    pub proxy_revalidate: Option<bool>,
    pub max_age: Option<u64>,
    pub s_maxage: Option<u64>,
}

impl CacheControl {
    /// Returns the options that are set, as `(directive, value)` pairs.
    pub fn directives(&self) -> Vec<(&'static str, Directive)> {
        let flags = [
            ("public", self.public),
            ("private", self.private),
            ("no-cache", self.no_cache),
            ("no-store", self.no_store),
            ("no-transform", self.no_transform),
            ("must-revalidate", self.must_revalidate),
            ("proxy-revalidate", self.proxy_revalidate),
        ];
        let seconds = [("max-age", self.max_age), ("s-maxage", self.s_maxage)];

        flags
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, Directive::Flag(v))))
            .chain(
                seconds
                    .into_iter()
                    .filter_map(|(name, value)| value.map(|v| (name, Directive::Seconds(v)))),
            )
            .collect()
    }

    /// Returns `true` if no option is set.
    pub fn is_empty(&self) -> bool {
        self.directives().is_empty()
    }
}

/// Merges `options` into the response's `Cache-Control` header.
///
/// Existing directives keep their position and new ones are appended.
/// Setting `public` drops an existing `private` and vice versa. When both
/// the header and `options` carry `max-age`, the smaller value wins.
pub fn patch_cache_control(response: &mut HttpResponse, options: &CacheControl) {
    patch_directives(response, &options.directives());
}

/// Like [`patch_cache_control`], for an explicit directive list.
pub fn patch_directives(response: &mut HttpResponse, directives: &[(&str, Directive)]) {
    let mut current: Vec<(String, Option<String>)> = response
        .header("cache-control")
        .map(parse_cache_control)
        .unwrap_or_default();

    let has = |list: &[(String, Option<String>)], name: &str| list.iter().any(|(k, _)| k == name);
    let patching = |name: &str| directives.iter().any(|(k, _)| *k == name);
    if has(&current, "private") && patching("public") {
        current.retain(|(k, _)| k != "private");
    } else if has(&current, "public") && patching("private") {
        current.retain(|(k, _)| k != "public");
    }

    for (name, value) in directives {
        let rendered = match *value {
            Directive::Flag(false) => {
                current.retain(|(k, _)| k != name);
                continue;
            }
            Directive::Flag(true) => None,
            Directive::Seconds(secs) if *name == "max-age" => {
                let existing = current
                    .iter()
                    .find(|(k, _)| k == "max-age")
                    .and_then(|(_, v)| v.as_deref())
                    .and_then(|v| v.parse::<u64>().ok());
                Some(existing.map_or(secs, |e| e.min(secs)).to_string())
            }
            Directive::Seconds(secs) => Some(secs.to_string()),
        };
        match current.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = rendered,
            None => current.push(((*name).to_string(), rendered)),
        }
    }

    let header = current
        .iter()
        .map(|(k, v)| v.as_ref().map_or_else(|| k.clone(), |v| format!("{k}={v}")))
        .collect::<Vec<_>>()
        .join(", ");
    if header.is_empty() {
        response.headers_mut().remove(CACHE_CONTROL);
    } else if let Ok(value) = HeaderValue::from_str(&header) {
        response.headers_mut().insert(CACHE_CONTROL, value);
    }
}

/// Marks a response as never to be cached.
///
/// Sets `Expires` to now unless the response already has one, then patches
/// `max-age=0, no-cache, no-store, must-revalidate, private`.
pub fn add_never_cache_headers(response: &mut HttpResponse) {
    if response.header("expires").is_none() {
        let now = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        if let Ok(value) = HeaderValue::from_str(&now) {
            response.headers_mut().insert(EXPIRES, value);
        }
    }
    patch_directives(response, &[("max-age", Directive::Seconds(0))]);
    patch_directives(
        response,
        &[
            ("no-cache", Directive::Flag(true)),
            ("no-store", Directive::Flag(true)),
            ("must-revalidate", Directive::Flag(true)),
            ("private", Directive::Flag(true)),
        ],
    );
}

fn parse_cache_control(header: &str) -> Vec<(String, Option<String>)> {
    header
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| match d.split_once('=') {
            Some((k, v)) => (k.trim().to_lowercase(), Some(v.trim().to_string())),
            None => (d.to_lowercase(), None),
        })
        .collect()
}
