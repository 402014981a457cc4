//! Response cache middleware
//!
//! Stores complete responses that declare themselves publicly cacheable and
//! replays them until their `max-age` runs out, without calling the inner
//! handler again.
//!
//! # Behaviour
//!
//! * Only `GET` and `HEAD` requests without an `Authorization` header take
//!   part.
//! * A request sending `Cache-Control: no-cache` (or `Pragma: no-cache`)
//!   skips the lookup; `no-store` keeps its response out of the cache.
//! * A response is stored when it is a `200` with `public` and a positive
//!   `max-age`/`s-maxage`, sets no cookie, does not `Vary: *`, and has a known
//!   body size within the configured limit.
//! * Header names listed in the response's `Vary` header become the vary
//!   rules for that method, path and query. Later requests are matched on
//!   their values of those headers, so per-origin CORS answers never leak to
//!   another origin.
//! * Stored responses and vary rules are each capped at `max_entries`. When
//!   either is full, expired entries and the rules they alone used are purged
//!   first; if there is still no room the new response is not stored.

use crate::config::ResponseCacheOptions;
use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

// =============================================================================
// Cache Store
// =============================================================================

/// Handle to the shared response store; clones share the same entries
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<Store>,
}

struct Store {
    options: ResponseCacheOptions,

    /// Vary header names per method + path + query
    vary_rules: DashMap<String, Vec<HeaderName>>,

    /// Stored responses keyed by base key plus vary values
    entries: DashMap<String, CachedResponse>,
}

#[derive(Clone)]
struct CachedResponse {
    /// Method + path + query whose vary rules produced this entry
    base_key: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    stored_at: Instant,
    fresh_for: Duration,
}

impl CachedResponse {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    fn is_fresh(&self, now: Instant) -> bool {
        self.age(now) < self.fresh_for
    }

    fn replay(&self, now: Instant) -> Response {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
            .headers_mut()
            .insert(header::AGE, HeaderValue::from(self.age(now).as_secs()));
        response
    }
}

impl ResponseCache {
    pub fn new(options: ResponseCacheOptions) -> Self {
        Self {
            store: Arc::new(Store {
                options,
                vary_rules: DashMap::new(),
                entries: DashMap::new(),
            }),
        }
    }

    /// Number of stored responses, fresh or not
    pub fn len(&self) -> usize {
        self.store.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.entries.is_empty()
    }

    fn lookup(&self, base_key: &str, request_headers: &HeaderMap, now: Instant) -> Option<Response> {
        let vary = self.store.vary_rules.get(base_key)?.value().clone();
        let key = variant_key(base_key, &vary, request_headers);

        // Clone out before any removal: holding a map guard across `remove`
        // on the same shard deadlocks.
        let entry = self.store.entries.get(&key).map(|e| e.value().clone())?;
        if entry.is_fresh(now) {
            return Some(entry.replay(now));
        }

        self.store
            .entries
            .remove_if(&key, |_, stored| !stored.is_fresh(now));
        None
    }

    fn insert(&self, vary: Vec<HeaderName>, request_headers: &HeaderMap, entry: CachedResponse) -> bool {
        let key = variant_key(&entry.base_key, &vary, request_headers);
        let max_entries = self.store.options.max_entries;

        let entries_full =
            || !self.store.entries.contains_key(&key) && self.store.entries.len() >= max_entries;
        let rules_full = || {
            !self.store.vary_rules.contains_key(&entry.base_key)
                && self.store.vary_rules.len() >= max_entries
        };

        if entries_full() || rules_full() {
            self.purge_stale(Instant::now());
            if entries_full() || rules_full() {
                return false;
            }
        }

        self.store.vary_rules.insert(entry.base_key.clone(), vary);
        self.store.entries.insert(key, entry);
        true
    }

    /// Drops expired entries, then every vary rule no remaining entry uses.
    fn purge_stale(&self, now: Instant) {
        self.store.entries.retain(|_, stored| stored.is_fresh(now));

        let live: HashSet<String> = self
            .store
            .entries
            .iter()
            .map(|entry| entry.value().base_key.clone())
            .collect();
        self.store.vary_rules.retain(|base_key, _| live.contains(base_key));
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Serves fresh cached responses and stores cacheable new ones
pub async fn response_cache(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    let Some(base_key) = base_key(&request) else {
        return next.run(request).await;
    };

    let request_directives = CacheControl::from_request(request.headers());
    if !request_directives.no_cache {
        if let Some(hit) = cache.lookup(&base_key, request.headers(), Instant::now()) {
            tracing::debug!(key = %base_key, "response cache hit");
            return hit;
        }
    }

    let request_headers = request.headers().clone();
    let response = next.run(request).await;
    if request_directives.no_store {
        return response;
    }

    let Some((fresh_for, vary)) = storage_policy(&response) else {
        return response;
    };

    let max_body_size = cache.store.options.max_body_size;
    let fits = response
        .body()
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= max_body_size as u64);
    if !fits {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match axum::body::to_bytes(body, max_body_size).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(key = %base_key, error = %err, "failed to buffer response for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let entry = CachedResponse {
        base_key: base_key.clone(),
        status: parts.status,
        headers: parts.headers.clone(),
        body: body.clone(),
        stored_at: Instant::now(),
        fresh_for,
    };
    if cache.insert(vary, &request_headers, entry) {
        tracing::debug!(key = %base_key, max_age = fresh_for.as_secs(), "response cached");
    }

    Response::from_parts(parts, Body::from(body))
}

// =============================================================================
// Helpers
// =============================================================================

const KEY_SEPARATOR: char = '\u{1e}';
const VARY_SEPARATOR: char = '\u{1f}';

/// Method + path + query for requests that may use the cache
fn base_key(request: &Request) -> Option<String> {
    let method = request.method();
    if method != Method::GET && method != Method::HEAD {
        return None;
    }
    if request.headers().contains_key(header::AUTHORIZATION) {
        return None;
    }

    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    Some(format!("{method}{KEY_SEPARATOR}{path_and_query}"))
}

fn variant_key(base_key: &str, vary: &[HeaderName], request_headers: &HeaderMap) -> String {
    let mut key = base_key.to_owned();
    for name in vary {
        let values: Vec<String> = request_headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();
        key.push(VARY_SEPARATOR);
        key.push_str(name.as_str());
        key.push('=');
        key.push_str(&values.join(","));
    }
    key
}

/// Freshness lifetime and vary rules, if `response` may be stored
fn storage_policy(response: &Response) -> Option<(Duration, Vec<HeaderName>)> {
    if response.status() != StatusCode::OK {
        return None;
    }

    let headers = response.headers();
    if headers.contains_key(header::SET_COOKIE) {
        return None;
    }

    let directives = CacheControl::from_headers(headers);
    if !directives.public || directives.private || directives.no_store || directives.no_cache {
        return None;
    }

    let max_age = directives.s_max_age.or(directives.max_age)?;
    if max_age == 0 {
        return None;
    }

    let vary = vary_names(headers)?;
    Some((Duration::from_secs(max_age), vary))
}

/// Header names listed in `Vary`; `None` for `Vary: *` or unparseable values
fn vary_names(headers: &HeaderMap) -> Option<Vec<HeaderName>> {
    let mut names = Vec::new();
    for value in headers.get_all(header::VARY) {
        let value = value.to_str().ok()?;
        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if token == "*" {
                return None;
            }
            names.push(HeaderName::from_bytes(token.as_bytes()).ok()?);
        }
    }
    names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    names.dedup();
    Some(names)
}

/// The `Cache-Control` directives this cache understands
#[derive(Debug, Default, PartialEq, Eq)]
struct CacheControl {
    public: bool,
    private: bool,
    no_cache: bool,
    no_store: bool,
    max_age: Option<u64>,
    s_max_age: Option<u64>,
}

impl CacheControl {
    fn from_headers(headers: &HeaderMap) -> Self {
        let mut directives = Self::default();
        for value in headers.get_all(header::CACHE_CONTROL) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for directive in value.split(',') {
                let (name, argument) = match directive.split_once('=') {
                    Some((name, argument)) => (name.trim(), Some(argument.trim().trim_matches('"'))),
                    None => (directive.trim(), None),
                };
                match name.to_ascii_lowercase().as_str() {
                    "public" => directives.public = true,
                    "private" => directives.private = true,
                    "no-cache" => directives.no_cache = true,
                    "no-store" => directives.no_store = true,
                    "max-age" => directives.max_age = argument.and_then(|a| a.parse().ok()),
                    "s-maxage" => directives.s_max_age = argument.and_then(|a| a.parse().ok()),
                    _ => {}
                }
            }
        }
        directives
    }

    /// Request directives, with HTTP/1.0 `Pragma: no-cache` folded in
    fn from_request(headers: &HeaderMap) -> Self {
        let mut directives = Self::from_headers(headers);
        let pragma_no_cache = headers
            .get_all(header::PRAGMA)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|value| value.to_ascii_lowercase().contains("no-cache"));
        directives.no_cache |= pragma_no_cache;
        directives
    }
}
