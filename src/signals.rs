//! Per-request signal extraction boundary.
//!
//! The resolver never touches HTTP primitives directly; it reads candidate
//! strings through this trait. A non-HTTP invocation context (background
//! job, CLI) uses [`NoRequest`], which answers "absent" for everything —
//! absence of a request is not an error, it just leaves only the default
//! sources active.

use std::collections::HashMap;

/// One entry of the accepted-languages signal, before ranking.
///
/// `weight` is the client-supplied quality value in `[0, 1]`; `None` means
/// the client gave no explicit weight and the entry ranks at 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedLanguage {
    pub code: String,
    pub weight: Option<f32>,
}

impl AcceptedLanguage {
    pub fn new(code: impl Into<String>, weight: Option<f32>) -> Self {
        Self {
            code: code.into(),
            weight,
        }
    }

    /// The weight used for ordering; entries without one rank highest.
    pub fn effective_weight(&self) -> f32 {
        self.weight.unwrap_or(1.0)
    }
}

/// Read access to the current request's language-bearing signals.
///
/// Every method returning `Option` answers `None` when the signal is not
/// present on this request; the resolver skips to the next source.
pub trait RequestSignals: Send + Sync {
    /// Value of the named query string parameter.
    fn query_value(&self, name: &str) -> Option<String>;

    /// Value of the named cookie.
    fn cookie_value(&self, name: &str) -> Option<String>;

    /// First value of the named header.
    fn header_value(&self, name: &str) -> Option<String>;

    /// Value of the named route parameter.
    fn route_value(&self, name: &str) -> Option<String>;

    /// The ambient culture name supplied by the hosting context, if any.
    fn ambient_culture(&self) -> Option<String>;

    /// The client's accepted languages, unordered and unweighted-by-us;
    /// ranking happens downstream.
    fn accepted_languages(&self) -> Vec<AcceptedLanguage>;

    /// The site/channel this request belongs to, for multi-site hosts.
    fn site_id(&self) -> Option<i64> {
        None
    }
}

/// The "no request here" signal source: every signal is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRequest;

impl RequestSignals for NoRequest {
    fn query_value(&self, _name: &str) -> Option<String> {
        None
    }

    fn cookie_value(&self, _name: &str) -> Option<String> {
        None
    }

    fn header_value(&self, _name: &str) -> Option<String> {
        None
    }

    fn route_value(&self, _name: &str) -> Option<String> {
        None
    }

    fn ambient_culture(&self) -> Option<String> {
        None
    }

    fn accepted_languages(&self) -> Vec<AcceptedLanguage> {
        Vec::new()
    }
}

/// Plain-map signal source for tests and non-HTTP embeddings that still
/// carry request-like data.
#[derive(Debug, Clone, Default)]
pub struct StaticSignals {
    pub query: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub route_values: HashMap<String, String>,
    pub ambient: Option<String>,
    pub accepted: Vec<AcceptedLanguage>,
    pub site: Option<i64>,
}

impl RequestSignals for StaticSignals {
    fn query_value(&self, name: &str) -> Option<String> {
        self.query.get(name).cloned()
    }

    fn cookie_value(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn header_value(&self, name: &str) -> Option<String> {
        // Header names are matched case-insensitively, like the wire format.
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn route_value(&self, name: &str) -> Option<String> {
        self.route_values.get(name).cloned()
    }

    fn ambient_culture(&self) -> Option<String> {
        self.ambient.clone()
    }

    fn accepted_languages(&self) -> Vec<AcceptedLanguage> {
        self.accepted.clone()
    }

    fn site_id(&self) -> Option<i64> {
        self.site
    }
}
