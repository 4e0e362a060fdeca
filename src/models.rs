//! Core value types for language resolution.
//!
//! Everything here is an immutable value: records come out of the catalog,
//! get paired with the source that produced them, and are never mutated
//! afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language known to the hosting platform.
///
/// Produced by the catalog collaborator and treated as read-only from then
/// on. The `culture_code` carries the region-qualified tag (e.g. "en-US");
/// `name` is the platform's short name (e.g. "english").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRecord {
    /// Platform short name (e.g. "english")
    pub name: String,

    /// Numeric platform id
    pub id: i64,

    /// Stable unique identifier assigned by the platform
    pub guid: String,

    /// Human-readable display name (e.g. "English (United States)")
    pub display_name: String,

    /// Culture tag such as "en-US"
    pub culture_code: String,

    /// Optional flag icon reference
    pub icon: Option<String>,
}

impl LanguageRecord {
    /// The portion of the culture code before the first hyphen
    /// (e.g. "en" from "en-US").
    pub fn primary_subtag(&self) -> &str {
        self.culture_code
            .split('-')
            .next()
            .unwrap_or(&self.culture_code)
    }
}

/// Where a resolved language came from.
///
/// The resolver walks these in the order configured by
/// [`ResolverConfig::source_priority`](crate::config::ResolverConfig) and
/// stops at the first one that yields a catalog match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageSource {
    /// A query string value named by the configured query key.
    QueryString,
    /// A cookie named by the configured cookie name.
    Cookie,
    /// A header named by the configured header name.
    Header,
    /// A route value named by the configured route key, falling back to the
    /// ambient culture when the route carries no language.
    RouteOrAmbientCulture,
    /// The ambient culture supplied by the hosting context.
    AmbientCulture,
    /// The highest-ranked entry of the user's accepted languages that the
    /// catalog supports.
    UserLanguages,
    /// The default language configured for the current site/channel.
    SiteDefault,
    /// The platform-wide default language. Absolute backstop; always
    /// reachable even when missing from the configured priority.
    GlobalDefault,
}

impl fmt::Display for LanguageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LanguageSource::QueryString => "query-string",
            LanguageSource::Cookie => "cookie",
            LanguageSource::Header => "header",
            LanguageSource::RouteOrAmbientCulture => "route-or-ambient-culture",
            LanguageSource::AmbientCulture => "ambient-culture",
            LanguageSource::UserLanguages => "user-languages",
            LanguageSource::SiteDefault => "site-default",
            LanguageSource::GlobalDefault => "global-default",
        };
        write!(f, "{}", name)
    }
}

/// The outcome of a resolution: a catalog record plus the source that won.
///
/// Constructed exactly once per request (or replayed from the per-request
/// scope) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLanguage {
    pub record: LanguageRecord,
    pub source: LanguageSource,
}

impl ResolvedLanguage {
    pub fn new(record: LanguageRecord, source: LanguageSource) -> Self {
        Self { record, source }
    }
}

/// One entry of the user's accepted-languages list after ranking.
///
/// `matched` is `None` when the catalog has no entry for the requested
/// culture; unmatched entries are kept so callers can see what the user
/// asked for but the platform does not support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLanguagePreference {
    /// The culture string exactly as the client requested it
    pub requested: String,

    /// The catalog record it mapped to, if any
    pub matched: Option<LanguageRecord>,
}
