//! Resolver configuration.
//!
//! The host decides which sources are consulted, in what order, and under
//! which names the per-request signals travel. Nothing here is required: an
//! absent options object falls back to [`ResolverConfig::default`], which
//! activates only the route/ambient and default-language tail until the
//! host opts sources in by naming them.

use crate::models::LanguageSource;
use anyhow::Result;
use std::time::Duration;
use thiserror::Error;

/// Route key used when the host does not override it.
pub const DEFAULT_ROUTE_KEY: &str = "lang";

/// Catalog-derived caches rebuild at most this often unless invalidated.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown language source '{0}'")]
    UnknownSource(String),
}

/// Ordered source priority plus the externally-supplied signal names.
///
/// A source that needs a name (query string, cookie, header) stays inert
/// until its name is set. Duplicate entries in the priority are permitted;
/// resolution halts on first success, so only the first occurrence of a kind
/// is ever reached.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// The order sources are consulted in.
    pub source_priority: Vec<LanguageSource>,

    /// Query string key holding a language candidate (e.g. "language" for
    /// `?language=es`). Inactive when unset.
    pub query_key: Option<String>,

    /// Cookie name holding a language candidate. Inactive when unset.
    pub cookie_name: Option<String>,

    /// Header name holding a language candidate. Inactive when unset.
    pub header_name: Option<String>,

    /// Route value key holding a language candidate. Defaults to
    /// [`DEFAULT_ROUTE_KEY`].
    pub route_key: Option<String>,

    /// TTL for the catalog index and default-language caches.
    pub catalog_ttl: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            source_priority: vec![
                LanguageSource::QueryString,
                LanguageSource::Cookie,
                LanguageSource::Header,
                LanguageSource::RouteOrAmbientCulture,
                LanguageSource::AmbientCulture,
                LanguageSource::SiteDefault,
                LanguageSource::GlobalDefault,
            ],
            query_key: None,
            cookie_name: None,
            header_name: None,
            route_key: Some(DEFAULT_ROUTE_KEY.to_string()),
            catalog_ttl: DEFAULT_CATALOG_TTL,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `LANG_QUERY_KEY`, `LANG_COOKIE_NAME`,
    /// `LANG_HEADER_NAME`, `LANG_ROUTE_KEY`, `LANG_SOURCE_PRIORITY`
    /// (comma-separated source names as printed by [`LanguageSource`]'s
    /// `Display`), `LANG_CATALOG_TTL_SECS`. Unset variables keep their
    /// defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let source_priority = match std::env::var("LANG_SOURCE_PRIORITY") {
            Ok(raw) => parse_priority(&raw)?,
            Err(_) => defaults.source_priority,
        };

        Ok(Self {
            source_priority,
            query_key: std::env::var("LANG_QUERY_KEY").ok(),
            cookie_name: std::env::var("LANG_COOKIE_NAME").ok(),
            header_name: std::env::var("LANG_HEADER_NAME").ok(),
            route_key: std::env::var("LANG_ROUTE_KEY").ok().or(defaults.route_key),
            catalog_ttl: std::env::var("LANG_CATALOG_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.catalog_ttl),
        })
    }
}

/// Parse a comma-separated priority list such as
/// `"query-string,cookie,header,global-default"`.
pub fn parse_priority(raw: &str) -> Result<Vec<LanguageSource>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.to_lowercase().as_str() {
            "query-string" => Ok(LanguageSource::QueryString),
            "cookie" => Ok(LanguageSource::Cookie),
            "header" => Ok(LanguageSource::Header),
            "route-or-ambient-culture" => Ok(LanguageSource::RouteOrAmbientCulture),
            "ambient-culture" => Ok(LanguageSource::AmbientCulture),
            "user-languages" => Ok(LanguageSource::UserLanguages),
            "site-default" => Ok(LanguageSource::SiteDefault),
            "global-default" => Ok(LanguageSource::GlobalDefault),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_priority_ends_in_global_default() {
        let config = ResolverConfig::default();
        assert_eq!(
            config.source_priority.last(),
            Some(&LanguageSource::GlobalDefault)
        );
    }

    #[test]
    fn test_default_names_leave_named_sources_inert() {
        let config = ResolverConfig::default();
        assert!(config.query_key.is_none());
        assert!(config.cookie_name.is_none());
        assert!(config.header_name.is_none());
        assert_eq!(config.route_key.as_deref(), Some(DEFAULT_ROUTE_KEY));
    }

    #[test]
    fn test_parse_priority_roundtrips_display_names() {
        let config = ResolverConfig::default();
        let printed = config
            .source_priority
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let parsed = parse_priority(&printed).unwrap();
        assert_eq!(parsed, config.source_priority);
    }

    #[test]
    fn test_parse_priority_tolerates_spacing_and_case() {
        let parsed = parse_priority(" Cookie , HEADER ,user-languages").unwrap();
        assert_eq!(
            parsed,
            vec![
                LanguageSource::Cookie,
                LanguageSource::Header,
                LanguageSource::UserLanguages,
            ]
        );
    }

    #[test]
    fn test_parse_priority_rejects_unknown_source() {
        let err = parse_priority("cookie,carrier-pigeon").unwrap_err();
        assert_eq!(err, ConfigError::UnknownSource("carrier-pigeon".to_string()));
    }

    #[test]
    fn test_parse_priority_allows_duplicates() {
        // Only the first occurrence is ever reached, but the list itself is
        // accepted as given.
        let parsed = parse_priority("cookie,cookie").unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
