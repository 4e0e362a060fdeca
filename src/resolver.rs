//! Ordered-source language resolution.
//!
//! The resolver walks the configured priority list, one extraction arm per
//! source kind, and stops at the first candidate the catalog recognizes.
//! Sources whose per-request signal is absent (no value, name not
//! configured, no request at all) are skipped, not failed. When the whole
//! list comes up empty the chain bottoms out in the global default, which
//! always answers — resolution can only fail if a collaborator fetch fails.

use crate::catalog::{CatalogProvider, CultureMatcher};
use crate::config::ResolverConfig;
use crate::defaults::DefaultLanguages;
use crate::models::{LanguageSource, ResolvedLanguage, UserLanguagePreference};
use crate::ranker::rank_accepted_languages;
use crate::scope::RequestScope;
use crate::signals::RequestSignals;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

pub struct LanguageResolver {
    config: ResolverConfig,
    matcher: Arc<CultureMatcher>,
    defaults: DefaultLanguages,
}

impl LanguageResolver {
    pub fn new(config: ResolverConfig, provider: Arc<dyn CatalogProvider>) -> Self {
        let matcher = Arc::new(CultureMatcher::new(
            Arc::clone(&provider),
            config.catalog_ttl,
        ));
        let defaults = DefaultLanguages::new(provider, Arc::clone(&matcher), config.catalog_ttl);
        Self {
            config,
            matcher,
            defaults,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Determine the language governing this request.
    ///
    /// A memoized value in `scope` short-circuits everything; otherwise the
    /// priority list is walked in order and the first catalog match wins.
    /// The result is written back into `scope` before returning, so every
    /// later call within the request observes the same value. The only
    /// error path is a collaborator fetch failure.
    pub async fn resolve(
        &self,
        signals: &dyn RequestSignals,
        scope: &RequestScope,
    ) -> Result<ResolvedLanguage> {
        if let Some(hit) = scope.resolved() {
            return Ok(hit.clone());
        }

        for &source in &self.config.source_priority {
            if let Some(resolved) = self.try_source(source, signals, scope).await? {
                debug!(
                    "resolved language '{}' from source {}",
                    resolved.record.culture_code, resolved.source
                );
                scope.memoize_resolved(resolved.clone());
                return Ok(resolved);
            }
        }

        // The global default answers even when it was left out of the
        // configured priority entirely.
        let record = self.defaults.global_default().await?;
        let resolved = ResolvedLanguage::new(record, LanguageSource::GlobalDefault);
        debug!(
            "resolved language '{}' from unconditional tail",
            resolved.record.culture_code
        );
        scope.memoize_resolved(resolved.clone());
        Ok(resolved)
    }

    /// The user's accepted languages, ranked and catalog-matched.
    ///
    /// Materialized once per request and memoized alongside the resolved
    /// language.
    pub async fn rank_user_languages(
        &self,
        signals: &dyn RequestSignals,
        scope: &RequestScope,
    ) -> Result<Vec<UserLanguagePreference>> {
        if let Some(hit) = scope.user_languages() {
            return Ok(hit.to_vec());
        }

        let ranked = rank_accepted_languages(&self.matcher, signals.accepted_languages()).await?;
        scope.memoize_user_languages(ranked.clone());
        Ok(ranked)
    }

    async fn try_source(
        &self,
        source: LanguageSource,
        signals: &dyn RequestSignals,
        scope: &RequestScope,
    ) -> Result<Option<ResolvedLanguage>> {
        let candidate = match source {
            LanguageSource::QueryString => self
                .config
                .query_key
                .as_deref()
                .and_then(|key| signals.query_value(key)),
            LanguageSource::Cookie => self
                .config
                .cookie_name
                .as_deref()
                .and_then(|name| signals.cookie_value(name)),
            LanguageSource::Header => self
                .config
                .header_name
                .as_deref()
                .and_then(|name| signals.header_value(name)),
            LanguageSource::RouteOrAmbientCulture => self
                .config
                .route_key
                .as_deref()
                .and_then(|key| signals.route_value(key))
                .or_else(|| signals.ambient_culture()),
            LanguageSource::AmbientCulture => signals.ambient_culture(),
            LanguageSource::UserLanguages => {
                let ranked = self.rank_user_languages(signals, scope).await?;
                let first_supported = ranked.into_iter().find_map(|pref| pref.matched);
                return Ok(first_supported.map(|record| ResolvedLanguage::new(record, source)));
            }
            LanguageSource::SiteDefault => {
                return match signals.site_id() {
                    Some(site_id) => {
                        let record = self.defaults.site_default(site_id).await?;
                        Ok(Some(ResolvedLanguage::new(record, source)))
                    }
                    None => Ok(None),
                };
            }
            LanguageSource::GlobalDefault => {
                let record = self.defaults.global_default().await?;
                return Ok(Some(ResolvedLanguage::new(record, source)));
            }
        };

        let candidate = match candidate {
            Some(value) if !value.trim().is_empty() => value,
            _ => return Ok(None),
        };

        Ok(self
            .matcher
            .lookup(&candidate)
            .await?
            .map(|record| ResolvedLanguage::new(record, source)))
    }
}
