//! Language catalog access and candidate matching.
//!
//! The [`CatalogProvider`] trait is the boundary to the platform's stored
//! language data. [`CultureMatcher`] sits on top of it: a lazily built,
//! TTL-cached index of every alias a catalog record answers to, plus the
//! lookup rules (case-insensitive, whitespace-tolerant, primary-subtag
//! fallback). Lookup never fabricates a record and never treats an unknown
//! candidate as an error.

use crate::cache::{InvalidationTag, TtlCache};
use crate::models::LanguageRecord;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// A site/channel paired with its configured default culture string.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteDefaultEntry {
    pub site_id: i64,
    pub culture: String,
}

/// Read access to the platform's language data.
///
/// Implementations own the storage details. Each data set exposes an
/// [`InvalidationTag`] that the implementation bumps whenever the underlying
/// data changes, so cached derivations refresh before their TTL runs out.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Every language the platform knows about.
    async fn list_languages(&self) -> Result<Vec<LanguageRecord>>;

    /// Per-site default culture strings.
    async fn list_site_defaults(&self) -> Result<Vec<SiteDefaultEntry>>;

    /// The platform-wide default culture string.
    async fn global_default_culture(&self) -> Result<String>;

    /// Bumped when the language set changes.
    fn languages_tag(&self) -> InvalidationTag;

    /// Bumped when site/channel configuration changes.
    fn sites_tag(&self) -> InvalidationTag;

    /// Bumped when the global default setting changes.
    fn settings_tag(&self) -> InvalidationTag;
}

/// In-memory [`CatalogProvider`] for tests, demos, and hosts that load the
/// catalog at startup. Mutations bump the matching invalidation tag.
#[derive(Default)]
pub struct InMemoryCatalog {
    languages: RwLock<Vec<LanguageRecord>>,
    site_defaults: RwLock<Vec<SiteDefaultEntry>>,
    global_default: RwLock<String>,
    languages_tag: InvalidationTag,
    sites_tag: InvalidationTag,
    settings_tag: InvalidationTag,
}

impl InMemoryCatalog {
    pub fn new(
        languages: Vec<LanguageRecord>,
        site_defaults: Vec<SiteDefaultEntry>,
        global_default: impl Into<String>,
    ) -> Self {
        Self {
            languages: RwLock::new(languages),
            site_defaults: RwLock::new(site_defaults),
            global_default: RwLock::new(global_default.into()),
            ..Self::default()
        }
    }

    pub async fn set_languages(&self, languages: Vec<LanguageRecord>) {
        *self.languages.write().await = languages;
        self.languages_tag.invalidate();
    }

    pub async fn set_site_defaults(&self, site_defaults: Vec<SiteDefaultEntry>) {
        *self.site_defaults.write().await = site_defaults;
        self.sites_tag.invalidate();
    }

    pub async fn set_global_default(&self, culture: impl Into<String>) {
        *self.global_default.write().await = culture.into();
        self.settings_tag.invalidate();
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn list_languages(&self) -> Result<Vec<LanguageRecord>> {
        Ok(self.languages.read().await.clone())
    }

    async fn list_site_defaults(&self) -> Result<Vec<SiteDefaultEntry>> {
        Ok(self.site_defaults.read().await.clone())
    }

    async fn global_default_culture(&self) -> Result<String> {
        Ok(self.global_default.read().await.clone())
    }

    fn languages_tag(&self) -> InvalidationTag {
        self.languages_tag.clone()
    }

    fn sites_tag(&self) -> InvalidationTag {
        self.sites_tag.clone()
    }

    fn settings_tag(&self) -> InvalidationTag {
        self.settings_tag.clone()
    }
}

/// Normalized alias -> record table built from one catalog snapshot.
///
/// Per record, four aliases are registered: the lowercase culture code, its
/// primary subtag, the lowercase short name, and the lowercase display name.
/// Collisions are first-write-wins, so alias ownership follows the catalog
/// iteration order the provider delivers.
struct CatalogIndex {
    by_alias: HashMap<String, LanguageRecord>,
}

impl CatalogIndex {
    fn build(records: Vec<LanguageRecord>) -> Self {
        let mut by_alias: HashMap<String, LanguageRecord> = HashMap::new();
        for record in records {
            let aliases = [
                record.name.to_lowercase(),
                record.culture_code.to_lowercase(),
                record.primary_subtag().to_lowercase(),
                record.display_name.to_lowercase(),
            ];
            for alias in aliases {
                by_alias.entry(alias).or_insert_with(|| record.clone());
            }
        }
        Self { by_alias }
    }

    fn lookup(&self, candidate: &str) -> Option<&LanguageRecord> {
        let normalized = candidate.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        if let Some(record) = self.by_alias.get(&normalized) {
            return Some(record);
        }
        let subtag = normalized.split('-').next().unwrap_or(&normalized);
        self.by_alias.get(subtag)
    }
}

/// Resolves arbitrary candidate strings against the catalog.
pub struct CultureMatcher {
    provider: Arc<dyn CatalogProvider>,
    index: TtlCache<CatalogIndex>,
}

impl CultureMatcher {
    pub fn new(provider: Arc<dyn CatalogProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            index: TtlCache::new("catalog-index", ttl),
        }
    }

    /// Match a candidate string to a catalog record.
    ///
    /// Normalization is trim + lowercase; an exact alias hit wins, otherwise
    /// the candidate's primary subtag is tried ("en-GB" finds an "en"
    /// record when no "en-GB" entry exists). `Ok(None)` means the catalog
    /// simply has no such language; `Err` only surfaces catalog fetch
    /// failures.
    pub async fn lookup(&self, candidate: &str) -> Result<Option<LanguageRecord>> {
        let index = self
            .index
            .load_or_compute(&[self.provider.languages_tag()], || async {
                let records = self.provider.list_languages().await?;
                debug!("building catalog index from {} records", records.len());
                Ok(CatalogIndex::build(records))
            })
            .await?;

        Ok(index.lookup(candidate).cloned())
    }
}
