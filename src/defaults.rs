//! Site and global default languages.
//!
//! Two independently cached fallback computations sit at the tail of the
//! resolution chain. The site table maps every configured site/channel to
//! its default language; the global default reads the platform-wide culture
//! setting. Neither can come back empty-handed: the chain bottoms out in a
//! hard-coded baseline record, the only fabricated record in the system,
//! which a correctly configured catalog never reaches.

use crate::cache::TtlCache;
use crate::catalog::{CatalogProvider, CultureMatcher};
use crate::models::LanguageRecord;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Culture code of the baseline record.
pub const BASELINE_CULTURE: &str = "en-US";

pub struct DefaultLanguages {
    provider: Arc<dyn CatalogProvider>,
    matcher: Arc<CultureMatcher>,
    site_table: TtlCache<HashMap<i64, LanguageRecord>>,
    global: TtlCache<LanguageRecord>,
}

impl DefaultLanguages {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        matcher: Arc<CultureMatcher>,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            matcher,
            site_table: TtlCache::new("site-defaults", ttl),
            global: TtlCache::new("global-default", ttl),
        }
    }

    /// The default language for a site/channel.
    ///
    /// Unknown site ids and sites whose configured culture has no catalog
    /// match fall back to the global default.
    pub async fn site_default(&self, site_id: i64) -> Result<LanguageRecord> {
        let table = self
            .site_table
            .load_or_compute(
                &[self.provider.sites_tag(), self.provider.languages_tag()],
                || async {
                    let entries = self.provider.list_site_defaults().await?;
                    let mut table = HashMap::with_capacity(entries.len());
                    for entry in entries {
                        match self.matcher.lookup(&entry.culture).await? {
                            Some(record) => {
                                table.insert(entry.site_id, record);
                            }
                            None => warn!(
                                "site {} default culture '{}' has no catalog entry",
                                entry.site_id, entry.culture
                            ),
                        }
                    }
                    debug!("site default table built with {} entries", table.len());
                    Ok(table)
                },
            )
            .await?;

        match table.get(&site_id) {
            Some(record) => Ok(record.clone()),
            None => self.global_default().await,
        }
    }

    /// The platform-wide default language.
    ///
    /// The configured culture string goes through the matcher like any
    /// other candidate; if even that fails, the baseline record is the
    /// unconditional answer.
    pub async fn global_default(&self) -> Result<LanguageRecord> {
        let record = self
            .global
            .load_or_compute(
                &[self.provider.settings_tag(), self.provider.languages_tag()],
                || async {
                    let culture = self.provider.global_default_culture().await?;
                    match self.matcher.lookup(&culture).await? {
                        Some(record) => Ok(record),
                        None => {
                            warn!(
                                "global default culture '{}' has no catalog entry, \
                                 using baseline",
                                culture
                            );
                            Ok(baseline_record())
                        }
                    }
                },
            )
            .await?;

        Ok((*record).clone())
    }
}

/// The a priori english record used when the catalog cannot answer at all.
pub fn baseline_record() -> LanguageRecord {
    LanguageRecord {
        name: "english".to_string(),
        id: 0,
        guid: "00000000-0000-0000-0000-000000000000".to_string(),
        display_name: "English".to_string(),
        culture_code: BASELINE_CULTURE.to_string(),
        icon: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, SiteDefaultEntry};

    fn record(id: i64, name: &str, code: &str) -> LanguageRecord {
        LanguageRecord {
            name: name.to_string(),
            id,
            guid: format!("00000000-0000-0000-0000-{:012}", id),
            display_name: name.to_string(),
            culture_code: code.to_string(),
            icon: None,
        }
    }

    fn defaults_over(catalog: Arc<InMemoryCatalog>) -> DefaultLanguages {
        let ttl = Duration::from_secs(3600);
        let matcher = Arc::new(CultureMatcher::new(catalog.clone(), ttl));
        DefaultLanguages::new(catalog, matcher, ttl)
    }

    #[tokio::test]
    async fn test_site_default_resolves_configured_culture() {
        let catalog = Arc::new(InMemoryCatalog::new(
            vec![record(1, "english", "en-US"), record(2, "french", "fr-FR")],
            vec![SiteDefaultEntry {
                site_id: 10,
                culture: "fr-FR".to_string(),
            }],
            "en-US",
        ));
        let defaults = defaults_over(catalog);

        let found = defaults.site_default(10).await.unwrap();
        assert_eq!(found.id, 2);
    }

    #[tokio::test]
    async fn test_unknown_site_falls_back_to_global() {
        let catalog = Arc::new(InMemoryCatalog::new(
            vec![record(1, "english", "en-US")],
            vec![],
            "en-US",
        ));
        let defaults = defaults_over(catalog);

        let found = defaults.site_default(99).await.unwrap();
        assert_eq!(found.id, 1);
    }

    #[tokio::test]
    async fn test_site_with_unmatched_culture_falls_back_to_global() {
        let catalog = Arc::new(InMemoryCatalog::new(
            vec![record(1, "english", "en-US")],
            vec![SiteDefaultEntry {
                site_id: 10,
                culture: "xx-YY".to_string(),
            }],
            "en-US",
        ));
        let defaults = defaults_over(catalog);

        let found = defaults.site_default(10).await.unwrap();
        assert_eq!(found.id, 1);
    }

    #[tokio::test]
    async fn test_global_default_resolves_setting() {
        let catalog = Arc::new(InMemoryCatalog::new(
            vec![record(1, "english", "en-US"), record(2, "french", "fr-FR")],
            vec![],
            "fr",
        ));
        let defaults = defaults_over(catalog);

        // Matched via subtag fallback.
        let found = defaults.global_default().await.unwrap();
        assert_eq!(found.id, 2);
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_baseline() {
        let catalog = Arc::new(InMemoryCatalog::new(vec![], vec![], "nonsense"));
        let defaults = defaults_over(catalog);

        let found = defaults.global_default().await.unwrap();
        assert_eq!(found.culture_code, BASELINE_CULTURE);
        assert_eq!(found.id, 0);
    }

    #[tokio::test]
    async fn test_site_table_refreshes_after_site_change() {
        let catalog = Arc::new(InMemoryCatalog::new(
            vec![record(1, "english", "en-US"), record(2, "french", "fr-FR")],
            vec![],
            "en-US",
        ));
        let defaults = defaults_over(catalog.clone());

        assert_eq!(defaults.site_default(10).await.unwrap().id, 1);

        catalog
            .set_site_defaults(vec![SiteDefaultEntry {
                site_id: 10,
                culture: "fr-FR".to_string(),
            }])
            .await;

        assert_eq!(defaults.site_default(10).await.unwrap().id, 2);
    }
}
