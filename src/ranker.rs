//! Ranking of the user's accepted languages.
//!
//! Sorting is by descending quality weight with a stable tie-break: two
//! entries at the same weight keep their original order of appearance,
//! which in turn decides which of two equally preferred languages the
//! resolver tries first. Entries the catalog cannot match are kept in the
//! output with no record attached.

use crate::catalog::CultureMatcher;
use crate::models::UserLanguagePreference;
use crate::signals::AcceptedLanguage;
use anyhow::Result;
use std::cmp::Ordering;

/// Order the accepted languages and map each through the catalog.
pub(crate) async fn rank_accepted_languages(
    matcher: &CultureMatcher,
    mut accepted: Vec<AcceptedLanguage>,
) -> Result<Vec<UserLanguagePreference>> {
    // Vec::sort_by is stable; equal weights preserve appearance order.
    accepted.sort_by(|a, b| {
        b.effective_weight()
            .partial_cmp(&a.effective_weight())
            .unwrap_or(Ordering::Equal)
    });

    let mut ranked = Vec::with_capacity(accepted.len());
    for entry in accepted {
        let matched = matcher.lookup(&entry.code).await?;
        ranked.push(UserLanguagePreference {
            requested: entry.code,
            matched,
        });
    }

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::models::LanguageRecord;
    use std::sync::Arc;
    use std::time::Duration;

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

    fn matcher_over(records: Vec<LanguageRecord>) -> CultureMatcher {
        let provider = Arc::new(InMemoryCatalog::new(records, vec![], "en-US"));
        CultureMatcher::new(provider, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_orders_by_descending_weight_with_stable_ties() {
        let matcher = matcher_over(vec![
            record(1, "english", "en-US"),
            record(2, "german", "de-DE"),
            record(3, "french", "fr-FR"),
        ]);

        let ranked = rank_accepted_languages(
            &matcher,
            vec![
                AcceptedLanguage::new("fr", Some(0.9)),
                AcceptedLanguage::new("en", Some(1.0)),
                AcceptedLanguage::new("de", Some(1.0)),
            ],
        )
        .await
        .unwrap();

        let order: Vec<&str> = ranked.iter().map(|p| p.requested.as_str()).collect();
        assert_eq!(order, vec!["en", "de", "fr"]);
    }

    #[tokio::test]
    async fn test_missing_weight_ranks_at_full_strength() {
        let matcher = matcher_over(vec![record(1, "english", "en-US")]);

        let ranked = rank_accepted_languages(
            &matcher,
            vec![
                AcceptedLanguage::new("fr", Some(0.8)),
                AcceptedLanguage::new("en", None),
            ],
        )
        .await
        .unwrap();

        assert_eq!(ranked[0].requested, "en");
    }

    #[tokio::test]
    async fn test_unmatched_entries_are_retained_with_no_record() {
        let matcher = matcher_over(vec![record(1, "english", "en-US")]);

        let ranked = rank_accepted_languages(
            &matcher,
            vec![
                AcceptedLanguage::new("en", Some(1.0)),
                AcceptedLanguage::new("xx-YY", Some(0.5)),
            ],
        )
        .await
        .unwrap();

        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].matched.is_some());
        assert_eq!(ranked[1].requested, "xx-YY");
        assert!(ranked[1].matched.is_none());
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_output() {
        let matcher = matcher_over(vec![]);
        let ranked = rank_accepted_languages(&matcher, vec![]).await.unwrap();
        assert!(ranked.is_empty());
    }
}
