//! Persisting language context into the request scope.
//!
//! A calling middleware invokes the setter once per request so downstream
//! readers get the memoized answer instead of re-running the chain. The
//! optional culture alignment is a best-effort side effect: the resolved
//! culture code is validated as a language identifier and handed back for
//! the host to install wherever its formatting layer looks; a malformed
//! code skips the side effect without touching the resolution result.

use crate::models::ResolvedLanguage;
use crate::resolver::LanguageResolver;
use crate::scope::RequestScope;
use crate::signals::RequestSignals;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;
use unic_langid::LanguageIdentifier;

/// Options controlling the persist operation.
#[derive(Debug, Clone)]
pub struct SetterOptions {
    /// When true, the middleware also exposes the resolved culture as an
    /// aligned-culture value for formatting layers.
    pub align_ambient_culture: bool,
}

impl Default for SetterOptions {
    fn default() -> Self {
        Self {
            align_ambient_culture: true,
        }
    }
}

pub struct LanguageContextSetter {
    resolver: Arc<LanguageResolver>,
    options: SetterOptions,
}

impl LanguageContextSetter {
    pub fn new(resolver: Arc<LanguageResolver>, options: SetterOptions) -> Self {
        Self { resolver, options }
    }

    pub fn options(&self) -> &SetterOptions {
        &self.options
    }

    pub fn resolver(&self) -> &LanguageResolver {
        &self.resolver
    }

    /// Resolve and persist the request language into `scope`.
    ///
    /// Returns the resolution so the caller can perform the alignment side
    /// effect. Errors only on collaborator failure; the caller decides
    /// whether to log-and-continue (the middleware does).
    pub async fn set_language_context(
        &self,
        signals: &dyn RequestSignals,
        scope: &RequestScope,
    ) -> Result<ResolvedLanguage> {
        let resolved = self.resolver.resolve(signals, scope).await?;
        debug!(
            "persisted language context: {} ({})",
            resolved.record.culture_code, resolved.source
        );
        Ok(resolved)
    }

    /// Rank and persist the user's accepted languages into `scope`.
    pub async fn set_user_language_context(
        &self,
        signals: &dyn RequestSignals,
        scope: &RequestScope,
    ) -> Result<()> {
        let ranked = self.resolver.rank_user_languages(signals, scope).await?;
        debug!("persisted {} user language preferences", ranked.len());
        Ok(())
    }

    /// Validate the resolved culture for the alignment side effect.
    ///
    /// `None` when alignment is disabled or the culture code does not parse
    /// as a language identifier; the resolution result is unaffected either
    /// way.
    pub fn aligned_culture(&self, resolved: &ResolvedLanguage) -> Option<LanguageIdentifier> {
        if !self.options.align_ambient_culture {
            return None;
        }
        resolved.record.culture_code.parse().ok()
    }
}
