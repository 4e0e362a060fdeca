//! Per-request memoization scope.
//!
//! One `RequestScope` is created per logical request and dropped with it.
//! It is not a cache: no TTL, no eviction, just two write-once cells so a
//! request never re-runs the resolution chain it already ran.

use crate::models::{ResolvedLanguage, UserLanguagePreference};
use std::sync::OnceLock;

/// Request-lifetime storage for the resolved language and the ranked
/// user-language list.
///
/// Reads before the first write return `None`. Writes after the first are
/// idempotent no-ops; within one request the first resolution wins and every
/// later read observes it unchanged, regardless of what happens to the live
/// catalog in the meantime.
#[derive(Debug, Default)]
pub struct RequestScope {
    resolved: OnceLock<ResolvedLanguage>,
    user_languages: OnceLock<Vec<UserLanguagePreference>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized resolution, if one has been computed for this request.
    pub fn resolved(&self) -> Option<&ResolvedLanguage> {
        self.resolved.get()
    }

    /// The memoized ranked user-language list, if computed.
    pub fn user_languages(&self) -> Option<&[UserLanguagePreference]> {
        self.user_languages.get().map(|v| v.as_slice())
    }

    /// Store the resolution. A second write is silently ignored.
    pub fn memoize_resolved(&self, resolved: ResolvedLanguage) {
        let _ = self.resolved.set(resolved);
    }

    /// Store the ranked list. A second write is silently ignored.
    pub fn memoize_user_languages(&self, languages: Vec<UserLanguagePreference>) {
        let _ = self.user_languages.set(languages);
    }
}
