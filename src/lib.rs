//! Per-request language resolution for multi-site web platforms.
//!
//! For each inbound request, the crate decides which catalog language
//! governs content selection and formatting by walking an ordered list of
//! candidate sources (query string, cookie, header, route value, ambient
//! culture, the user's accepted languages, site default, global default)
//! and matching the first usable candidate against the platform's language
//! catalog. Resolution always produces an answer; the chain bottoms out in
//! a hard-coded baseline record that a configured catalog never reaches.
//!
//! # Architecture
//!
//! - `catalog`: catalog access boundary and the alias-indexed culture matcher
//! - `cache`: TTL cache with dependency-tag invalidation for shared state
//! - `defaults`: site-level and global-level fallback languages
//! - `resolver`: the ordered-source dispatch engine
//! - `ranker`: stable weight-ordering of the accepted-languages signal
//! - `scope`: per-request memoization
//! - `setter`: the persist-into-scope service middleware calls
//! - `signals`: the request-signal extraction boundary
//! - `http`: axum middleware and extractors
//!
//! # Example
//!
//! ```rust,ignore
//! use language_context::{
//!     InMemoryCatalog, LanguageContextSetter, LanguageResolver, ResolverConfig,
//!     SetterOptions,
//! };
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(InMemoryCatalog::new(languages, site_defaults, "en-US"));
//! let resolver = Arc::new(LanguageResolver::new(ResolverConfig::from_env()?, catalog));
//! let setter = Arc::new(LanguageContextSetter::new(resolver, SetterOptions::default()));
//! // wire language_context::http::language_context_middleware into the router
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod http;
pub mod models;
mod ranker;
pub mod resolver;
pub mod scope;
pub mod setter;
pub mod signals;

pub use cache::{InvalidationTag, TtlCache};
pub use catalog::{CatalogProvider, CultureMatcher, InMemoryCatalog, SiteDefaultEntry};
pub use config::{ConfigError, ResolverConfig};
pub use defaults::baseline_record;
pub use http::{AlignedCulture, AmbientCulture, LanguageContextLayer, SiteChannel};
pub use models::{LanguageRecord, LanguageSource, ResolvedLanguage, UserLanguagePreference};
pub use resolver::LanguageResolver;
pub use scope::RequestScope;
pub use setter::{LanguageContextSetter, SetterOptions};
pub use signals::{AcceptedLanguage, NoRequest, RequestSignals, StaticSignals};
