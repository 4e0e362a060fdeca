//! Axum integration: signal extraction from real requests, the
//! context-setting middleware, and the extension types handlers read.
//!
//! The middleware is registered with
//! `axum::middleware::from_fn_with_state(layer, language_context_middleware)`
//! on a router. It creates a fresh [`RequestScope`], runs the setter
//! best-effort (a collaborator failure is logged and the request proceeds
//! without persisted context), and inserts the scope — plus the aligned
//! culture, when enabled and valid — into the request extensions.

use crate::scope::RequestScope;
use crate::setter::LanguageContextSetter;
use crate::signals::{AcceptedLanguage, RequestSignals};
use axum::extract::{RawPathParams, Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use unic_langid::LanguageIdentifier;

/// Ambient culture supplied by the host, read as a resolution signal.
///
/// Insert this into request extensions from earlier middleware when the
/// hosting context carries a culture of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientCulture(pub String);

/// The site/channel a request belongs to, for multi-site hosts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteChannel(pub i64);

/// Validated culture of the resolved language, exposed for formatting
/// layers when alignment is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedCulture(pub LanguageIdentifier);

/// Shared state handed to the middleware.
#[derive(Clone)]
pub struct LanguageContextLayer {
    setter: Arc<LanguageContextSetter>,
}

impl LanguageContextLayer {
    pub fn new(setter: Arc<LanguageContextSetter>) -> Self {
        Self { setter }
    }
}

/// [`RequestSignals`] over an axum request.
///
/// All signal data is copied out of the request up front so the request can
/// keep moving through the middleware stack while signals are read.
pub struct HttpSignals {
    query: HashMap<String, String>,
    headers: HeaderMap,
    cookies: HashMap<String, String>,
    route_values: HashMap<String, String>,
    ambient: Option<String>,
    site: Option<i64>,
}

impl HttpSignals {
    pub fn from_request(request: &Request, params: Option<&RawPathParams>) -> Self {
        let query = request
            .uri()
            .query()
            .map(parse_query)
            .unwrap_or_default();

        let cookies = parse_cookies(request.headers());

        let route_values = params
            .map(|params| {
                params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let ambient = request
            .extensions()
            .get::<AmbientCulture>()
            .map(|culture| culture.0.clone());

        let site = request
            .extensions()
            .get::<SiteChannel>()
            .map(|channel| channel.0);

        Self {
            query,
            headers: request.headers().clone(),
            cookies,
            route_values,
            ambient,
            site,
        }
    }
}

impl RequestSignals for HttpSignals {
    fn query_value(&self, name: &str) -> Option<String> {
        self.query.get(name).cloned()
    }

    fn cookie_value(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn header_value(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    fn route_value(&self, name: &str) -> Option<String> {
        self.route_values.get(name).cloned()
    }

    fn ambient_culture(&self) -> Option<String> {
        self.ambient.clone()
    }

    fn accepted_languages(&self) -> Vec<AcceptedLanguage> {
        self.headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(parse_accept_language)
            .unwrap_or_default()
    }

    fn site_id(&self) -> Option<i64> {
        self.site
    }
}

/// Resolve and persist language context for every request passing through.
pub async fn language_context_middleware(
    State(layer): State<LanguageContextLayer>,
    params: Option<RawPathParams>,
    mut request: Request,
    next: Next,
) -> Response {
    let scope = Arc::new(RequestScope::new());
    let signals = HttpSignals::from_request(&request, params.as_ref());

    match layer.setter.set_language_context(&signals, &scope).await {
        Ok(resolved) => {
            if let Some(aligned) = layer.setter.aligned_culture(&resolved) {
                request.extensions_mut().insert(AlignedCulture(aligned));
            }
        }
        Err(err) => error!("failed to set language context: {err:#}"),
    }

    if let Err(err) = layer.setter.set_user_language_context(&signals, &scope).await {
        error!("failed to set user language context: {err:#}");
    }

    request.extensions_mut().insert(scope);
    next.run(request).await
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
    cookies
}

/// Parse an `Accept-Language` header value into weighted entries.
///
/// Entries keep their order of appearance; ranking happens downstream. A
/// `q=` parameter that does not parse as a number is treated as absent, so
/// the entry ranks at full strength rather than being dropped.
pub fn parse_accept_language(raw: &str) -> Vec<AcceptedLanguage> {
    raw.split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';').map(str::trim);
            let code = pieces.next()?.to_string();
            if code.is_empty() {
                return None;
            }
            let weight = pieces
                .find_map(|param| param.strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok());
            Some(AcceptedLanguage { code, weight })
        })
        .collect()
}
