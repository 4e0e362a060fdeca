use anyhow::Result;
use axum::extract::Extension;
use axum::routing::get;
use axum::{middleware, Json, Router};
use language_context::http::language_context_middleware;
use language_context::{
    AlignedCulture, InMemoryCatalog, LanguageContextLayer, LanguageContextSetter, LanguageRecord,
    LanguageResolver, RequestScope, ResolverConfig, SetterOptions, SiteDefaultEntry,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("language_context=info".parse()?),
        )
        .init();

    info!("Starting language context demo server");

    // Load configuration from environment
    let config = ResolverConfig::from_env()?;

    // Demo catalog; a real host plugs in its own CatalogProvider
    let catalog = Arc::new(InMemoryCatalog::new(
        demo_languages(),
        vec![SiteDefaultEntry {
            site_id: 1,
            culture: "en-US".to_string(),
        }],
        "en-US",
    ));

    let resolver = Arc::new(LanguageResolver::new(config, catalog));
    let setter = Arc::new(LanguageContextSetter::new(
        resolver,
        SetterOptions::default(),
    ));
    let layer = LanguageContextLayer::new(setter);

    let app = Router::new()
        .route("/", get(current_language))
        .route("/preferences", get(user_preferences))
        .route("/pages/:lang/home", get(current_language))
        .layer(middleware::from_fn_with_state(
            layer,
            language_context_middleware,
        ))
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn current_language(
    Extension(scope): Extension<Arc<RequestScope>>,
    aligned: Option<Extension<AlignedCulture>>,
) -> Json<serde_json::Value> {
    Json(json!({
        "resolved": scope.resolved(),
        "aligned_culture": aligned.map(|Extension(culture)| culture.0.to_string()),
    }))
}

async fn user_preferences(
    Extension(scope): Extension<Arc<RequestScope>>,
) -> Json<serde_json::Value> {
    Json(json!({
        "user_languages": scope.user_languages(),
    }))
}

fn demo_languages() -> Vec<LanguageRecord> {
    vec![
        LanguageRecord {
            name: "english".to_string(),
            id: 1,
            guid: "7c9e6679-7425-40de-944b-e07fc1f90ae7".to_string(),
            display_name: "English (United States)".to_string(),
            culture_code: "en-US".to_string(),
            icon: Some("us".to_string()),
        },
        LanguageRecord {
            name: "spanish".to_string(),
            id: 2,
            guid: "9b2b6c23-6c7f-4f82-9c4b-3c1a6f1d2e3f".to_string(),
            display_name: "Español".to_string(),
            culture_code: "es-ES".to_string(),
            icon: Some("es".to_string()),
        },
        LanguageRecord {
            name: "french".to_string(),
            id: 3,
            guid: "c56a4180-65aa-42ec-a945-5fd21dec0538".to_string(),
            display_name: "Français".to_string(),
            culture_code: "fr-FR".to_string(),
            icon: Some("fr".to_string()),
        },
    ]
}
