//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        card_store::JsonCardStoreAdapter, fetch::HttpFetchAdapter,
        summary_llm::GeminiSummaryAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        create_card_handler, delete_card_handler, generate_handler, list_cards_handler,
        rest::ApiDoc, state::AppState, summary_task::SummaryPipeline, toggle_step_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let gemini_config = OpenAIConfig::new()
        .with_api_base(&config.gemini_api_base)
        .with_api_key(
            config
                .gemini_api_key
                .as_ref()
                .ok_or_else(|| ApiError::Internal("GEMINI_API_KEY is required".to_string()))?,
        );
    let gemini_client = Client::with_config(gemini_config);

    let summary_adapter = Arc::new(GeminiSummaryAdapter::new(
        gemini_client,
        config.summary_model.clone(),
    ));
    let fetch_adapter = Arc::new(HttpFetchAdapter::new());
    let store_adapter = Arc::new(JsonCardStoreAdapter::new(config.card_store_path.clone()));

    // --- 3. Build the Shared AppState ---
    let pipeline = SummaryPipeline::new(fetch_adapter, summary_adapter);
    let app_state = Arc::new(AppState::new(config.clone(), pipeline, store_adapter).await?);
    info!(
        "Loaded {} saved cards from {}",
        app_state.list_cards().await.len(),
        config.card_store_path.display()
    );

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/api/generate", post(generate_handler))
        .route("/api/cards", get(list_cards_handler).post(create_card_handler))
        .route("/api/cards/{id}", delete(delete_card_handler))
        .route(
            "/api/cards/{card_id}/steps/{step_id}/toggle",
            post(toggle_step_handler),
        )
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
