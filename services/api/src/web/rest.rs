//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use corepick_core::domain::{CoreCard, Step, SummaryRecord};
use corepick_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_handler,
        list_cards_handler,
        create_card_handler,
        delete_card_handler,
        toggle_step_handler,
    ),
    components(
        schemas(GenerateRequest, SummaryResponse, CreateCardRequest, CardDto, StepDto, ErrorResponse)
    ),
    tags(
        (name = "CorePick API", description = "API endpoints for the URL summary card service.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request payload for a summary generation.
#[derive(Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// The page or video URL to summarize.
    #[serde(default)]
    url: String,
}

/// One actionable step as it appears on the wire.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepDto {
    id: Uuid,
    order: u32,
    content: String,
    is_completed: bool,
}
impl StepDto {
    fn from_domain(step: &Step) -> Self {
        Self {
            id: step.id,
            order: step.order,
            content: step.content.clone(),
            is_completed: step.is_completed,
        }
    }

    fn to_domain(self) -> Step {
        Step {
            id: self.id,
            order: self.order,
            content: self.content,
            is_completed: self.is_completed,
        }
    }
}

/// The response payload for a generated summary. Not persisted; saving it as
/// a card is a separate request.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    title: String,
    summary: Vec<String>,
    next_steps: Vec<StepDto>,
}
impl SummaryResponse {
    fn from_record(record: SummaryRecord) -> Self {
        Self {
            title: record.title,
            summary: record.summary,
            next_steps: record.next_steps.iter().map(StepDto::from_domain).collect(),
        }
    }
}

/// The request payload for saving a card.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    url: String,
    title: String,
    #[serde(default)]
    summary: Vec<String>,
    #[serde(default)]
    next_steps: Vec<StepDto>,
}

/// A saved card as it appears on the wire.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardDto {
    id: Uuid,
    url: String,
    title: String,
    summary: Vec<String>,
    next_steps: Vec<StepDto>,
    created_at: DateTime<Utc>,
}
impl CardDto {
    fn from_domain(card: &CoreCard) -> Self {
        Self {
            id: card.id,
            url: card.url.clone(),
            title: card.title.clone(),
            summary: card.summary.clone(),
            next_steps: card.next_steps.iter().map(StepDto::from_domain).collect(),
            created_at: card.created_at,
        }
    }
}

/// The error payload shared by all endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Summarize a single URL.
///
/// Runs the full pipeline for the given URL and returns the summary without
/// persisting anything. A model reply that cannot be parsed still produces a
/// 200 with a degraded body; only fetch and model transport failures are 500s.
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Summary generated (possibly degraded)", body = SummaryResponse),
        (status = 400, description = "Missing or empty URL", body = ErrorResponse),
        (status = 500, description = "Fetch or model failure", body = ErrorResponse)
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let url = payload.url.trim();
    if url.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "URLが必要です"));
    }

    match app_state.pipeline.run(url).await {
        Ok(record) => Ok(Json(SummaryResponse::from_record(record))),
        Err(e) => {
            error!("Summarization failed for {}: {:?}", url, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "解析に失敗しました",
            ))
        }
    }
}

/// List all saved cards.
///
/// Cards come back most recent first.
#[utoipa::path(
    get,
    path = "/api/cards",
    responses(
        (status = 200, description = "The full card list", body = [CardDto])
    )
)]
pub async fn list_cards_handler(State(app_state): State<Arc<AppState>>) -> Json<Vec<CardDto>> {
    let cards = app_state.list_cards().await;
    Json(cards.iter().map(CardDto::from_domain).collect())
}

/// Save a generated summary as a card.
///
/// The server assigns the card id and timestamp. Step ids must be unique and
/// step order must be the contiguous sequence 1..=len.
#[utoipa::path(
    post,
    path = "/api/cards",
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Card saved", body = CardDto),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn create_card_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardDto>), (StatusCode, Json<ErrorResponse>)> {
    if payload.url.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "URLが必要です"));
    }

    let next_steps: Vec<Step> = payload.next_steps.into_iter().map(StepDto::to_domain).collect();
    if !Step::sequence_is_valid(&next_steps) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "nextStepsの形式が不正です",
        ));
    }

    let card = CoreCard::new(payload.url, payload.title, payload.summary, next_steps);
    match app_state.add_card(card).await {
        Ok(card) => Ok((StatusCode::CREATED, Json(CardDto::from_domain(&card)))),
        Err(e) => {
            error!("Failed to save card: {:?}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "保存に失敗しました",
            ))
        }
    }
}

/// Delete a saved card.
#[utoipa::path(
    delete,
    path = "/api/cards/{id}",
    params(
        ("id" = Uuid, Path, description = "The id of the card to delete.")
    ),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 404, description = "No card with that id", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn delete_card_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match app_state.delete_card(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(PortError::NotFound(message)) => {
            Err(error_response(StatusCode::NOT_FOUND, &message))
        }
        Err(e) => {
            error!("Failed to delete card {}: {:?}", id, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "削除に失敗しました",
            ))
        }
    }
}

/// Toggle one step's completion flag.
///
/// Returns the updated card. Step ids and ordering are never changed by a
/// toggle.
#[utoipa::path(
    post,
    path = "/api/cards/{card_id}/steps/{step_id}/toggle",
    params(
        ("card_id" = Uuid, Path, description = "The id of the card."),
        ("step_id" = Uuid, Path, description = "The id of the step to toggle.")
    ),
    responses(
        (status = 200, description = "The updated card", body = CardDto),
        (status = 404, description = "No such card or step", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn toggle_step_handler(
    State(app_state): State<Arc<AppState>>,
    Path((card_id, step_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CardDto>, (StatusCode, Json<ErrorResponse>)> {
    match app_state.toggle_step(card_id, step_id).await {
        Ok(card) => Ok(Json(CardDto::from_domain(&card))),
        Err(PortError::NotFound(message)) => {
            Err(error_response(StatusCode::NOT_FOUND, &message))
        }
        Err(e) => {
            error!(
                "Failed to toggle step {} on card {}: {:?}",
                step_id, card_id, e
            );
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "更新に失敗しました",
            ))
        }
    }
}
