//! services/api/src/web/insight.rs
//!
//! The AI "daily insight" endpoint consumed by the dashboard card.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{error, instrument};
use vivamate_core::{InsightEnvelope, InsightKind};

use crate::error::ApiError;
use crate::web::protocol::InsightQuery;
use crate::web::state::AppState;
use crate::web::validate::{ValidatedQuery, ValidationFailure};

/// GET /ai/insight?type=tip|fact - Generate one insight
#[utoipa::path(
    get,
    path = "/ai/insight",
    params(("type" = String, Query, description = "Either `tip` or `fact`")),
    responses(
        (status = 200, description = "`{ success: true, insight }`"),
        (status = 400, description = "Validation failed", body = ValidationFailure),
        (status = 502, description = "`{ success: false, message }`")
    )
)]
#[instrument(level = "info", skip(state, query), fields(kind = %query.kind))]
pub async fn insight_handler(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<InsightQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = query
        .kind
        .parse::<InsightKind>()
        .map_err(ApiError::MalformedRequest)?;

    let response = match state.insight_adapter.generate_insight(kind).await {
        Ok(insight) => (
            StatusCode::OK,
            Json(InsightEnvelope {
                success: true,
                insight: Some(insight),
                message: None,
            }),
        ),
        Err(e) => {
            error!("Failed to generate insight: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(InsightEnvelope {
                    success: false,
                    insight: None,
                    message: Some("Could not generate an insight right now".to_string()),
                }),
            )
        }
    };
    Ok(response)
}
