//! Collaborator surface: the messaging service mirrors activity facts
//! here, and the session workflow signals completed consultations so
//! the earning ledger can honor the purchase.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    error::Result,
    models::common::MessageResponse,
    models::earnings::EarningView,
    models::purchases::RecordMessageRequest,
};

/// POST /api/v1/sessions/{session_request_id}/messages
#[instrument(skip(state, request))]
pub async fn record_message(
    State(state): State<AppState>,
    Path(session_request_id): Path<Uuid>,
    Json(request): Json<RecordMessageRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .purchase_service
        .record_message_activity(session_request_id, request.sender_id, request.sent_at)
        .await?;

    Ok(Json(MessageResponse::new("Message activity recorded")))
}

/// POST /api/v1/purchases/{purchase_id}/complete
///
/// Marks the consultation as honored: the session closes and an
/// earning is created from the purchase. Refunded purchases are
/// declined with a conflict.
#[instrument(skip(state))]
pub async fn complete_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> Result<Json<EarningView>> {
    let earning = state
        .earning_service
        .create_earning_from_purchase(purchase_id)
        .await?;

    Ok(Json(EarningView::from(earning)))
}
