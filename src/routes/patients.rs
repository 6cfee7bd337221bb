use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    middleware::PartyIdentity,
    models::purchases::{CreatePurchaseRequest, PurchaseResponse},
    models::refunds::{
        RefundHistoryResponse, RefundOutcomeResponse, RefundRecord, RequestRefundBody,
    },
};
use entity::sea_orm_active_enums::PartyRole;

/// POST /api/v1/purchases
#[instrument(skip(state, request))]
pub async fn create_purchase(
    State(state): State<AppState>,
    identity: PartyIdentity,
    Json(request): Json<CreatePurchaseRequest>,
) -> Result<Json<PurchaseResponse>> {
    identity.require_role(PartyRole::Patient)?;

    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let (purchase, wallet_balance) = state
        .purchase_service
        .create_purchase(
            identity.party_id,
            request.session_request_id,
            request.amount,
            request.duration_minutes,
        )
        .await?;

    Ok(Json(PurchaseResponse {
        purchase_id: purchase.id,
        session_request_id: purchase.session_request_id,
        amount: purchase.amount,
        duration_minutes: purchase.duration_minutes,
        created_at: purchase.created_at,
        expires_at: purchase.expires_at,
        wallet_balance,
    }))
}

/// POST /api/v1/purchases/{purchase_id}/refund
#[instrument(skip(state, body))]
pub async fn request_refund(
    State(state): State<AppState>,
    identity: PartyIdentity,
    Path(purchase_id): Path<Uuid>,
    Json(body): Json<RequestRefundBody>,
) -> Result<Json<RefundOutcomeResponse>> {
    identity.require_role(PartyRole::Patient)?;

    body.validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let outcome = state
        .refund_service
        .request_refund(identity.party_id, purchase_id, body.reason)
        .await?;

    Ok(Json(RefundOutcomeResponse {
        applied: outcome.applied,
        refund_amount: outcome.amount,
    }))
}

/// GET /api/v1/refunds/history
#[instrument(skip(state, identity))]
pub async fn refund_history(
    State(state): State<AppState>,
    identity: PartyIdentity,
) -> Result<Json<RefundHistoryResponse>> {
    identity.require_role(PartyRole::Patient)?;

    let refunds = state
        .purchase_service
        .refund_history(identity.party_id)
        .await?;

    Ok(Json(RefundHistoryResponse {
        refunds: refunds.into_iter().map(RefundRecord::from).collect(),
    }))
}
