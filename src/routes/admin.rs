//! Administrative surface. The gateway restricts these routes to
//! operators; no party identity is attached.

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
    models::earnings::EarningView,
    models::payouts::{ApprovePayoutRequest, PayoutView, RejectPayoutRequest},
    models::refunds::{
        EligiblePurchase, EligiblePurchasesResponse, ForceRefundRequest, RefundOutcomeResponse,
        RefundStatisticsResponse,
    },
};

/// POST /api/v1/admin/purchases/{purchase_id}/refund
#[instrument(skip(state, request))]
pub async fn force_refund(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
    Json(request): Json<ForceRefundRequest>,
) -> Result<Json<RefundOutcomeResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let outcome = state
        .refund_service
        .execute_refund(purchase_id, &request.reason)
        .await?;

    Ok(Json(RefundOutcomeResponse {
        applied: outcome.applied,
        refund_amount: outcome.amount,
    }))
}

/// GET /api/v1/admin/refunds/eligible
#[instrument(skip(state))]
pub async fn list_eligible_purchases(
    State(state): State<AppState>,
) -> Result<Json<EligiblePurchasesResponse>> {
    let candidates = state
        .purchase_service
        .find_refund_eligible(time::OffsetDateTime::now_utc())
        .await?;

    let purchases = candidates
        .into_iter()
        .map(|(purchase, session)| EligiblePurchase {
            purchase_id: purchase.id,
            session_request_id: session.id,
            patient_id: session.patient_id,
            doctor_id: session.doctor_id,
            amount: purchase.amount,
            created_at: purchase.created_at,
            expires_at: purchase.expires_at,
        })
        .collect();

    Ok(Json(EligiblePurchasesResponse { purchases }))
}

/// GET /api/v1/admin/refunds/statistics
#[instrument(skip(state))]
pub async fn refund_statistics(
    State(state): State<AppState>,
) -> Result<Json<RefundStatisticsResponse>> {
    let statistics = state.purchase_service.refund_statistics().await?;

    Ok(Json(statistics))
}

/// POST /api/v1/admin/earnings/{earning_id}/confirm
#[instrument(skip(state))]
pub async fn confirm_earning(
    State(state): State<AppState>,
    Path(earning_id): Path<Uuid>,
) -> Result<Json<EarningView>> {
    let earning = state.earning_service.confirm_earning(earning_id).await?;

    Ok(Json(EarningView::from(earning)))
}

/// POST /api/v1/admin/payouts/{payout_request_id}/approve
#[instrument(skip(state, request))]
pub async fn approve_payout(
    State(state): State<AppState>,
    Path(payout_request_id): Path<Uuid>,
    Json(request): Json<ApprovePayoutRequest>,
) -> Result<Json<PayoutView>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let payout = state
        .payout_service
        .approve(payout_request_id, request.transfer_proof)
        .await?;

    Ok(Json(PayoutView::from(payout)))
}

/// POST /api/v1/admin/payouts/{payout_request_id}/reject
#[instrument(skip(state, request))]
pub async fn reject_payout(
    State(state): State<AppState>,
    Path(payout_request_id): Path<Uuid>,
    Json(request): Json<RejectPayoutRequest>,
) -> Result<Json<PayoutView>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let payout = state
        .payout_service
        .reject(payout_request_id, request.note)
        .await?;

    Ok(Json(PayoutView::from(payout)))
}

/// POST /api/v1/admin/payouts/{payout_request_id}/complete
#[instrument(skip(state))]
pub async fn complete_payout(
    State(state): State<AppState>,
    Path(payout_request_id): Path<Uuid>,
) -> Result<Json<PayoutView>> {
    let payout = state.payout_service.complete(payout_request_id).await?;

    Ok(Json(PayoutView::from(payout)))
}
