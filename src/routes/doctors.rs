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
    models::earnings::EarningsSummaryResponse,
    models::payouts::{CreatePayoutRequest, PayoutListResponse, PayoutView},
    models::refunds::{DoctorWarningsResponse, ResponseRateResponse},
};
use entity::sea_orm_active_enums::PartyRole;

const RESPONSE_RATE_WINDOW_DAYS: i64 = 30;

/// GET /api/v1/warnings
#[instrument(skip(state, identity))]
pub async fn refund_warnings(
    State(state): State<AppState>,
    identity: PartyIdentity,
) -> Result<Json<DoctorWarningsResponse>> {
    identity.require_role(PartyRole::Doctor)?;

    let warnings = state
        .refund_service
        .doctor_warnings(identity.party_id)
        .await?;

    Ok(Json(warnings))
}

/// GET /api/v1/statistics/response-rate
#[instrument(skip(state, identity))]
pub async fn response_rate(
    State(state): State<AppState>,
    identity: PartyIdentity,
) -> Result<Json<ResponseRateResponse>> {
    identity.require_role(PartyRole::Doctor)?;

    let statistics = state
        .purchase_service
        .response_rate_statistics(identity.party_id, RESPONSE_RATE_WINDOW_DAYS)
        .await?;

    Ok(Json(statistics))
}

/// GET /api/v1/earnings
#[instrument(skip(state, identity))]
pub async fn earnings_summary(
    State(state): State<AppState>,
    identity: PartyIdentity,
) -> Result<Json<EarningsSummaryResponse>> {
    identity.require_role(PartyRole::Doctor)?;

    let summary = state
        .earning_service
        .earnings_summary(identity.party_id)
        .await?;

    Ok(Json(summary))
}

/// POST /api/v1/payouts
#[instrument(skip(state, request))]
pub async fn create_payout(
    State(state): State<AppState>,
    identity: PartyIdentity,
    Json(request): Json<CreatePayoutRequest>,
) -> Result<Json<PayoutView>> {
    identity.require_role(PartyRole::Doctor)?;

    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let payout = state
        .payout_service
        .create_payout_request(identity.party_id, request)
        .await?;

    Ok(Json(PayoutView::from(payout)))
}

/// POST /api/v1/payouts/{payout_request_id}/cancel
#[instrument(skip(state))]
pub async fn cancel_payout(
    State(state): State<AppState>,
    identity: PartyIdentity,
    Path(payout_request_id): Path<Uuid>,
) -> Result<Json<PayoutView>> {
    identity.require_role(PartyRole::Doctor)?;

    let payout = state
        .payout_service
        .cancel(payout_request_id, identity.party_id)
        .await?;

    Ok(Json(PayoutView::from(payout)))
}

/// GET /api/v1/payouts
#[instrument(skip(state, identity))]
pub async fn list_payouts(
    State(state): State<AppState>,
    identity: PartyIdentity,
) -> Result<Json<PayoutListResponse>> {
    identity.require_role(PartyRole::Doctor)?;

    let requests = state
        .payout_service
        .list_for_doctor(identity.party_id)
        .await?;

    Ok(Json(PayoutListResponse {
        requests: requests.into_iter().map(PayoutView::from).collect(),
    }))
}
