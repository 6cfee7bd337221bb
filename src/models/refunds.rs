use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::WarningLevel;

/// Admin force-refund request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForceRefundRequest {
    #[validate(length(min = 1, max = 64))]
    pub reason: String,
}

/// Patient self-service refund request. Reason defaults to
/// "patient-request" when omitted.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestRefundBody {
    #[validate(length(min = 1, max = 64))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundOutcomeResponse {
    /// false means the purchase was already refunded (no-op)
    pub applied: bool,
    pub refund_amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRecord {
    pub purchase_id: uuid::Uuid,
    pub session_request_id: uuid::Uuid,
    pub amount: i64,
    pub refund_amount: i64,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<time::OffsetDateTime>,
}

impl From<entity::session_purchases::Model> for RefundRecord {
    fn from(purchase: entity::session_purchases::Model) -> Self {
        Self {
            purchase_id: purchase.id,
            session_request_id: purchase.session_request_id,
            amount: purchase.amount,
            refund_amount: purchase.refund_amount.unwrap_or(0),
            refund_reason: purchase.refund_reason,
            refunded_at: purchase.refunded_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundHistoryResponse {
    pub refunds: Vec<RefundRecord>,
}

/// An unrefunded purchase past the response timeout, as listed for admins
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligiblePurchase {
    pub purchase_id: uuid::Uuid,
    pub session_request_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub doctor_id: uuid::Uuid,
    pub amount: i64,
    pub created_at: time::OffsetDateTime,
    pub expires_at: time::OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligiblePurchasesResponse {
    pub purchases: Vec<EligiblePurchase>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonStatistic {
    pub reason: String,
    pub count: i64,
    pub total_refunded: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundStatisticsResponse {
    pub total_refunds: i64,
    pub total_refunded: i64,
    pub by_reason: Vec<ReasonStatistic>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorWarningsResponse {
    /// Trailing-30-day count of no-response refunds caused by this doctor
    pub no_response_refunds: u64,
    pub level: Option<WarningLevel>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRateResponse {
    pub window_days: i64,
    pub total_purchases: u64,
    pub no_response_refunds: u64,
    /// Share of purchases in the window that were not refunded for
    /// doctor inactivity, 0-100
    pub response_rate_percent: f64,
}
