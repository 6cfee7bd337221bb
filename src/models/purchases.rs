use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to open a paid consultation window
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub session_request_id: uuid::Uuid,

    /// Minor currency units
    #[validate(range(min = 1))]
    pub amount: i64,

    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub purchase_id: uuid::Uuid,
    pub session_request_id: uuid::Uuid,
    pub amount: i64,
    pub duration_minutes: i32,
    pub created_at: time::OffsetDateTime,
    pub expires_at: time::OffsetDateTime,
    /// Patient spendable wallet after the debit
    pub wallet_balance: i64,
}

/// Request from the messaging collaborator to mirror doctor/patient
/// activity for the response probe
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMessageRequest {
    pub sender_id: uuid::Uuid,
    pub sent_at: Option<time::OffsetDateTime>,
}
