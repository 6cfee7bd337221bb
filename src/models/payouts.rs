use entity::sea_orm_active_enums::PayoutStatus;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Doctor request to reserve a payout from the payout wallet
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayoutRequest {
    /// Minor currency units
    #[validate(range(min = 1))]
    pub amount: i64,

    #[validate(length(min = 1, max = 120))]
    pub bank_name: String,

    #[validate(length(min = 4, max = 40))]
    pub bank_account_number: String,

    #[validate(length(min = 1, max = 120))]
    pub bank_account_holder: String,
}

/// Admin approval carries the external proof-of-transfer reference
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePayoutRequest {
    #[validate(length(min = 1, max = 255))]
    pub transfer_proof: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectPayoutRequest {
    #[validate(length(min = 1, max = 500))]
    pub note: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutView {
    pub id: uuid::Uuid,
    pub amount: i64,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
    pub status: PayoutStatus,
    pub transfer_proof: Option<String>,
    pub admin_note: Option<String>,
    pub requested_at: time::OffsetDateTime,
    pub approved_at: Option<time::OffsetDateTime>,
    pub rejected_at: Option<time::OffsetDateTime>,
    pub cancelled_at: Option<time::OffsetDateTime>,
    pub processed_at: Option<time::OffsetDateTime>,
}

impl From<entity::payout_requests::Model> for PayoutView {
    fn from(request: entity::payout_requests::Model) -> Self {
        Self {
            id: request.id,
            amount: request.amount,
            bank_name: request.bank_name,
            bank_account_number: request.bank_account_number,
            bank_account_holder: request.bank_account_holder,
            status: request.status,
            transfer_proof: request.transfer_proof,
            admin_note: request.admin_note,
            requested_at: request.requested_at,
            approved_at: request.approved_at,
            rejected_at: request.rejected_at,
            cancelled_at: request.cancelled_at,
            processed_at: request.processed_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutListResponse {
    pub requests: Vec<PayoutView>,
}
