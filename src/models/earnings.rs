use entity::sea_orm_active_enums::EarningStatus;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningView {
    pub id: uuid::Uuid,
    pub purchase_id: uuid::Uuid,
    pub total_amount: i64,
    pub commission_percentage: i32,
    pub doctor_amount: i64,
    pub platform_fee: i64,
    pub status: EarningStatus,
    pub created_at: time::OffsetDateTime,
    pub confirmed_at: Option<time::OffsetDateTime>,
    pub withdrawn_at: Option<time::OffsetDateTime>,
}

impl From<entity::earnings::Model> for EarningView {
    fn from(earning: entity::earnings::Model) -> Self {
        Self {
            id: earning.id,
            purchase_id: earning.purchase_id,
            total_amount: earning.total_amount,
            commission_percentage: earning.commission_percentage,
            doctor_amount: earning.doctor_amount,
            platform_fee: earning.platform_fee,
            status: earning.status,
            created_at: earning.created_at,
            confirmed_at: earning.confirmed_at,
            withdrawn_at: earning.withdrawn_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummaryResponse {
    pub pending_total: i64,
    pub confirmed_total: i64,
    pub withdrawn_total: i64,
    /// Doctor payout wallet as of the query
    pub payout_balance: i64,
    pub earnings: Vec<EarningView>,
}
