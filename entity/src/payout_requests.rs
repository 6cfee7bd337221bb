use super::sea_orm_active_enums::PayoutStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reservation against a doctor's payout wallet. The wallet is debited
/// the moment the request is filed; rejection or cancellation restores
/// the reserved amount. At most one pending request per doctor.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payout_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub amount: i64,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
    pub status: PayoutStatus,
    pub transfer_proof: Option<String>,
    pub admin_note: Option<String>,
    pub requested_at: TimeDateTimeWithTimeZone,
    pub approved_at: Option<TimeDateTimeWithTimeZone>,
    pub rejected_at: Option<TimeDateTimeWithTimeZone>,
    pub cancelled_at: Option<TimeDateTimeWithTimeZone>,
    pub processed_at: Option<TimeDateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::DoctorId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
