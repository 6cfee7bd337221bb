use super::sea_orm_active_enums::EarningStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Commission record created from an honored (non-refunded) purchase.
///
/// `commission_percentage` is snapshotted at creation and never
/// re-read from policy. Invariant: doctor_amount + platform_fee ==
/// total_amount.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "earnings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub doctor_id: Uuid,
    #[sea_orm(unique)]
    pub purchase_id: Uuid,
    pub total_amount: i64,
    pub commission_percentage: i32,
    pub doctor_amount: i64,
    pub platform_fee: i64,
    pub status: EarningStatus,
    pub created_at: TimeDateTimeWithTimeZone,
    pub confirmed_at: Option<TimeDateTimeWithTimeZone>,
    pub withdrawn_at: Option<TimeDateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::DoctorId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::session_purchases::Entity",
        from = "Column::PurchaseId",
        to = "super::session_purchases::Column::Id"
    )]
    SessionPurchases,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::session_purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionPurchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
