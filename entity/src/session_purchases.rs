use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A paid, time-boxed consultation window.
///
/// `refunded` transitions false -> true exactly once; when true,
/// `refund_amount`, `refund_reason` and `refunded_at` are set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "session_purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_request_id: Uuid,
    pub amount: i64,
    pub duration_minutes: i32,
    pub refunded: bool,
    pub refund_amount: Option<i64>,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<TimeDateTimeWithTimeZone>,
    pub created_at: TimeDateTimeWithTimeZone,
    pub expires_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::session_requests::Entity",
        from = "Column::SessionRequestId",
        to = "super::session_requests::Column::Id"
    )]
    SessionRequests,
    #[sea_orm(has_one = "super::earnings::Entity")]
    Earnings,
}

impl Related<super::session_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionRequests.def()
    }
}

impl Related<super::earnings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Earnings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
