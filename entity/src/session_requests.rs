use super::sea_orm_active_enums::SessionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "session_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub status: SessionStatus,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PatientId",
        to = "super::users::Column::Id"
    )]
    Patient,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::DoctorId",
        to = "super::users::Column::Id"
    )]
    Doctor,
    #[sea_orm(has_many = "super::session_purchases::Entity")]
    SessionPurchases,
    #[sea_orm(has_many = "super::session_messages::Entity")]
    SessionMessages,
}

impl Related<super::session_purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionPurchases.def()
    }
}

impl Related<super::session_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionMessages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
