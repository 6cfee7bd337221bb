use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity mirror of the external messaging service.
/// Only sender and timestamp facts are kept; message content never
/// enters this store.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "session_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_request_id: Uuid,
    pub sender_id: Uuid,
    pub sent_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::session_requests::Entity",
        from = "Column::SessionRequestId",
        to = "super::session_requests::Column::Id"
    )]
    SessionRequests,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id"
    )]
    Sender,
}

impl Related<super::session_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
