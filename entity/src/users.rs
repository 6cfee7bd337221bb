use super::sea_orm_active_enums::PartyRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A party on the platform. Patients spend from `wallet_balance`;
/// doctors accrue confirmed earnings into `payout_balance`.
/// Both balances are minor currency units.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub role: PartyRole,
    pub wallet_balance: i64,
    pub payout_balance: i64,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::earnings::Entity")]
    Earnings,
    #[sea_orm(has_many = "super::payout_requests::Entity")]
    PayoutRequests,
}

impl Related<super::earnings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Earnings.def()
    }
}

impl Related<super::payout_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayoutRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
