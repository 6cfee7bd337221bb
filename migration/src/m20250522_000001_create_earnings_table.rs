use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create earning_status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(EarningStatus::Type)
                    .values([
                        EarningStatus::Pending,
                        EarningStatus::Confirmed,
                        EarningStatus::Withdrawn,
                    ])
                    .to_owned(),
            )
            .await?;

        // Create earnings table
        manager
            .create_table(
                Table::create()
                    .table(Earnings::Table)
                    .if_not_exists()
                    .col(pk_uuid(Earnings::Id))
                    .col(uuid(Earnings::DoctorId).not_null())
                    .col(uuid(Earnings::PurchaseId).not_null())
                    .col(big_integer(Earnings::TotalAmount).not_null())
                    .col(integer(Earnings::CommissionPercentage).not_null())
                    .col(big_integer(Earnings::DoctorAmount).not_null())
                    .col(big_integer(Earnings::PlatformFee).not_null())
                    .col(
                        ColumnDef::new(Earnings::Status)
                            .custom(EarningStatus::Type)
                            .not_null()
                            .default(SimpleExpr::Custom("'pending'::earning_status".to_string())),
                    )
                    .col(
                        timestamp_with_time_zone(Earnings::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone_null(Earnings::ConfirmedAt))
                    .col(timestamp_with_time_zone_null(Earnings::WithdrawnAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_earnings_doctor_id")
                            .from(Earnings::Table, Earnings::DoctorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_earnings_purchase_id")
                            .from(Earnings::Table, Earnings::PurchaseId)
                            .to(SessionPurchases::Table, SessionPurchases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One earning per purchase
        manager
            .create_index(
                Index::create()
                    .name("idx_earnings_purchase_id")
                    .table(Earnings::Table)
                    .col(Earnings::PurchaseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_earnings_doctor_status")
                    .table(Earnings::Table)
                    .col(Earnings::DoctorId)
                    .col(Earnings::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Earnings::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(EarningStatus::Type).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum EarningStatus {
    #[sea_orm(iden = "earning_status")]
    Type,
    Pending,
    Confirmed,
    Withdrawn,
}

#[derive(DeriveIden)]
enum Earnings {
    Table,
    Id,
    DoctorId,
    PurchaseId,
    TotalAmount,
    CommissionPercentage,
    DoctorAmount,
    PlatformFee,
    Status,
    CreatedAt,
    ConfirmedAt,
    WithdrawnAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SessionPurchases {
    Table,
    Id,
}
