use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create payout_status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(PayoutStatus::Type)
                    .values([
                        PayoutStatus::Pending,
                        PayoutStatus::Approved,
                        PayoutStatus::Rejected,
                        PayoutStatus::Cancelled,
                        PayoutStatus::Completed,
                    ])
                    .to_owned(),
            )
            .await?;

        // Create payout_requests table
        manager
            .create_table(
                Table::create()
                    .table(PayoutRequests::Table)
                    .if_not_exists()
                    .col(pk_uuid(PayoutRequests::Id))
                    .col(uuid(PayoutRequests::DoctorId).not_null())
                    .col(big_integer(PayoutRequests::Amount).not_null())
                    .col(string(PayoutRequests::BankName).not_null())
                    .col(string(PayoutRequests::BankAccountNumber).not_null())
                    .col(string(PayoutRequests::BankAccountHolder).not_null())
                    .col(
                        ColumnDef::new(PayoutRequests::Status)
                            .custom(PayoutStatus::Type)
                            .not_null()
                            .default(SimpleExpr::Custom("'pending'::payout_status".to_string())),
                    )
                    .col(string_null(PayoutRequests::TransferProof))
                    .col(string_null(PayoutRequests::AdminNote))
                    .col(
                        timestamp_with_time_zone(PayoutRequests::RequestedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone_null(PayoutRequests::ApprovedAt))
                    .col(timestamp_with_time_zone_null(PayoutRequests::RejectedAt))
                    .col(timestamp_with_time_zone_null(PayoutRequests::CancelledAt))
                    .col(timestamp_with_time_zone_null(PayoutRequests::ProcessedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payout_requests_doctor_id")
                            .from(PayoutRequests::Table, PayoutRequests::DoctorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payout_requests_doctor_status")
                    .table(PayoutRequests::Table)
                    .col(PayoutRequests::DoctorId)
                    .col(PayoutRequests::Status)
                    .to_owned(),
            )
            .await?;

        // Structural backstop for the at-most-one-pending-per-doctor rule.
        // The service also serializes per doctor via the user row lock;
        // sea_query has no partial index builder, hence raw SQL.
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE UNIQUE INDEX idx_payout_requests_one_pending
                ON payout_requests (doctor_id)
                WHERE status = 'pending';
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PayoutRequests::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PayoutStatus::Type).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum PayoutStatus {
    #[sea_orm(iden = "payout_status")]
    Type,
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

#[derive(DeriveIden)]
enum PayoutRequests {
    Table,
    Id,
    DoctorId,
    Amount,
    BankName,
    BankAccountNumber,
    BankAccountHolder,
    Status,
    TransferProof,
    AdminNote,
    RequestedAt,
    ApprovedAt,
    RejectedAt,
    CancelledAt,
    ProcessedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
