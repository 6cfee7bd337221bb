use sea_orm_migration::sea_query::extension::postgres::Type;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create party_role enum
        manager
            .create_type(
                Type::create()
                    .as_enum(PartyRole::Type)
                    .values([PartyRole::Patient, PartyRole::Doctor])
                    .to_owned(),
            )
            .await?;

        // Create session_status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(SessionStatus::Type)
                    .values([
                        SessionStatus::Pending,
                        SessionStatus::Approved,
                        SessionStatus::Active,
                        SessionStatus::Completed,
                        SessionStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        // Create users table (FIRST - other tables reference this)
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string(Users::FullName).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .custom(PartyRole::Type)
                            .not_null(),
                    )
                    .col(big_integer(Users::WalletBalance).default(0).not_null())
                    .col(big_integer(Users::PayoutBalance).default(0).not_null())
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create trigger function for updated_at
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;
                "#,
            )
            .await?;

        // Create trigger on users table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER update_users_updated_at
                BEFORE UPDATE ON users
                FOR EACH ROW
                EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        // Create session_requests table
        manager
            .create_table(
                Table::create()
                    .table(SessionRequests::Table)
                    .if_not_exists()
                    .col(pk_uuid(SessionRequests::Id))
                    .col(uuid(SessionRequests::PatientId).not_null())
                    .col(uuid(SessionRequests::DoctorId).not_null())
                    .col(
                        ColumnDef::new(SessionRequests::Status)
                            .custom(SessionStatus::Type)
                            .not_null()
                            .default(SimpleExpr::Custom("'pending'::session_status".to_string())),
                    )
                    .col(
                        timestamp_with_time_zone(SessionRequests::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(SessionRequests::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_requests_patient_id")
                            .from(SessionRequests::Table, SessionRequests::PatientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_requests_doctor_id")
                            .from(SessionRequests::Table, SessionRequests::DoctorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create trigger on session_requests table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER update_session_requests_updated_at
                BEFORE UPDATE ON session_requests
                FOR EACH ROW
                EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_session_requests_patient_id")
                    .table(SessionRequests::Table)
                    .col(SessionRequests::PatientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_session_requests_doctor_id")
                    .table(SessionRequests::Table)
                    .col(SessionRequests::DoctorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_session_requests_status")
                    .table(SessionRequests::Table)
                    .col(SessionRequests::Status)
                    .to_owned(),
            )
            .await?;

        // Create session_purchases table
        manager
            .create_table(
                Table::create()
                    .table(SessionPurchases::Table)
                    .if_not_exists()
                    .col(pk_uuid(SessionPurchases::Id))
                    .col(uuid(SessionPurchases::SessionRequestId).not_null())
                    .col(big_integer(SessionPurchases::Amount).not_null())
                    .col(integer(SessionPurchases::DurationMinutes).not_null())
                    .col(boolean(SessionPurchases::Refunded).default(false).not_null())
                    .col(big_integer_null(SessionPurchases::RefundAmount))
                    .col(string_null(SessionPurchases::RefundReason))
                    .col(timestamp_with_time_zone_null(SessionPurchases::RefundedAt))
                    .col(
                        timestamp_with_time_zone(SessionPurchases::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone(SessionPurchases::ExpiresAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_purchases_session_request_id")
                            .from(SessionPurchases::Table, SessionPurchases::SessionRequestId)
                            .to(SessionRequests::Table, SessionRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_session_purchases_session_request_id")
                    .table(SessionPurchases::Table)
                    .col(SessionPurchases::SessionRequestId)
                    .to_owned(),
            )
            .await?;

        // Covers the eligibility sweep query (unrefunded + past timeout)
        manager
            .create_index(
                Index::create()
                    .name("idx_session_purchases_refunded_created_at")
                    .table(SessionPurchases::Table)
                    .col(SessionPurchases::Refunded)
                    .col(SessionPurchases::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Create session_messages table (activity mirror of the
        // external messaging service; no content column)
        manager
            .create_table(
                Table::create()
                    .table(SessionMessages::Table)
                    .if_not_exists()
                    .col(pk_uuid(SessionMessages::Id))
                    .col(uuid(SessionMessages::SessionRequestId).not_null())
                    .col(uuid(SessionMessages::SenderId).not_null())
                    .col(timestamp_with_time_zone(SessionMessages::SentAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_messages_session_request_id")
                            .from(SessionMessages::Table, SessionMessages::SessionRequestId)
                            .to(SessionRequests::Table, SessionRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_messages_sender_id")
                            .from(SessionMessages::Table, SessionMessages::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Covers the response-probe query (sender activity after a timestamp)
        manager
            .create_index(
                Index::create()
                    .name("idx_session_messages_request_sender_sent")
                    .table(SessionMessages::Table)
                    .col(SessionMessages::SessionRequestId)
                    .col(SessionMessages::SenderId)
                    .col(SessionMessages::SentAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (due to foreign keys)
        manager
            .drop_table(Table::drop().table(SessionMessages::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SessionPurchases::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SessionRequests::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        // Drop trigger function
        manager
            .get_connection()
            .execute_unprepared("DROP FUNCTION IF EXISTS update_updated_at_column() CASCADE;")
            .await?;

        // Drop enums
        manager
            .drop_type(Type::drop().name(SessionStatus::Type).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PartyRole::Type).to_owned())
            .await?;

        Ok(())
    }
}

// Enum definitions
#[derive(DeriveIden)]
enum PartyRole {
    #[sea_orm(iden = "party_role")]
    Type,
    Patient,
    Doctor,
}

#[derive(DeriveIden)]
enum SessionStatus {
    #[sea_orm(iden = "session_status")]
    Type,
    Pending,
    Approved,
    Active,
    Completed,
    Cancelled,
}

// Table definitions
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FullName,
    Role,
    WalletBalance,
    PayoutBalance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SessionRequests {
    Table,
    Id,
    PatientId,
    DoctorId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SessionPurchases {
    Table,
    Id,
    SessionRequestId,
    Amount,
    DurationMinutes,
    Refunded,
    RefundAmount,
    RefundReason,
    RefundedAt,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum SessionMessages {
    Table,
    Id,
    SessionRequestId,
    SenderId,
    SentAt,
}
