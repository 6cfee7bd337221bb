use sea_orm::sea_query::Alias;
use sea_orm::{entity::*, query::*, DatabaseConnection, JoinType, PaginatorTrait, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    config::RefundPolicyConfig,
    error::{ApiError, Result},
    models::{
        common::refund_reasons,
        refunds::{ReasonStatistic, RefundStatisticsResponse, ResponseRateResponse},
    },
};
use entity::sea_orm_active_enums::SessionStatus;

/// Purchase ledger: opens consultation windows and answers the
/// repository-level queries the sweep, the admins and the parties need.
pub struct PurchaseService {
    db: DatabaseConnection,
    policy: RefundPolicyConfig,
}

impl PurchaseService {
    pub fn new(db: DatabaseConnection, policy: &RefundPolicyConfig) -> Self {
        Self {
            db,
            policy: policy.clone(),
        }
    }

    /// Open a paid consultation window. The wallet debit and the
    /// purchase insert commit together; an insufficient balance is a
    /// declined outcome, not a failure.
    #[instrument(skip(self))]
    pub async fn create_purchase(
        &self,
        patient_id: Uuid,
        session_request_id: Uuid,
        amount: i64,
        duration_minutes: i32,
    ) -> Result<(entity::session_purchases::Model, i64)> {
        if amount <= 0 {
            return Err(ApiError::BadRequest(
                "Purchase amount must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let session = entity::session_requests::Entity::find_by_id(session_request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Session request {}", session_request_id)))?;

        // Do not leak other patients' sessions
        if session.patient_id != patient_id {
            txn.rollback().await?;
            return Err(ApiError::NotFound(format!(
                "Session request {}",
                session_request_id
            )));
        }

        if !matches!(
            session.status,
            SessionStatus::Approved | SessionStatus::Active
        ) {
            txn.rollback().await?;
            return Err(ApiError::BadRequest(
                "Session request is not open for purchase".to_string(),
            ));
        }

        // Lock the patient row so concurrent purchases cannot both pass
        // the balance check
        let patient = entity::users::Entity::find_by_id(session.patient_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Patient {} missing for session {}",
                    session.patient_id,
                    session.id
                ))
            })?;

        if patient.wallet_balance < amount {
            txn.rollback().await?;
            return Err(ApiError::InsufficientBalance(format!(
                "Wallet balance {} is below the purchase amount {}",
                patient.wallet_balance, amount
            )));
        }

        let now = time::OffsetDateTime::now_utc();
        let purchase = entity::session_purchases::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_request_id: Set(session.id),
            amount: Set(amount),
            duration_minutes: Set(duration_minutes),
            refunded: Set(false),
            refund_amount: Set(None),
            refund_reason: Set(None),
            refunded_at: Set(None),
            created_at: Set(now),
            expires_at: Set(now + self.policy.response_timeout()),
        };
        let purchase = purchase.insert(&txn).await?;

        let new_balance = patient.wallet_balance - amount;
        let mut patient_active: entity::users::ActiveModel = patient.into();
        patient_active.wallet_balance = Set(new_balance);
        patient_active.updated_at = Set(now);
        patient_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            purchase_id = %purchase.id,
            session_request_id = %session_request_id,
            amount = amount,
            wallet_balance = new_balance,
            "Opened consultation purchase"
        );

        Ok((purchase, new_balance))
    }

    /// Mirror a message-activity fact from the messaging collaborator.
    #[instrument(skip(self))]
    pub async fn record_message_activity(
        &self,
        session_request_id: Uuid,
        sender_id: Uuid,
        sent_at: Option<time::OffsetDateTime>,
    ) -> Result<entity::session_messages::Model> {
        let session = entity::session_requests::Entity::find_by_id(session_request_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Session request {}", session_request_id)))?;

        if sender_id != session.patient_id && sender_id != session.doctor_id {
            return Err(ApiError::BadRequest(
                "Sender is not a participant of this session".to_string(),
            ));
        }

        let message = entity::session_messages::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_request_id: Set(session_request_id),
            sender_id: Set(sender_id),
            sent_at: Set(sent_at.unwrap_or_else(time::OffsetDateTime::now_utc)),
        };

        Ok(message.insert(&self.db).await?)
    }

    /// Unrefunded purchases past the response timeout whose session is
    /// still approved/active. Shared by the sweep and the admin listing.
    pub async fn find_refund_eligible(
        &self,
        now: time::OffsetDateTime,
    ) -> Result<
        Vec<(
            entity::session_purchases::Model,
            entity::session_requests::Model,
        )>,
    > {
        let cutoff = now - self.policy.response_timeout();

        let rows = entity::session_purchases::Entity::find()
            .find_also_related(entity::session_requests::Entity)
            .filter(entity::session_purchases::Column::Refunded.eq(false))
            .filter(entity::session_purchases::Column::CreatedAt.lt(cutoff))
            .filter(
                entity::session_requests::Column::Status
                    .is_in([SessionStatus::Approved, SessionStatus::Active]),
            )
            .order_by_asc(entity::session_purchases::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(purchase, session)| session.map(|s| (purchase, s)))
            .collect())
    }

    /// Refunded purchases of a patient, most recent first.
    #[instrument(skip(self))]
    pub async fn refund_history(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<entity::session_purchases::Model>> {
        let rows = entity::session_purchases::Entity::find()
            .join(
                JoinType::InnerJoin,
                entity::session_purchases::Relation::SessionRequests.def(),
            )
            .filter(entity::session_requests::Column::PatientId.eq(patient_id))
            .filter(entity::session_purchases::Column::Refunded.eq(true))
            .order_by_desc(entity::session_purchases::Column::RefundedAt)
            .all(&self.db)
            .await?;

        Ok(rows)
    }

    /// Trailing-window count of no-response refunds caused by a doctor.
    pub async fn count_no_response_refunds(
        &self,
        doctor_id: Uuid,
        since: time::OffsetDateTime,
    ) -> Result<u64> {
        let count = entity::session_purchases::Entity::find()
            .join(
                JoinType::InnerJoin,
                entity::session_purchases::Relation::SessionRequests.def(),
            )
            .filter(entity::session_requests::Column::DoctorId.eq(doctor_id))
            .filter(entity::session_purchases::Column::Refunded.eq(true))
            .filter(
                entity::session_purchases::Column::RefundReason
                    .eq(refund_reasons::DOCTOR_NO_RESPONSE),
            )
            .filter(entity::session_purchases::Column::RefundedAt.gte(since))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    /// Per-doctor response-rate statistics over a trailing window.
    #[instrument(skip(self))]
    pub async fn response_rate_statistics(
        &self,
        doctor_id: Uuid,
        window_days: i64,
    ) -> Result<ResponseRateResponse> {
        let since = time::OffsetDateTime::now_utc() - time::Duration::days(window_days);

        let total_purchases = entity::session_purchases::Entity::find()
            .join(
                JoinType::InnerJoin,
                entity::session_purchases::Relation::SessionRequests.def(),
            )
            .filter(entity::session_requests::Column::DoctorId.eq(doctor_id))
            .filter(entity::session_purchases::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await?;

        let no_response_refunds = self.count_no_response_refunds(doctor_id, since).await?;

        let response_rate_percent = if total_purchases == 0 {
            100.0
        } else {
            (total_purchases.saturating_sub(no_response_refunds)) as f64 * 100.0
                / total_purchases as f64
        };

        Ok(ResponseRateResponse {
            window_days,
            total_purchases,
            no_response_refunds,
            response_rate_percent,
        })
    }

    /// Platform-wide refund totals grouped by reason.
    pub async fn refund_statistics(&self) -> Result<RefundStatisticsResponse> {
        let rows: Vec<(Option<String>, i64, Option<i64>)> =
            entity::session_purchases::Entity::find()
                .select_only()
                .column(entity::session_purchases::Column::RefundReason)
                .column_as(entity::session_purchases::Column::Id.count(), "count")
                .column_as(
                    entity::session_purchases::Column::RefundAmount
                        .sum()
                        .cast_as(Alias::new("BIGINT")),
                    "total_refunded",
                )
                .filter(entity::session_purchases::Column::Refunded.eq(true))
                .group_by(entity::session_purchases::Column::RefundReason)
                .into_tuple()
                .all(&self.db)
                .await?;

        let by_reason: Vec<ReasonStatistic> = rows
            .into_iter()
            .map(|(reason, count, total)| ReasonStatistic {
                reason: reason.unwrap_or_else(|| refund_reasons::DEFAULT.to_string()),
                count,
                total_refunded: total.unwrap_or(0),
            })
            .collect();

        Ok(RefundStatisticsResponse {
            total_refunds: by_reason.iter().map(|r| r.count).sum(),
            total_refunded: by_reason.iter().map(|r| r.total_refunded).sum(),
            by_reason,
        })
    }
}
