use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    config::EarningsConfig,
    error::{ApiError, Result},
    models::earnings::{EarningView, EarningsSummaryResponse},
};
use entity::sea_orm_active_enums::{EarningStatus, SessionStatus};

/// Commission ledger: converts honored purchases into earnings and
/// moves confirmed amounts into the doctor's payout wallet.
pub struct EarningService {
    db: DatabaseConnection,
    commission_percentage: i32,
}

impl EarningService {
    pub fn new(db: DatabaseConnection, config: &EarningsConfig) -> Self {
        Self {
            db,
            commission_percentage: config.commission_percentage,
        }
    }

    /// Split a purchase amount into (doctor_amount, platform_fee).
    /// The fee absorbs the integer-division remainder, so the two parts
    /// always sum to the total.
    pub fn split_amount(total: i64, percentage: i32) -> (i64, i64) {
        let doctor_amount = total * i64::from(percentage) / 100;
        (doctor_amount, total - doctor_amount)
    }

    /// Create an earning from a purchase that reached its completed,
    /// non-refunded outcome. The purchase row is locked so the check
    /// against `refunded` and the earning insert cannot race a
    /// concurrent refund; once the session leaves the approved/active
    /// states the sweep can never pick the purchase up again.
    #[instrument(skip(self))]
    pub async fn create_earning_from_purchase(
        &self,
        purchase_id: Uuid,
    ) -> Result<entity::earnings::Model> {
        let txn = self.db.begin().await?;

        let purchase = entity::session_purchases::Entity::find_by_id(purchase_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Purchase {}", purchase_id)))?;

        if purchase.refunded {
            txn.rollback().await?;
            return Err(ApiError::Conflict(
                "Purchase was refunded; no earning can be created".to_string(),
            ));
        }

        let existing = entity::earnings::Entity::find()
            .filter(entity::earnings::Column::PurchaseId.eq(purchase.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Earning already exists for purchase {}",
                purchase_id
            )));
        }

        let session = entity::session_requests::Entity::find_by_id(purchase.session_request_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Session request {} missing for purchase {}",
                    purchase.session_request_id,
                    purchase_id
                ))
            })?;

        match session.status {
            SessionStatus::Approved | SessionStatus::Active => {
                // Close the session; the purchase outcome is final
                let mut session_active: entity::session_requests::ActiveModel =
                    session.clone().into();
                session_active.status = Set(SessionStatus::Completed);
                session_active.update(&txn).await?;
            }
            SessionStatus::Completed => {}
            SessionStatus::Pending | SessionStatus::Cancelled => {
                txn.rollback().await?;
                return Err(ApiError::Conflict(
                    "Session is not in a completable state".to_string(),
                ));
            }
        }

        // Snapshot the commission rate; later policy changes never
        // touch existing earnings
        let percentage = self.commission_percentage;
        let (doctor_amount, platform_fee) = Self::split_amount(purchase.amount, percentage);

        let earning = entity::earnings::ActiveModel {
            id: Set(Uuid::new_v4()),
            doctor_id: Set(session.doctor_id),
            purchase_id: Set(purchase.id),
            total_amount: Set(purchase.amount),
            commission_percentage: Set(percentage),
            doctor_amount: Set(doctor_amount),
            platform_fee: Set(platform_fee),
            status: Set(EarningStatus::Pending),
            created_at: Set(time::OffsetDateTime::now_utc()),
            confirmed_at: Set(None),
            withdrawn_at: Set(None),
        };
        let earning = earning.insert(&txn).await?;

        txn.commit().await?;

        info!(
            earning_id = %earning.id,
            purchase_id = %purchase_id,
            doctor_id = %earning.doctor_id,
            total_amount = earning.total_amount,
            doctor_amount = earning.doctor_amount,
            platform_fee = earning.platform_fee,
            "Earning created from honored purchase"
        );

        Ok(earning)
    }

    /// Confirm a pending earning and credit the doctor's payout wallet.
    /// The earning row is locked so a double confirm is impossible; the
    /// second caller sees CONFIRMED and gets a Conflict.
    #[instrument(skip(self))]
    pub async fn confirm_earning(&self, earning_id: Uuid) -> Result<entity::earnings::Model> {
        let txn = self.db.begin().await?;

        let earning = entity::earnings::Entity::find_by_id(earning_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Earning {}", earning_id)))?;

        if earning.status != EarningStatus::Pending {
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Earning {} is not pending",
                earning_id
            )));
        }

        let doctor = entity::users::Entity::find_by_id(earning.doctor_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Doctor {} missing for earning {}",
                    earning.doctor_id,
                    earning_id
                ))
            })?;

        let now = time::OffsetDateTime::now_utc();

        let mut doctor_active: entity::users::ActiveModel = doctor.clone().into();
        doctor_active.payout_balance = Set(doctor.payout_balance + earning.doctor_amount);
        doctor_active.updated_at = Set(now);
        doctor_active.update(&txn).await?;

        let mut earning_active: entity::earnings::ActiveModel = earning.into();
        earning_active.status = Set(EarningStatus::Confirmed);
        earning_active.confirmed_at = Set(Some(now));
        let earning = earning_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            earning_id = %earning_id,
            doctor_id = %earning.doctor_id,
            doctor_amount = earning.doctor_amount,
            "Earning confirmed, payout wallet credited"
        );

        Ok(earning)
    }

    /// Doctor's earnings with per-status totals and the current payout
    /// wallet.
    #[instrument(skip(self))]
    pub async fn earnings_summary(&self, doctor_id: Uuid) -> Result<EarningsSummaryResponse> {
        let doctor = entity::users::Entity::find_by_id(doctor_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Doctor {}", doctor_id)))?;

        let earnings = entity::earnings::Entity::find()
            .filter(entity::earnings::Column::DoctorId.eq(doctor_id))
            .order_by_desc(entity::earnings::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut pending_total = 0;
        let mut confirmed_total = 0;
        let mut withdrawn_total = 0;
        for earning in &earnings {
            match earning.status {
                EarningStatus::Pending => pending_total += earning.doctor_amount,
                EarningStatus::Confirmed => confirmed_total += earning.doctor_amount,
                EarningStatus::Withdrawn => withdrawn_total += earning.doctor_amount,
            }
        }

        Ok(EarningsSummaryResponse {
            pending_total,
            confirmed_total,
            withdrawn_total,
            payout_balance: doctor.payout_balance,
            earnings: earnings.into_iter().map(EarningView::from).collect(),
        })
    }
}
