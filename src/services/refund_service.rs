use std::sync::Arc;

use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::RefundPolicyConfig,
    error::{ApiError, Result},
    models::common::{refund_reasons, NotificationKind, WarningLevel},
    models::refunds::DoctorWarningsResponse,
    services::{
        notifier::{Notification, Notifier},
        purchase_service::PurchaseService,
    },
};
use entity::sea_orm_active_enums::SessionStatus;

/// Window over which no-response refunds are counted for warning banding
const WARNING_WINDOW_DAYS: i64 = 30;

/// Result of a pass through the refund funnel
#[derive(Debug, Clone, Copy)]
pub struct RefundOutcome {
    /// false means the purchase was already refunded and nothing was done
    pub applied: bool,
    pub amount: i64,
}

/// The single funnel every refund trigger goes through: the timeout
/// sweep, admin force-refunds, patient self-service requests, and any
/// future trigger. The `refunded` flag is checked and set under the
/// same row lock, so two concurrent callers can never both credit the
/// wallet.
pub struct RefundService {
    db: DatabaseConnection,
    policy: RefundPolicyConfig,
    purchases: Arc<PurchaseService>,
    notifier: Arc<dyn Notifier>,
}

impl RefundService {
    pub fn new(
        db: DatabaseConnection,
        policy: &RefundPolicyConfig,
        purchases: Arc<PurchaseService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            policy: policy.clone(),
            purchases,
            notifier,
        }
    }

    /// Minor-unit refund amount for a purchase amount and a percentage.
    /// Floors toward zero, so the credit never exceeds the charge.
    pub fn compute_refund_amount(amount: i64, percentage: u32) -> i64 {
        amount * i64::from(percentage) / 100
    }

    /// Execute a refund for a purchase.
    ///
    /// Steps 1-4 of the funnel run in one transaction: re-read the
    /// purchase under an exclusive row lock, bail out if already
    /// refunded, credit the patient wallet and flip the flag together.
    /// Side effects (slot release, notifications) run after commit and
    /// never revert the financial mutation.
    #[instrument(skip(self))]
    pub async fn execute_refund(&self, purchase_id: Uuid, reason: &str) -> Result<RefundOutcome> {
        let txn = self.db.begin().await?;

        let purchase = entity::session_purchases::Entity::find_by_id(purchase_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Purchase {}", purchase_id)))?;

        if purchase.refunded {
            txn.rollback().await?;
            info!(purchase_id = %purchase_id, "Purchase already refunded, skipping");
            return Ok(RefundOutcome {
                applied: false,
                amount: purchase.refund_amount.unwrap_or(0),
            });
        }

        let percentage = self.policy.refund_percentage(reason);
        let refund_amount = Self::compute_refund_amount(purchase.amount, percentage);

        let session = entity::session_requests::Entity::find_by_id(purchase.session_request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Session request {} missing for purchase {}",
                    purchase.session_request_id,
                    purchase_id
                ))
            })?;

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

        let now = time::OffsetDateTime::now_utc();

        let mut patient_active: entity::users::ActiveModel = patient.clone().into();
        patient_active.wallet_balance = Set(patient.wallet_balance + refund_amount);
        patient_active.updated_at = Set(now);
        patient_active.update(&txn).await?;

        let mut purchase_active: entity::session_purchases::ActiveModel = purchase.into();
        purchase_active.refunded = Set(true);
        purchase_active.refund_amount = Set(Some(refund_amount));
        purchase_active.refund_reason = Set(Some(reason.to_string()));
        purchase_active.refunded_at = Set(Some(now));
        purchase_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            purchase_id = %purchase_id,
            reason = reason,
            percentage = percentage,
            refund_amount = refund_amount,
            "Refund applied"
        );

        // Fire-and-forget side effects; failures here are logged and
        // must not surface to the caller.
        self.after_refund(&session, refund_amount, reason).await;

        Ok(RefundOutcome {
            applied: true,
            amount: refund_amount,
        })
    }

    /// Patient self-service entry into the funnel. Verifies the
    /// purchase belongs to the caller before executing; the executor
    /// itself re-checks the refunded flag under lock.
    #[instrument(skip(self))]
    pub async fn request_refund(
        &self,
        patient_id: Uuid,
        purchase_id: Uuid,
        reason: Option<String>,
    ) -> Result<RefundOutcome> {
        let purchase = entity::session_purchases::Entity::find_by_id(purchase_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Purchase {}", purchase_id)))?;

        let session = entity::session_requests::Entity::find_by_id(purchase.session_request_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Purchase {}", purchase_id)))?;

        // Do not leak other patients' purchases
        if session.patient_id != patient_id {
            return Err(ApiError::NotFound(format!("Purchase {}", purchase_id)));
        }

        let reason = reason.unwrap_or_else(|| refund_reasons::PATIENT_REQUEST.to_string());
        self.execute_refund(purchase_id, &reason).await
    }

    /// Post-commit side effects: release the session slot and notify
    /// both parties.
    async fn after_refund(
        &self,
        session: &entity::session_requests::Model,
        refund_amount: i64,
        reason: &str,
    ) {
        self.release_session_slot(session).await;

        if self.policy.notify_patients {
            let notification = Notification {
                kind: NotificationKind::RefundProcessed,
                amount: refund_amount,
                reason: Some(reason.to_string()),
                timestamp: time::OffsetDateTime::now_utc(),
                message: format!(
                    "A refund of {} has been credited to your wallet ({})",
                    refund_amount, reason
                ),
            };
            self.notifier.notify(session.patient_id, notification).await;
        }

        if self.policy.notify_doctors && reason == refund_reasons::DOCTOR_NO_RESPONSE {
            if let Err(e) = self.warn_doctor(session.doctor_id).await {
                warn!(
                    doctor_id = %session.doctor_id,
                    error = %e,
                    "Failed to deliver doctor warning"
                );
            }
        }
    }

    /// Free the reserved session capacity so the doctor's schedule no
    /// longer holds a slot for a refunded consultation.
    async fn release_session_slot(&self, session: &entity::session_requests::Model) {
        let result = entity::session_requests::Entity::update_many()
            .set(entity::session_requests::ActiveModel {
                status: Set(SessionStatus::Cancelled),
                ..Default::default()
            })
            .filter(entity::session_requests::Column::Id.eq(session.id))
            .filter(
                entity::session_requests::Column::Status
                    .is_in([SessionStatus::Approved, SessionStatus::Active]),
            )
            .exec(&self.db)
            .await;

        if let Err(e) = result {
            error!(
                session_request_id = %session.id,
                error = %e,
                "Failed to release session slot after refund"
            );
        }
    }

    /// Send the doctor a severity-banded warning based on the trailing
    /// 30-day count of no-response refunds.
    async fn warn_doctor(&self, doctor_id: Uuid) -> Result<()> {
        let since = time::OffsetDateTime::now_utc() - time::Duration::days(WARNING_WINDOW_DAYS);
        let count = self
            .purchases
            .count_no_response_refunds(doctor_id, since)
            .await?;

        let Some(level) = WarningLevel::from_count(count, &self.policy.warning_thresholds) else {
            return Ok(());
        };

        let notification = Notification {
            kind: NotificationKind::DoctorWarning,
            amount: 0,
            reason: Some(refund_reasons::DOCTOR_NO_RESPONSE.to_string()),
            timestamp: time::OffsetDateTime::now_utc(),
            message: level.message().to_string(),
        };
        self.notifier.notify(doctor_id, notification).await;

        info!(
            doctor_id = %doctor_id,
            no_response_refunds = count,
            level = ?level,
            "Doctor warning sent"
        );

        Ok(())
    }

    /// Warning status for the doctor-facing endpoint.
    #[instrument(skip(self))]
    pub async fn doctor_warnings(&self, doctor_id: Uuid) -> Result<DoctorWarningsResponse> {
        let since = time::OffsetDateTime::now_utc() - time::Duration::days(WARNING_WINDOW_DAYS);
        let count = self
            .purchases
            .count_no_response_refunds(doctor_id, since)
            .await?;

        let level = WarningLevel::from_count(count, &self.policy.warning_thresholds);

        Ok(DoctorWarningsResponse {
            no_response_refunds: count,
            level,
            message: level.map(|l| l.message().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_amount_applies_percentage() {
        assert_eq!(RefundService::compute_refund_amount(100_000, 100), 100_000);
        assert_eq!(RefundService::compute_refund_amount(100_000, 80), 80_000);
        assert_eq!(RefundService::compute_refund_amount(100_000, 50), 50_000);
        assert_eq!(RefundService::compute_refund_amount(100_000, 0), 0);
    }

    #[test]
    fn refund_amount_floors_and_never_exceeds_charge() {
        // 99 * 80 / 100 = 79.2 -> 79
        assert_eq!(RefundService::compute_refund_amount(99, 80), 79);

        for amount in [1_i64, 33, 99, 101, 100_000] {
            for percentage in 0..=100_u32 {
                let refund = RefundService::compute_refund_amount(amount, percentage);
                assert!(refund <= amount);
                assert!(refund >= 0);
            }
        }
    }
}
