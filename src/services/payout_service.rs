use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::{ApiError, Result},
    models::payouts::CreatePayoutRequest,
};
use entity::sea_orm_active_enums::{EarningStatus, PartyRole, PayoutStatus};

/// Payout reservation ledger. Funds leave the payout wallet the moment
/// a request is filed and return only on rejection or cancellation;
/// approval changes no balance because the reservation already did.
pub struct PayoutService {
    db: DatabaseConnection,
}

impl PayoutService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// File a payout request, reserving the amount immediately.
    ///
    /// The doctor's user row is locked first, which serializes all
    /// payout mutations per provider: a second concurrent request
    /// cannot read a stale wallet balance or slip past the
    /// single-pending check.
    #[instrument(skip(self, request))]
    pub async fn create_payout_request(
        &self,
        doctor_id: Uuid,
        request: CreatePayoutRequest,
    ) -> Result<entity::payout_requests::Model> {
        let txn = self.db.begin().await?;

        let doctor = entity::users::Entity::find_by_id(doctor_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Doctor {}", doctor_id)))?;

        if doctor.role != PartyRole::Doctor {
            txn.rollback().await?;
            return Err(ApiError::BadRequest(
                "Only doctors can request payouts".to_string(),
            ));
        }

        let pending = entity::payout_requests::Entity::find()
            .filter(entity::payout_requests::Column::DoctorId.eq(doctor_id))
            .filter(entity::payout_requests::Column::Status.eq(PayoutStatus::Pending))
            .count(&txn)
            .await?;
        if pending > 0 {
            txn.rollback().await?;
            return Err(ApiError::Conflict(
                "A pending payout request already exists".to_string(),
            ));
        }

        if doctor.payout_balance < request.amount {
            txn.rollback().await?;
            return Err(ApiError::InsufficientBalance(format!(
                "Payout balance {} is below the requested amount {}",
                doctor.payout_balance, request.amount
            )));
        }

        let now = time::OffsetDateTime::now_utc();

        // Reservation: debit now, restore only on a non-approval outcome
        let mut doctor_active: entity::users::ActiveModel = doctor.clone().into();
        doctor_active.payout_balance = Set(doctor.payout_balance - request.amount);
        doctor_active.updated_at = Set(now);
        doctor_active.update(&txn).await?;

        let payout = entity::payout_requests::ActiveModel {
            id: Set(Uuid::new_v4()),
            doctor_id: Set(doctor_id),
            amount: Set(request.amount),
            bank_name: Set(request.bank_name),
            bank_account_number: Set(request.bank_account_number),
            bank_account_holder: Set(request.bank_account_holder),
            status: Set(PayoutStatus::Pending),
            transfer_proof: Set(None),
            admin_note: Set(None),
            requested_at: Set(now),
            approved_at: Set(None),
            rejected_at: Set(None),
            cancelled_at: Set(None),
            processed_at: Set(None),
        };
        let payout = payout.insert(&txn).await?;

        txn.commit().await?;

        info!(
            payout_request_id = %payout.id,
            doctor_id = %doctor_id,
            amount = payout.amount,
            "Payout request filed, amount reserved"
        );

        Ok(payout)
    }

    /// PENDING -> APPROVED. No wallet change; the funds were already
    /// reserved at request time.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        payout_request_id: Uuid,
        transfer_proof: String,
    ) -> Result<entity::payout_requests::Model> {
        let txn = self.db.begin().await?;

        let payout = self.find_and_lock(payout_request_id, &txn).await?;
        if payout.status != PayoutStatus::Pending {
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Payout request {} is not pending",
                payout_request_id
            )));
        }

        let mut payout_active: entity::payout_requests::ActiveModel = payout.into();
        payout_active.status = Set(PayoutStatus::Approved);
        payout_active.transfer_proof = Set(Some(transfer_proof));
        payout_active.approved_at = Set(Some(time::OffsetDateTime::now_utc()));
        let payout = payout_active.update(&txn).await?;

        txn.commit().await?;

        info!(payout_request_id = %payout_request_id, "Payout request approved");

        Ok(payout)
    }

    /// PENDING -> REJECTED; the reserved amount returns to the wallet
    /// in the same transaction.
    #[instrument(skip(self))]
    pub async fn reject(
        &self,
        payout_request_id: Uuid,
        note: String,
    ) -> Result<entity::payout_requests::Model> {
        self.release_reservation(payout_request_id, None, PayoutStatus::Rejected, Some(note))
            .await
    }

    /// PENDING -> CANCELLED by the requesting doctor; the reserved
    /// amount returns to the wallet in the same transaction.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        payout_request_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<entity::payout_requests::Model> {
        self.release_reservation(
            payout_request_id,
            Some(doctor_id),
            PayoutStatus::Cancelled,
            None,
        )
        .await
    }

    /// APPROVED -> COMPLETED after the transfer went out. Settlement
    /// bookkeeping: the doctor's confirmed earnings become withdrawn.
    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        payout_request_id: Uuid,
    ) -> Result<entity::payout_requests::Model> {
        let txn = self.db.begin().await?;

        let payout = self.find_and_lock(payout_request_id, &txn).await?;
        if payout.status != PayoutStatus::Approved {
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Payout request {} is not approved",
                payout_request_id
            )));
        }

        let now = time::OffsetDateTime::now_utc();
        let doctor_id = payout.doctor_id;

        let mut payout_active: entity::payout_requests::ActiveModel = payout.into();
        payout_active.status = Set(PayoutStatus::Completed);
        payout_active.processed_at = Set(Some(now));
        let payout = payout_active.update(&txn).await?;

        entity::earnings::Entity::update_many()
            .set(entity::earnings::ActiveModel {
                status: Set(EarningStatus::Withdrawn),
                withdrawn_at: Set(Some(now)),
                ..Default::default()
            })
            .filter(entity::earnings::Column::DoctorId.eq(doctor_id))
            .filter(entity::earnings::Column::Status.eq(EarningStatus::Confirmed))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(
            payout_request_id = %payout_request_id,
            doctor_id = %doctor_id,
            "Payout completed, confirmed earnings marked withdrawn"
        );

        Ok(payout)
    }

    /// Doctor's payout requests, most recent first.
    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<entity::payout_requests::Model>> {
        let requests = entity::payout_requests::Entity::find()
            .filter(entity::payout_requests::Column::DoctorId.eq(doctor_id))
            .order_by_desc(entity::payout_requests::Column::RequestedAt)
            .all(&self.db)
            .await?;

        Ok(requests)
    }

    async fn find_and_lock(
        &self,
        payout_request_id: Uuid,
        txn: &sea_orm::DatabaseTransaction,
    ) -> Result<entity::payout_requests::Model> {
        entity::payout_requests::Entity::find_by_id(payout_request_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Payout request {}", payout_request_id)))
    }

    /// Shared PENDING -> terminal transition that restores the reserved
    /// amount. `expected_doctor` guards cancellation by ownership.
    async fn release_reservation(
        &self,
        payout_request_id: Uuid,
        expected_doctor: Option<Uuid>,
        target_status: PayoutStatus,
        note: Option<String>,
    ) -> Result<entity::payout_requests::Model> {
        let txn = self.db.begin().await?;

        let payout = self.find_and_lock(payout_request_id, &txn).await?;

        if let Some(doctor_id) = expected_doctor {
            if payout.doctor_id != doctor_id {
                txn.rollback().await?;
                return Err(ApiError::NotFound(format!(
                    "Payout request {}",
                    payout_request_id
                )));
            }
        }

        if payout.status != PayoutStatus::Pending {
            txn.rollback().await?;
            return Err(ApiError::Conflict(format!(
                "Payout request {} is not pending",
                payout_request_id
            )));
        }

        let doctor = entity::users::Entity::find_by_id(payout.doctor_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Doctor {} missing for payout request {}",
                    payout.doctor_id,
                    payout_request_id
                ))
            })?;

        let now = time::OffsetDateTime::now_utc();

        // Restore the reservation
        let mut doctor_active: entity::users::ActiveModel = doctor.clone().into();
        doctor_active.payout_balance = Set(doctor.payout_balance + payout.amount);
        doctor_active.updated_at = Set(now);
        doctor_active.update(&txn).await?;

        let mut payout_active: entity::payout_requests::ActiveModel = payout.into();
        payout_active.status = Set(target_status);
        match target_status {
            PayoutStatus::Rejected => {
                payout_active.rejected_at = Set(Some(now));
                payout_active.admin_note = Set(note);
            }
            PayoutStatus::Cancelled => payout_active.cancelled_at = Set(Some(now)),
            _ => {}
        }
        let payout = payout_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            payout_request_id = %payout_request_id,
            doctor_id = %payout.doctor_id,
            amount = payout.amount,
            status = ?payout.status,
            "Payout reservation released"
        );

        Ok(payout)
    }
}
