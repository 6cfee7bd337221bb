/// Earning ledger tests: one earning per honored purchase, snapshotted
/// commission, idempotent confirmation, and withdrawal bookkeeping at
/// payout settlement.
mod support;

use medipay::config::EarningsConfig;
use medipay::models::common::refund_reasons;
use medipay::models::payouts::CreatePayoutRequest;
use medipay::services::EarningService;
use medipay::ApiError;
use sea_orm::EntityTrait;

use entity::sea_orm_active_enums::{EarningStatus, PartyRole, SessionStatus};
use support::*;

#[tokio::test]
#[ignore] // Run only when database is available
async fn honored_purchase_creates_a_balanced_earning() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 0, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Active).await;
    let purchase =
        create_purchase_at(&db, session.id, 100_000, time::OffsetDateTime::now_utc()).await;

    let earning = services
        .earnings
        .create_earning_from_purchase(purchase.id)
        .await
        .expect("Earning should be created");

    assert_eq!(earning.total_amount, 100_000);
    assert_eq!(earning.commission_percentage, 70);
    assert_eq!(earning.doctor_amount + earning.platform_fee, 100_000);
    assert_eq!(earning.status, EarningStatus::Pending);

    // The session closed; the purchase left the sweep's reach
    let session = entity::session_requests::Entity::find_by_id(session.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn refunded_purchase_cannot_be_honored() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 0, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Approved).await;
    let purchase =
        create_purchase_at(&db, session.id, 100_000, time::OffsetDateTime::now_utc()).await;

    services
        .refunds
        .execute_refund(purchase.id, refund_reasons::MANUAL_ADMIN)
        .await
        .expect("Refund should apply");

    let result = services
        .earnings
        .create_earning_from_purchase(purchase.id)
        .await;

    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn only_one_earning_per_purchase() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 0, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Active).await;
    let purchase =
        create_purchase_at(&db, session.id, 60_000, time::OffsetDateTime::now_utc()).await;

    services
        .earnings
        .create_earning_from_purchase(purchase.id)
        .await
        .expect("First earning should be created");

    let second = services
        .earnings
        .create_earning_from_purchase(purchase.id)
        .await;

    assert!(matches!(second, Err(ApiError::Conflict(_))));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn confirm_credits_payout_wallet_exactly_once() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 0, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Active).await;
    let purchase =
        create_purchase_at(&db, session.id, 100_000, time::OffsetDateTime::now_utc()).await;

    let earning = services
        .earnings
        .create_earning_from_purchase(purchase.id)
        .await
        .expect("Earning should be created");

    let confirmed = services
        .earnings
        .confirm_earning(earning.id)
        .await
        .expect("Confirm should succeed");

    assert_eq!(confirmed.status, EarningStatus::Confirmed);
    assert!(confirmed.confirmed_at.is_some());
    assert_eq!(
        reload_party(&db, doctor.id).await.payout_balance,
        confirmed.doctor_amount
    );

    // Idempotent guard: a second confirm is a declined outcome
    let second = services.earnings.confirm_earning(earning.id).await;
    assert!(matches!(second, Err(ApiError::Conflict(_))));
    assert_eq!(
        reload_party(&db, doctor.id).await.payout_balance,
        confirmed.doctor_amount,
        "Payout wallet must not be credited twice"
    );
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn commission_is_snapshotted_at_creation() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 0, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;

    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Active).await;
    let purchase =
        create_purchase_at(&db, session.id, 100_000, time::OffsetDateTime::now_utc()).await;

    let old_rate_service = EarningService::new(
        db.clone(),
        &EarningsConfig {
            commission_percentage: 60,
        },
    );
    let earning = old_rate_service
        .create_earning_from_purchase(purchase.id)
        .await
        .expect("Earning should be created at 60%");
    assert_eq!(earning.commission_percentage, 60);
    assert_eq!(earning.doctor_amount, 60_000);

    // A later policy change creates new earnings at the new rate but
    // never touches existing ones
    let session2 = create_session(&db, patient.id, doctor.id, SessionStatus::Active).await;
    let purchase2 =
        create_purchase_at(&db, session2.id, 100_000, time::OffsetDateTime::now_utc()).await;

    let new_rate_service = EarningService::new(
        db.clone(),
        &EarningsConfig {
            commission_percentage: 80,
        },
    );
    let earning2 = new_rate_service
        .create_earning_from_purchase(purchase2.id)
        .await
        .expect("Earning should be created at 80%");
    assert_eq!(earning2.commission_percentage, 80);

    let first_again = entity::earnings::Entity::find_by_id(earning.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first_again.commission_percentage, 60);
    assert_eq!(first_again.doctor_amount, 60_000);

    // Keep the summary consistent regardless of mixed rates
    let summary = services
        .earnings
        .earnings_summary(doctor.id)
        .await
        .expect("Summary should succeed");
    for view in &summary.earnings {
        assert_eq!(view.doctor_amount + view.platform_fee, view.total_amount);
    }
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn payout_completion_marks_confirmed_earnings_withdrawn() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 0, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Active).await;
    let purchase =
        create_purchase_at(&db, session.id, 100_000, time::OffsetDateTime::now_utc()).await;

    let earning = services
        .earnings
        .create_earning_from_purchase(purchase.id)
        .await
        .expect("Earning should be created");
    let earning = services
        .earnings
        .confirm_earning(earning.id)
        .await
        .expect("Confirm should succeed");

    let payout = services
        .payouts
        .create_payout_request(
            doctor.id,
            CreatePayoutRequest {
                amount: earning.doctor_amount,
                bank_name: "First Medical Bank".to_string(),
                bank_account_number: "00123456789".to_string(),
                bank_account_holder: "Dr. Test Holder".to_string(),
            },
        )
        .await
        .expect("Payout request should succeed");

    services
        .payouts
        .approve(payout.id, "transfer-ref-0099".to_string())
        .await
        .expect("Approve should succeed");

    services
        .payouts
        .complete(payout.id)
        .await
        .expect("Complete should succeed");

    let settled = entity::earnings::Entity::find_by_id(earning.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.status, EarningStatus::Withdrawn);
    assert!(settled.withdrawn_at.is_some());
}
