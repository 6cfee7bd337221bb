/// Purchase ledger tests: atomic wallet debit on purchase creation,
/// declined outcomes, and the doctor warning banding over the
/// trailing window.
mod support;

use medipay::ApiError;

use entity::sea_orm_active_enums::{PartyRole, SessionStatus};
use medipay::models::common::WarningLevel;
use support::*;

#[tokio::test]
#[ignore] // Run only when database is available
async fn purchase_debits_the_wallet_with_the_insert() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 250_000, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Approved).await;

    let (purchase, wallet_balance) = services
        .purchases
        .create_purchase(patient.id, session.id, 100_000, 30)
        .await
        .expect("Purchase should succeed");

    assert_eq!(purchase.amount, 100_000);
    assert!(!purchase.refunded);
    assert_eq!(
        purchase.expires_at - purchase.created_at,
        time::Duration::minutes(30)
    );
    assert_eq!(wallet_balance, 150_000);
    assert_eq!(reload_party(&db, patient.id).await.wallet_balance, 150_000);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn purchase_over_wallet_balance_is_declined_without_mutation() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 40_000, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Active).await;

    let result = services
        .purchases
        .create_purchase(patient.id, session.id, 100_000, 30)
        .await;

    assert!(matches!(result, Err(ApiError::InsufficientBalance(_))));
    assert_eq!(reload_party(&db, patient.id).await.wallet_balance, 40_000);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn purchase_requires_an_open_session() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 100_000, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Cancelled).await;

    let result = services
        .purchases
        .create_purchase(patient.id, session.id, 50_000, 30)
        .await;

    assert!(matches!(result, Err(ApiError::BadRequest(_))));
    assert_eq!(reload_party(&db, patient.id).await.wallet_balance, 100_000);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn purchase_on_another_patients_session_is_not_found() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 100_000, 0).await;
    let other_patient = create_party(&db, PartyRole::Patient, 100_000, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;
    let session = create_session(&db, patient.id, doctor.id, SessionStatus::Approved).await;

    let result = services
        .purchases
        .create_purchase(other_patient.id, session.id, 50_000, 30)
        .await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn six_no_response_refunds_band_to_moderate() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 0, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;

    // Six refunds inside the trailing 30-day window; thresholds 3/5/8
    let now = time::OffsetDateTime::now_utc();
    for day in 1..=6 {
        let session = create_session(&db, patient.id, doctor.id, SessionStatus::Cancelled).await;
        create_no_response_refund(&db, session.id, 50_000, now - time::Duration::days(day)).await;
    }

    let warnings = services
        .refunds
        .doctor_warnings(doctor.id)
        .await
        .expect("Warnings query should succeed");

    assert_eq!(warnings.no_response_refunds, 6);
    assert_eq!(warnings.level, Some(WarningLevel::Moderate));
    assert!(warnings.message.is_some());
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn refunds_outside_the_window_do_not_count() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let patient = create_party(&db, PartyRole::Patient, 0, 0).await;
    let doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;

    let now = time::OffsetDateTime::now_utc();
    for day in [2_i64, 40, 45, 50] {
        let session = create_session(&db, patient.id, doctor.id, SessionStatus::Cancelled).await;
        create_no_response_refund(&db, session.id, 50_000, now - time::Duration::days(day)).await;
    }

    let warnings = services
        .refunds
        .doctor_warnings(doctor.id)
        .await
        .expect("Warnings query should succeed");

    assert_eq!(warnings.no_response_refunds, 1);
    assert_eq!(warnings.level, None);
    assert_eq!(warnings.message, None);
}
