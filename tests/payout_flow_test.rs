/// Payout reservation tests: immediate debit on request, symmetric
/// restore on reject/cancel, and the single-pending constraint.
mod support;

use medipay::models::payouts::CreatePayoutRequest;
use medipay::ApiError;
use std::sync::Arc;
use tokio::task::JoinSet;

use entity::sea_orm_active_enums::{PartyRole, PayoutStatus};
use support::*;

fn bank_request(amount: i64) -> CreatePayoutRequest {
    CreatePayoutRequest {
        amount,
        bank_name: "First Medical Bank".to_string(),
        bank_account_number: "00123456789".to_string(),
        bank_account_holder: "Dr. Test Holder".to_string(),
    }
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn full_wallet_payout_then_second_request_is_declined() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let doctor = create_party(&db, PartyRole::Doctor, 0, 500_000).await;

    let payout = services
        .payouts
        .create_payout_request(doctor.id, bank_request(500_000))
        .await
        .expect("First payout request should succeed");

    assert_eq!(payout.status, PayoutStatus::Pending);
    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 0);

    // Any second request while one is pending is declined, and the
    // wallet stays untouched
    let second = services
        .payouts
        .create_payout_request(doctor.id, bank_request(1_000))
        .await;

    assert!(matches!(second, Err(ApiError::Conflict(_))));
    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 0);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn reject_restores_the_reserved_amount() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let doctor = create_party(&db, PartyRole::Doctor, 0, 300_000).await;

    let payout = services
        .payouts
        .create_payout_request(doctor.id, bank_request(120_000))
        .await
        .expect("Payout request should succeed");

    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 180_000);

    let rejected = services
        .payouts
        .reject(payout.id, "Bank details could not be verified".to_string())
        .await
        .expect("Reject should succeed");

    assert_eq!(rejected.status, PayoutStatus::Rejected);
    assert!(rejected.rejected_at.is_some());
    assert_eq!(
        rejected.admin_note.as_deref(),
        Some("Bank details could not be verified")
    );
    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 300_000);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn cancel_restores_the_reserved_amount() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let doctor = create_party(&db, PartyRole::Doctor, 0, 300_000).await;

    let payout = services
        .payouts
        .create_payout_request(doctor.id, bank_request(50_000))
        .await
        .expect("Payout request should succeed");

    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 250_000);

    let cancelled = services
        .payouts
        .cancel(payout.id, doctor.id)
        .await
        .expect("Cancel should succeed");

    assert_eq!(cancelled.status, PayoutStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 300_000);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn cancel_by_another_doctor_is_not_found() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let doctor = create_party(&db, PartyRole::Doctor, 0, 100_000).await;
    let other_doctor = create_party(&db, PartyRole::Doctor, 0, 0).await;

    let payout = services
        .payouts
        .create_payout_request(doctor.id, bank_request(100_000))
        .await
        .expect("Payout request should succeed");

    let result = services.payouts.cancel(payout.id, other_doctor.id).await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 0);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn approve_changes_no_balance_and_closes_the_pending_state() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let doctor = create_party(&db, PartyRole::Doctor, 0, 200_000).await;

    let payout = services
        .payouts
        .create_payout_request(doctor.id, bank_request(200_000))
        .await
        .expect("Payout request should succeed");

    let approved = services
        .payouts
        .approve(payout.id, "transfer-ref-0042".to_string())
        .await
        .expect("Approve should succeed");

    assert_eq!(approved.status, PayoutStatus::Approved);
    assert_eq!(approved.transfer_proof.as_deref(), Some("transfer-ref-0042"));
    // Funds were already removed at request time
    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 0);

    // An approved request can no longer be rejected
    let result = services
        .payouts
        .reject(payout.id, "too late".to_string())
        .await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn over_balance_request_is_declined_without_mutation() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let doctor = create_party(&db, PartyRole::Doctor, 0, 100).await;

    let result = services
        .payouts
        .create_payout_request(doctor.id, bank_request(200))
        .await;

    assert!(matches!(result, Err(ApiError::InsufficientBalance(_))));
    assert_eq!(reload_party(&db, doctor.id).await.payout_balance, 100);
}

#[tokio::test]
#[ignore] // Run only when database is available
async fn concurrent_requests_reserve_at_most_once() {
    let db = setup_test_db().await;
    let services = build_services(&db, &test_policy());

    let doctor = create_party(&db, PartyRole::Doctor, 0, 500_000).await;

    let mut tasks = JoinSet::new();
    for _ in 0..2 {
        let payouts = Arc::clone(&services.payouts);
        let doctor_id = doctor.id;
        tasks.spawn(async move {
            payouts
                .create_payout_request(doctor_id, bank_request(500_000))
                .await
        });
    }

    let mut success_count = 0;
    let mut declined_count = 0;
    while let Some(result) = tasks.join_next().await {
        match result.expect("Task must not panic") {
            Ok(_) => success_count += 1,
            Err(ApiError::Conflict(_)) | Err(ApiError::InsufficientBalance(_)) => {
                declined_count += 1
            }
            Err(e) => panic!("Unexpected error: {}", e),
        }
    }

    assert_eq!(success_count, 1, "Exactly one request may reserve funds");
    assert_eq!(declined_count, 1);
    assert_eq!(
        reload_party(&db, doctor.id).await.payout_balance,
        0,
        "Wallet must be debited exactly once"
    );
}
