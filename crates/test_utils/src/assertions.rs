//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for ledger and request state that
//! give more meaningful error messages than standard assertions.

use core_kernel::{ApprovalStatus, Tomans, UserId};
use domain_requests::FinancialRequest;
use domain_wallet::{replay_balance, WalletLedger};

/// Asserts the wallet's figures agree with its journal and reservations
///
/// # Panics
///
/// Panics if the replayed journal disagrees with the balance, if the live
/// reservations do not sum to the reserved figure, or if available is not
/// balance minus reserved
pub async fn assert_ledger_consistent(ledger: &WalletLedger, user_id: UserId) {
    let snapshot = ledger.balance(user_id).await.unwrap();
    let journal = ledger.journal_for(user_id).await.unwrap();
    let reservations = ledger.reservations_for(user_id).await.unwrap();

    let replayed = replay_balance(&journal);
    assert_eq!(
        replayed,
        Some(snapshot.balance.value()),
        "Journal replay disagrees with balance for {}: replayed={:?}, balance={}",
        user_id,
        replayed,
        snapshot.balance
    );

    let held = Tomans::checked_sum(reservations.iter().map(|r| r.amount)).unwrap();
    assert_eq!(
        held, snapshot.reserved,
        "Live reservations sum to {} but reserved is {}",
        held, snapshot.reserved
    );

    let expected_available = snapshot.balance.checked_sub(snapshot.reserved).unwrap();
    assert_eq!(
        snapshot.available, expected_available,
        "Available {} is not balance {} minus reserved {}",
        snapshot.available, snapshot.balance, snapshot.reserved
    );
}

/// Asserts the user's balance and available figures
pub async fn assert_wallet(ledger: &WalletLedger, user_id: UserId, balance: i64, available: i64) {
    let snapshot = ledger.balance(user_id).await.unwrap();
    assert_eq!(
        (snapshot.balance.value(), snapshot.available.value()),
        (balance, available),
        "Expected balance/available {}/{}, got {}/{}",
        balance,
        available,
        snapshot.balance,
        snapshot.available
    );
}

/// Asserts the user holds no live reservations
pub async fn assert_no_reservations(ledger: &WalletLedger, user_id: UserId) {
    let reservations = ledger.reservations_for(user_id).await.unwrap();
    assert!(
        reservations.is_empty(),
        "Expected no reservations for {}, found {}",
        user_id,
        reservations.len()
    );
}

/// Asserts a request reached a status, with resolution fields to match
pub fn assert_request_status(request: &FinancialRequest, expected: ApprovalStatus) {
    assert_eq!(
        request.status, expected,
        "Request {} is {}, expected {}",
        request.id, request.status, expected
    );
    match expected {
        ApprovalStatus::Pending => assert!(request.resolved_at.is_none()),
        ApprovalStatus::Completed => assert!(request.completed_at.is_some()),
        ApprovalStatus::Approved | ApprovalStatus::Rejected => {
            assert!(request.resolved_at.is_some());
            assert!(request.reservation_id.is_none());
        }
    }
}
