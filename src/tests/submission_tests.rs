// src/tests/submission_tests.rs

use std::time::Duration;

use crate::error::{ErrorKind, RecaudaError};
use crate::models::{DebtStatus, PaymentMethod};
use crate::receipt;
use crate::service::PaymentInput;
use crate::tests::{create_test_service, seed_roster};

fn cash_input() -> PaymentInput {
    PaymentInput {
        payment_method: PaymentMethod::Cash,
        reference_number: None,
        received_by: Some("Ana Quispe".to_string()),
        notes: None,
    }
}

#[tokio::test]
async fn round_trip_payment_applies_selected_amounts() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();

    service.toggle_debt(1).await.unwrap(); // defaults to full balance 50.0
    service.toggle_debt(2).await.unwrap();
    service.set_allocated_amount(2, 30.0).await.unwrap();
    assert_eq!(service.total_amount().await, 80.0);

    let outcome = service.submit_payment(cash_input()).await.unwrap();
    let payment = &outcome.payment;
    assert_eq!(payment.total_amount, 80.0);
    assert_eq!(payment.payment_details.len(), 2);
    assert_eq!(payment.payment_details[0].debt_item_id, 1);
    assert_eq!(payment.payment_details[0].amount_applied, 50.0);
    assert_eq!(payment.payment_details[1].debt_item_id, 2);
    assert_eq!(payment.payment_details[1].amount_applied, 30.0);
    assert_eq!(payment.details_total(), payment.total_amount);
    assert!(outcome.reconciliation_warning.is_none());

    // Selection cleared, authoritative state refetched.
    let view = service.session_view().await;
    assert!(view.selection.is_empty());
    assert_eq!(view.total_amount, 0.0);
    assert!(view.debts.iter().all(|d| d.status != DebtStatus::Paid));
    assert_eq!(service.payments().await.len(), 1);

    // Receipt matches the confirmed payment.
    assert_eq!(outcome.receipt.number, "00001");
    assert!(receipt::verify_token(&outcome.receipt.token, payment));
}

#[tokio::test]
async fn partial_allocation_leaves_debt_partial() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(2).await.unwrap();
    service.set_allocated_amount(2, 10.0).await.unwrap();

    let outcome = service.submit_payment(cash_input()).await.unwrap();
    let detail = &outcome.payment.payment_details[0];
    assert_eq!(detail.previous_balance, Some(30.0));
    assert_eq!(detail.new_balance, Some(20.0));

    let view = service.session_view().await;
    let debt = view.debts.iter().find(|d| d.id == 2).unwrap();
    assert_eq!(debt.balance, 20.0);
    assert_eq!(debt.status, DebtStatus::Partial);
}

#[tokio::test]
async fn empty_selection_never_reaches_the_network() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();

    let err = service.submit_payment(cash_input()).await.unwrap_err();
    assert_eq!(err, RecaudaError::EmptySelection);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(service.api.create_payment_calls(), 0);
}

#[tokio::test]
async fn non_positive_allocation_is_rejected_before_the_network() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();
    service.toggle_debt(2).await.unwrap();
    service.set_allocated_amount(2, 0.0).await.unwrap();

    let err = service.submit_payment(cash_input()).await.unwrap_err();
    assert_eq!(
        err,
        RecaudaError::InvalidAllocation {
            debt_item_id: 2,
            amount: 0.0
        }
    );
    assert_eq!(service.api.create_payment_calls(), 0);

    // The selection survives the rejection.
    let view = service.session_view().await;
    assert_eq!(view.selection.len(), 2);
}

#[tokio::test]
async fn failed_submission_preserves_the_selection() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();
    service.set_allocated_amount(1, 35.0).await.unwrap();
    let before = service.session_view().await.selection;

    service.api.set_fail_create_payment(true);
    let err = service.submit_payment(cash_input()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_retryable());

    let after = service.session_view().await.selection;
    assert_eq!(before, after);

    // Retry succeeds once the backend recovers.
    service.api.set_fail_create_payment(false);
    let outcome = service.submit_payment(cash_input()).await.unwrap();
    assert_eq!(outcome.payment.total_amount, 35.0);
}

#[tokio::test]
async fn duplicate_submission_issues_a_single_request() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();
    service.api.set_create_delay(Some(Duration::from_millis(50))).await;

    let (first, second) = futures::join!(
        service.submit_payment(cash_input()),
        service.submit_payment(cash_input())
    );

    let oks = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(oks, 1);
    let rejected = if first.is_ok() { second } else { first };
    assert_eq!(rejected.unwrap_err(), RecaudaError::SubmissionInFlight);
    assert_eq!(service.api.create_payment_calls(), 1);
}

#[tokio::test]
async fn mutators_refuse_while_a_submission_is_in_flight() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();
    service.api.set_create_delay(Some(Duration::from_millis(50))).await;

    let (outcome, toggled) = futures::join!(service.submit_payment(cash_input()), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        service.toggle_debt(2).await
    });
    assert!(outcome.is_ok());
    assert_eq!(toggled.unwrap_err(), RecaudaError::SubmissionInFlight);
}

#[tokio::test]
async fn reload_is_idempotent_and_keeps_the_selection() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();

    let first = service.reload_debts().await.unwrap();
    let second = service.reload_debts().await.unwrap();
    assert_eq!(first, second);

    let view = service.session_view().await;
    assert!(view.selection.is_selected(1));
    assert_eq!(view.total_amount, 50.0);
}

#[tokio::test]
async fn failed_reload_leaves_state_untouched() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();

    service.api.set_fail_active_debts(true);
    let err = service.reload_debts().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);

    let view = service.session_view().await;
    assert_eq!(view.debts.len(), 2);
    assert!(view.selection.is_selected(1));
}

#[tokio::test]
async fn switching_neighbor_clears_the_selection_first() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();
    assert_eq!(service.total_amount().await, 50.0);

    let debts = service.select_neighbor(2).await.unwrap();
    assert_eq!(debts.len(), 1);
    assert_eq!(debts[0].id, 3);

    let view = service.session_view().await;
    assert!(view.selection.is_empty());
    assert_eq!(view.total_amount, 0.0);
    assert_eq!(view.neighbor.as_ref().unwrap().id, 2);
}

#[tokio::test]
async fn server_total_mismatch_is_a_reconciliation_warning() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();
    service.api.set_total_override(Some(45.0)).await;

    let outcome = service.submit_payment(cash_input()).await.unwrap();
    let warning = outcome.reconciliation_warning.unwrap();
    assert_eq!(warning.kind(), ErrorKind::Reconciliation);
    assert_eq!(
        warning,
        RecaudaError::TotalMismatch {
            client: 50.0,
            server: 45.0
        }
    );

    // The payment itself succeeded; the selection is gone.
    assert!(service.session_view().await.selection.is_empty());
}

#[tokio::test]
async fn refetch_failure_after_success_is_not_a_submission_failure() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    service.select_neighbor(1).await.unwrap();
    service.toggle_debt(1).await.unwrap();
    service.api.set_fail_list_payments(true);

    let outcome = service.submit_payment(cash_input()).await.unwrap();
    let warning = outcome.reconciliation_warning.unwrap();
    assert_eq!(warning.kind(), ErrorKind::Reconciliation);
    assert!(service.session_view().await.selection.is_empty());
}

#[tokio::test]
async fn operations_require_an_open_collect() {
    let service = create_test_service();
    seed_roster(&service).await;

    let err = service.select_neighbor(1).await.unwrap_err();
    assert_eq!(err, RecaudaError::CollectNotOpen);
    let err = service.submit_payment(cash_input()).await.unwrap_err();
    assert_eq!(err, RecaudaError::CollectNotOpen);
}

#[tokio::test]
async fn unknown_debts_and_neighbors_are_rejected() {
    let service = create_test_service();
    seed_roster(&service).await;

    service.open_collect(10).await.unwrap();
    let err = service.select_neighbor(99).await.unwrap_err();
    assert_eq!(err, RecaudaError::NeighborNotFound(99));

    service.select_neighbor(1).await.unwrap();
    let err = service.toggle_debt(99).await.unwrap_err();
    assert_eq!(err, RecaudaError::DebtNotFound(99));
    let err = service.set_allocated_amount(1, 10.0).await.unwrap_err();
    assert_eq!(err, RecaudaError::DebtNotSelected(1));
}
