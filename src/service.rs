use futures::join;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{Claims, JwtService};
use crate::client::{CollectApi, DebtItemCharge, NewPayment};
use crate::config::CONFIG;
use crate::constants::{AMOUNT_TOLERANCE, MAX_PAYMENT_AMOUNT};
use crate::error::RecaudaError;
use crate::models::{DebtItem, Neighbor, Payment, PaymentMethod};
use crate::receipt::Receipt;
use crate::selection::PaymentSelection;

/// Per-session workflow state. Debt balances in `debts` are a fetched copy;
/// the backend remains their owner.
#[derive(Default)]
struct Session {
    collect_id: Option<i64>,
    neighbor: Option<Neighbor>,
    debts: Vec<DebtItem>,
    selection: PaymentSelection,
    payments: Vec<Payment>,
}

/// Snapshot of the session handed to the UI shell.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SessionView {
    pub collect_id: Option<i64>,
    pub neighbor: Option<Neighbor>,
    pub debts: Vec<DebtItem>,
    pub selection: PaymentSelection,
    pub total_amount: f64,
}

/// Operator-entered fields accompanying a submission.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentInput {
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub received_by: Option<String>,
    pub notes: Option<String>,
}

/// Result of a successful submission. `reconciliation_warning` is set when
/// the payment itself succeeded but the post-success refetch failed or the
/// server disagreed with the client total; it is never a submission failure.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SubmissionOutcome {
    pub payment: Payment,
    pub receipt: Receipt,
    pub reconciliation_warning: Option<RecaudaError>,
}

pub struct RecaudaService<A: CollectApi> {
    pub api: A,
    session: Mutex<Session>,
    in_flight: AtomicBool,
    jwt_service: JwtService,
}

impl<A: CollectApi> RecaudaService<A> {
    pub fn new(api: A, jwt_secret: String) -> Self {
        info!("Initializing RecaudaService");
        RecaudaService {
            api,
            session: Mutex::new(Session::default()),
            in_flight: AtomicBool::new(false),
            jwt_service: JwtService::new(jwt_secret),
        }
    }

    // OPERATOR SESSION

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, RecaudaError> {
        if username != CONFIG.admin_user {
            return Err(RecaudaError::InvalidCredentials);
        }
        if bcrypt::verify(password, &CONFIG.admin_password_hash)
            .map_err(|e| RecaudaError::InternalServerError(format!("Password verification error: {}", e)))?
        {
            self.jwt_service.generate_token(username, "OPERATOR")
        } else {
            Err(RecaudaError::InvalidCredentials)
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, RecaudaError> {
        self.jwt_service.validate_token(token)
    }

    // COLLECTION SESSION

    pub async fn open_collect(&self, collect_id: i64) -> Result<Vec<Payment>, RecaudaError> {
        self.ensure_idle()?;
        info!("Opening collection session {}", collect_id);
        let payments = self.api.list_payments(collect_id).await?;
        let mut session = self.session.lock().await;
        *session = Session {
            collect_id: Some(collect_id),
            payments: payments.clone(),
            ..Session::default()
        };
        Ok(payments)
    }

    pub async fn list_neighbors(&self) -> Result<Vec<Neighbor>, RecaudaError> {
        self.api.list_neighbors().await
    }

    /// Switches the session to another neighbor. The previous selection and
    /// total are cleared before any debt is loaded, so allocated amounts can
    /// never leak across neighbors.
    pub async fn select_neighbor(&self, neighbor_id: i64) -> Result<Vec<DebtItem>, RecaudaError> {
        self.ensure_idle()?;
        {
            let session = self.session.lock().await;
            if session.collect_id.is_none() {
                return Err(RecaudaError::CollectNotOpen);
            }
        }
        let neighbor = self
            .api
            .list_neighbors()
            .await?
            .into_iter()
            .find(|n| n.id == neighbor_id)
            .ok_or(RecaudaError::NeighborNotFound(neighbor_id))?;
        info!("Selecting neighbor {} ({})", neighbor_id, neighbor.full_name());
        {
            let mut session = self.session.lock().await;
            session.selection.clear();
            session.debts.clear();
            session.neighbor = Some(neighbor);
        }
        self.reload_debts().await
    }

    /// Refetches the selected neighbor's active debts. The selection is left
    /// untouched, and on failure nothing changes.
    pub async fn reload_debts(&self) -> Result<Vec<DebtItem>, RecaudaError> {
        let neighbor_id = {
            let session = self.session.lock().await;
            session
                .neighbor
                .as_ref()
                .map(|n| n.id)
                .ok_or(RecaudaError::NoNeighborSelected)?
        };
        let debts = self.api.fetch_active_debts(neighbor_id).await?;
        debug!("Loaded {} active debts for neighbor {}", debts.len(), neighbor_id);
        let mut session = self.session.lock().await;
        session.debts = debts.clone();
        Ok(debts)
    }

    // SELECTION

    /// Selects the debt (defaulting the allocation to its full balance) or
    /// deselects it. Returns whether the debt is selected afterwards.
    pub async fn toggle_debt(&self, debt_item_id: i64) -> Result<bool, RecaudaError> {
        self.ensure_idle()?;
        let mut session = self.session.lock().await;
        if session.neighbor.is_none() {
            return Err(RecaudaError::NoNeighborSelected);
        }
        let balance = session
            .debts
            .iter()
            .find(|d| d.id == debt_item_id)
            .map(|d| d.balance)
            .ok_or(RecaudaError::DebtNotFound(debt_item_id))?;
        Ok(session.selection.toggle(debt_item_id, balance))
    }

    /// Overwrites the amount allocated to a selected debt. Amounts are not
    /// clamped here; the submission gate rejects non-positive ones.
    pub async fn set_allocated_amount(
        &self,
        debt_item_id: i64,
        amount: f64,
    ) -> Result<(), RecaudaError> {
        self.ensure_idle()?;
        let mut session = self.session.lock().await;
        if session.selection.set_amount(debt_item_id, amount) {
            Ok(())
        } else {
            Err(RecaudaError::DebtNotSelected(debt_item_id))
        }
    }

    pub async fn total_amount(&self) -> f64 {
        self.session.lock().await.selection.total_amount()
    }

    /// Abandons the in-progress selection. No side effects.
    pub async fn discard_selection(&self) -> Result<(), RecaudaError> {
        self.ensure_idle()?;
        self.session.lock().await.selection.clear();
        Ok(())
    }

    pub async fn session_view(&self) -> SessionView {
        let session = self.session.lock().await;
        SessionView {
            collect_id: session.collect_id,
            neighbor: session.neighbor.clone(),
            debts: session.debts.clone(),
            selection: session.selection.clone(),
            total_amount: session.selection.total_amount(),
        }
    }

    pub async fn payments(&self) -> Vec<Payment> {
        self.session.lock().await.payments.clone()
    }

    pub async fn refresh_payments(&self) -> Result<Vec<Payment>, RecaudaError> {
        let collect_id = {
            self.session
                .lock()
                .await
                .collect_id
                .ok_or(RecaudaError::CollectNotOpen)?
        };
        let payments = self.api.list_payments(collect_id).await?;
        self.session.lock().await.payments = payments.clone();
        Ok(payments)
    }

    // SUBMISSION

    /// Validates the selection and submits it as one atomic payment. On
    /// success the selection is cleared and authoritative state is
    /// refetched; on failure the selection is preserved for a retry.
    pub async fn submit_payment(
        &self,
        input: PaymentInput,
    ) -> Result<SubmissionOutcome, RecaudaError> {
        // Preconditions are checked before any network call.
        let (collect_id, neighbor, request) = {
            let session = self.session.lock().await;
            let collect_id = session.collect_id.ok_or(RecaudaError::CollectNotOpen)?;
            let neighbor = session
                .neighbor
                .clone()
                .ok_or(RecaudaError::NoNeighborSelected)?;
            if session.selection.is_empty() {
                return Err(RecaudaError::EmptySelection);
            }
            let total = session.selection.total_amount();
            if total <= 0.0 {
                return Err(RecaudaError::NonPositiveTotal(total));
            }
            if total > MAX_PAYMENT_AMOUNT {
                return Err(RecaudaError::AmountTooLarge(total));
            }
            for allocation in session.selection.allocations() {
                if allocation.amount <= 0.0 {
                    return Err(RecaudaError::InvalidAllocation {
                        debt_item_id: allocation.debt_item_id,
                        amount: allocation.amount,
                    });
                }
            }
            let debt_items = session
                .selection
                .allocations()
                .iter()
                .map(|a| DebtItemCharge {
                    debt_item_id: a.debt_item_id,
                    amount_applied: a.amount,
                })
                .collect();
            let request = NewPayment {
                neighbor_id: neighbor.id,
                total_amount: total,
                payment_method: input.payment_method,
                reference_number: input.reference_number.clone(),
                received_by: input.received_by.clone(),
                notes: input.notes.clone(),
                debt_items,
            };
            (collect_id, neighbor, request)
        };

        // One submission per session; a second click fails fast instead of
        // issuing a duplicate payment.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected concurrent submission for neighbor {}", neighbor.id);
            return Err(RecaudaError::SubmissionInFlight);
        }
        let result = self.do_submit(collect_id, &neighbor, request).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn do_submit(
        &self,
        collect_id: i64,
        neighbor: &Neighbor,
        request: NewPayment,
    ) -> Result<SubmissionOutcome, RecaudaError> {
        let attempt = Uuid::new_v4();
        info!(
            "Submitting payment attempt {} for neighbor {} (total {})",
            attempt, neighbor.id, request.total_amount
        );

        let payment = match self.api.create_payment(collect_id, &request).await {
            Ok(payment) => payment,
            Err(err) => {
                // The selection is preserved so the operator can retry
                // without re-entering anything.
                warn!("Payment attempt {} failed: {}", attempt, err);
                self.reconcile_after_failure(collect_id).await;
                return Err(err);
            }
        };
        info!("Payment {} confirmed for attempt {}", payment.id, attempt);

        let mut warning: Option<RecaudaError> = None;
        if (payment.total_amount - request.total_amount).abs() > AMOUNT_TOLERANCE {
            warn!(
                "Server total {} differs from client total {} for payment {}",
                payment.total_amount, request.total_amount, payment.id
            );
            warning = Some(RecaudaError::TotalMismatch {
                client: request.total_amount,
                server: payment.total_amount,
            });
        } else if (payment.details_total() - payment.total_amount).abs() > AMOUNT_TOLERANCE {
            warning = Some(RecaudaError::ReconciliationFailed(format!(
                "payment {} details do not add up to its total",
                payment.id
            )));
        }

        // Locally computed balances are never trusted after a successful
        // submission: clear the selection, then refetch everything.
        self.session.lock().await.selection.clear();

        let (debts_result, payments_result) = join!(
            self.api.fetch_active_debts(neighbor.id),
            self.api.list_payments(collect_id)
        );
        {
            let mut session = self.session.lock().await;
            match debts_result {
                Ok(debts) => session.debts = debts,
                Err(err) => {
                    warn!("Debt refetch after payment {} failed: {}", payment.id, err);
                    warning.get_or_insert(RecaudaError::ReconciliationFailed(format!(
                        "active debts could not be refreshed: {}",
                        err
                    )));
                }
            }
            match payments_result {
                Ok(payments) => session.payments = payments,
                Err(err) => {
                    warn!(
                        "Payment history refetch after payment {} failed: {}",
                        payment.id, err
                    );
                    warning.get_or_insert(RecaudaError::ReconciliationFailed(format!(
                        "payment history could not be refreshed: {}",
                        err
                    )));
                }
            }
        }

        let receipt = Receipt::from_payment(&payment, &neighbor.full_name());
        Ok(SubmissionOutcome {
            payment,
            receipt,
            reconciliation_warning: warning,
        })
    }

    /// Best-effort refetch after a failed attempt, so the console does not
    /// drift from the backend. The selection stays put.
    async fn reconcile_after_failure(&self, collect_id: i64) {
        let neighbor_id = {
            self.session.lock().await.neighbor.as_ref().map(|n| n.id)
        };
        let payments_result = self.api.list_payments(collect_id).await;
        match payments_result {
            Ok(payments) => self.session.lock().await.payments = payments,
            Err(err) => warn!("Payment history refresh after failure also failed: {}", err),
        }
        if let Some(neighbor_id) = neighbor_id {
            match self.api.fetch_active_debts(neighbor_id).await {
                Ok(debts) => self.session.lock().await.debts = debts,
                Err(err) => warn!("Debt refresh after failure also failed: {}", err),
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), RecaudaError> {
        if self.in_flight.load(Ordering::SeqCst) {
            return Err(RecaudaError::SubmissionInFlight);
        }
        Ok(())
    }
}
