use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::client::{CollectApi, NewPayment};
use crate::constants::AMOUNT_TOLERANCE;
use crate::error::RecaudaError;
use crate::models::{DebtItem, DebtStatus, Neighbor, Payment, PaymentDetail};

/// In-memory stand-in for the collections backend. It owns debt balances the
/// way the real backend does: `create_payment` applies each charge, snapshots
/// previous/new balances and flips debt statuses. Failure flags, call
/// counters, artificial latency and a total override make the workflow's
/// failure and race paths reachable from tests.
pub struct InMemoryCollectApi {
    neighbors: Mutex<Vec<Neighbor>>,
    debts: Mutex<HashMap<i64, Vec<DebtItem>>>, // neighbor_id -> debts
    payments: Mutex<HashMap<i64, Vec<Payment>>>, // collect_id -> payments
    next_payment_id: AtomicI64,
    next_detail_id: AtomicI64,
    fail_list_neighbors: AtomicBool,
    fail_active_debts: AtomicBool,
    fail_create_payment: AtomicBool,
    fail_list_payments: AtomicBool,
    total_override: Mutex<Option<f64>>,
    create_delay: Mutex<Option<Duration>>,
    list_neighbor_calls: AtomicUsize,
    active_debt_calls: AtomicUsize,
    create_payment_calls: AtomicUsize,
    list_payment_calls: AtomicUsize,
}

impl InMemoryCollectApi {
    pub fn new() -> Self {
        InMemoryCollectApi {
            neighbors: Mutex::new(Vec::new()),
            debts: Mutex::new(HashMap::new()),
            payments: Mutex::new(HashMap::new()),
            next_payment_id: AtomicI64::new(1),
            next_detail_id: AtomicI64::new(1),
            fail_list_neighbors: AtomicBool::new(false),
            fail_active_debts: AtomicBool::new(false),
            fail_create_payment: AtomicBool::new(false),
            fail_list_payments: AtomicBool::new(false),
            total_override: Mutex::new(None),
            create_delay: Mutex::new(None),
            list_neighbor_calls: AtomicUsize::new(0),
            active_debt_calls: AtomicUsize::new(0),
            create_payment_calls: AtomicUsize::new(0),
            list_payment_calls: AtomicUsize::new(0),
        }
    }

    pub async fn seed_neighbor(&self, neighbor: Neighbor) {
        self.neighbors.lock().await.push(neighbor);
    }

    pub async fn seed_debt(&self, neighbor_id: i64, debt: DebtItem) {
        self.debts
            .lock()
            .await
            .entry(neighbor_id)
            .or_insert_with(Vec::new)
            .push(debt);
    }

    pub fn set_fail_list_neighbors(&self, fail: bool) {
        self.fail_list_neighbors.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_active_debts(&self, fail: bool) {
        self.fail_active_debts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_create_payment(&self, fail: bool) {
        self.fail_create_payment.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_list_payments(&self, fail: bool) {
        self.fail_list_payments.store(fail, Ordering::SeqCst);
    }

    /// Forces the server-side total of the next created payments, to simulate
    /// another operator racing this one.
    pub async fn set_total_override(&self, total: Option<f64>) {
        *self.total_override.lock().await = total;
    }

    /// Delays `create_payment` responses, to widen race windows in tests.
    pub async fn set_create_delay(&self, delay: Option<Duration>) {
        *self.create_delay.lock().await = delay;
    }

    pub fn active_debt_calls(&self) -> usize {
        self.active_debt_calls.load(Ordering::SeqCst)
    }

    pub fn create_payment_calls(&self) -> usize {
        self.create_payment_calls.load(Ordering::SeqCst)
    }

    pub fn list_payment_calls(&self) -> usize {
        self.list_payment_calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryCollectApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectApi for InMemoryCollectApi {
    async fn list_neighbors(&self) -> Result<Vec<Neighbor>, RecaudaError> {
        self.list_neighbor_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list_neighbors.load(Ordering::SeqCst) {
            return Err(RecaudaError::NetworkError("injected failure".to_string()));
        }
        Ok(self.neighbors.lock().await.clone())
    }

    async fn fetch_active_debts(&self, neighbor_id: i64) -> Result<Vec<DebtItem>, RecaudaError> {
        self.active_debt_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_active_debts.load(Ordering::SeqCst) {
            return Err(RecaudaError::NetworkError("injected failure".to_string()));
        }
        Ok(self
            .debts
            .lock()
            .await
            .get(&neighbor_id)
            .map(|debts| debts.iter().filter(|d| d.is_active()).cloned().collect())
            .unwrap_or_default())
    }

    async fn create_payment(
        &self,
        collect_id: i64,
        payment: &NewPayment,
    ) -> Result<Payment, RecaudaError> {
        self.create_payment_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = *self.create_delay.lock().await {
            tokio::time::sleep(delay).await;
        }
        if self.fail_create_payment.load(Ordering::SeqCst) {
            return Err(RecaudaError::NetworkError("injected failure".to_string()));
        }

        let neighbor = self
            .neighbors
            .lock()
            .await
            .iter()
            .find(|n| n.id == payment.neighbor_id)
            .cloned()
            .ok_or(RecaudaError::NeighborNotFound(payment.neighbor_id))?;

        let mut debts = self.debts.lock().await;
        let neighbor_debts = debts
            .entry(payment.neighbor_id)
            .or_insert_with(Vec::new);

        let mut details = Vec::with_capacity(payment.debt_items.len());
        for charge in &payment.debt_items {
            let debt = neighbor_debts
                .iter_mut()
                .find(|d| d.id == charge.debt_item_id)
                .ok_or(RecaudaError::DebtNotFound(charge.debt_item_id))?;
            let previous = debt.balance;
            let new = (previous - charge.amount_applied).max(0.0);
            debt.balance = new;
            debt.status = if new <= AMOUNT_TOLERANCE {
                DebtStatus::Paid
            } else {
                DebtStatus::Partial
            };
            details.push(PaymentDetail {
                id: self.next_detail_id.fetch_add(1, Ordering::SeqCst),
                debt_item_id: charge.debt_item_id,
                debt_reason: debt.reason.clone(),
                debt_type_name: debt.debt_type_name.clone(),
                amount_applied: charge.amount_applied,
                previous_balance: Some(previous),
                new_balance: Some(new),
                notes: None,
            });
        }

        let total = self
            .total_override
            .lock()
            .await
            .unwrap_or(payment.total_amount);
        let created = Payment {
            id: self.next_payment_id.fetch_add(1, Ordering::SeqCst),
            neighbor_id: neighbor.id,
            neighbor_name: neighbor.full_name(),
            neighbor_ci: neighbor.ci.clone(),
            payment_date: Utc::now().date_naive(),
            total_amount: total,
            payment_method: Some(payment.payment_method),
            reference_number: payment.reference_number.clone(),
            received_by: payment.received_by.clone(),
            notes: payment.notes.clone(),
            payment_details: details,
        };

        self.payments
            .lock()
            .await
            .entry(collect_id)
            .or_insert_with(Vec::new)
            .push(created.clone());
        Ok(created)
    }

    async fn list_payments(&self, collect_id: i64) -> Result<Vec<Payment>, RecaudaError> {
        self.list_payment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list_payments.load(Ordering::SeqCst) {
            return Err(RecaudaError::NetworkError("injected failure".to_string()));
        }
        Ok(self
            .payments
            .lock()
            .await
            .get(&collect_id)
            .cloned()
            .unwrap_or_default())
    }
}
