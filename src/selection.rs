use log::debug;
use serde::Serialize;
use utoipa::ToSchema;

/// The amount of an in-progress payment assigned to one debt item.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Allocation {
    pub debt_item_id: i64,
    pub amount: f64,
}

/// The operator's in-progress choice of debts to pay. Allocations keep
/// insertion order so a submission built from them is deterministic.
///
/// The running total is recomputed on every mutation and never cached
/// stale; it always equals the sum of the allocated amounts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct PaymentSelection {
    allocations: Vec<Allocation>,
    total: f64,
}

impl PaymentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_selected(&self, debt_item_id: i64) -> bool {
        self.allocations.iter().any(|a| a.debt_item_id == debt_item_id)
    }

    pub fn amount_for(&self, debt_item_id: i64) -> Option<f64> {
        self.allocations
            .iter()
            .find(|a| a.debt_item_id == debt_item_id)
            .map(|a| a.amount)
    }

    /// Selects the debt with `default_amount` if it is unselected, deselects
    /// it otherwise. Returns whether the debt is selected afterwards.
    pub fn toggle(&mut self, debt_item_id: i64, default_amount: f64) -> bool {
        let selected = if let Some(pos) = self
            .allocations
            .iter()
            .position(|a| a.debt_item_id == debt_item_id)
        {
            self.allocations.remove(pos);
            false
        } else {
            self.allocations.push(Allocation {
                debt_item_id,
                amount: default_amount,
            });
            true
        };
        self.recompute_total();
        debug!(
            "Toggled debt {}: selected={}, total={}",
            debt_item_id, selected, self.total
        );
        selected
    }

    /// Overwrites the amount allocated to an already-selected debt. No
    /// clamping happens here; the submission gate rejects bad amounts.
    /// Returns false if the debt is not selected.
    pub fn set_amount(&mut self, debt_item_id: i64, amount: f64) -> bool {
        let Some(allocation) = self
            .allocations
            .iter_mut()
            .find(|a| a.debt_item_id == debt_item_id)
        else {
            return false;
        };
        allocation.amount = amount;
        self.recompute_total();
        debug!(
            "Set amount for debt {}: amount={}, total={}",
            debt_item_id, amount, self.total
        );
        true
    }

    pub fn clear(&mut self) {
        self.allocations.clear();
        self.total = 0.0;
    }

    pub fn total_amount(&self) -> f64 {
        self.total
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    fn recompute_total(&mut self) {
        self.total = self.allocations.iter().map(|a| a.amount).sum();
    }
}
