use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RecaudaError;
use crate::models::{DebtItem, Neighbor, Payment, PaymentMethod};

pub mod http;
pub mod in_memory;

/// One line of a payment submission: the debt to reduce and the amount
/// applied to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DebtItemCharge {
    pub debt_item_id: i64,
    pub amount_applied: f64,
}

/// A complete payment submission. Sent as a single all-or-nothing request;
/// debts are deliberately not submitted one at a time, so an interrupted
/// session cannot leave a payment half-applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewPayment {
    pub neighbor_id: i64,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub received_by: Option<String>,
    pub notes: Option<String>,
    pub debt_items: Vec<DebtItemCharge>,
}

/// Body of `POST /collect-debts/{collect_id}/payments`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentItemsBody {
    pub debt_items: Vec<DebtItemCharge>,
}

/// Envelope of `GET /neighbors/`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NeighborListResponse {
    pub data: Vec<Neighbor>,
}

/// Envelope of `GET /neighbors/{id}/debts/active`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveDebtsResponse {
    pub debt_details: Vec<DebtItem>,
}

/// The external collections backend. It is the sole owner of debt balances
/// and payment records; everything the console shows is fetched from here.
#[async_trait]
pub trait CollectApi: Send + Sync {
    /// Returns the neighbor roster.
    async fn list_neighbors(&self) -> Result<Vec<Neighbor>, RecaudaError>;

    /// Returns the neighbor's debts with status not in {paid, cancelled}.
    async fn fetch_active_debts(&self, neighbor_id: i64) -> Result<Vec<DebtItem>, RecaudaError>;

    /// Submits one payment atomically and returns the created record,
    /// including per-detail previous/new balance snapshots.
    async fn create_payment(
        &self,
        collect_id: i64,
        payment: &NewPayment,
    ) -> Result<Payment, RecaudaError>;

    /// Returns the payment history of one collection event.
    async fn list_payments(&self, collect_id: i64) -> Result<Vec<Payment>, RecaudaError>;
}
