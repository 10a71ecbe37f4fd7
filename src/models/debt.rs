use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

impl DebtStatus {
    /// Active debts are the only ones a payment may be applied to.
    pub fn is_active(&self) -> bool {
        !matches!(self, DebtStatus::Paid | DebtStatus::Cancelled)
    }
}

/// An outstanding charge owed by a neighbor, as returned by the backend.
/// `balance` is server-authoritative; the console never mutates it locally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DebtItem {
    pub id: i64,
    pub debt_type_name: String,
    pub reason: String,
    pub period: Option<String>,
    pub amount: f64,
    pub balance: f64,
    pub status: DebtStatus,
}

impl DebtItem {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
