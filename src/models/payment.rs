use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Qr,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Qr => "qr",
            PaymentMethod::Card => "card",
        }
    }

    /// Spanish label shown on receipts and in the payment history.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::Qr => "QR",
            PaymentMethod::Card => "Tarjeta",
        }
    }
}

/// One allocation of a confirmed payment to a single debt item, with the
/// balance snapshots taken by the backend at the moment of application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentDetail {
    pub id: i64,
    pub debt_item_id: i64,
    pub debt_reason: String,
    pub debt_type_name: String,
    pub amount_applied: f64,
    pub previous_balance: Option<f64>,
    pub new_balance: Option<f64>,
    pub notes: Option<String>,
}

/// A server-confirmed record of money received. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: i64,
    pub neighbor_id: i64,
    pub neighbor_name: String,
    pub neighbor_ci: String,
    pub payment_date: NaiveDate,
    pub total_amount: f64,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub received_by: Option<String>,
    pub notes: Option<String>,
    pub payment_details: Vec<PaymentDetail>,
}

impl Payment {
    /// Sum of the per-debt allocations; must equal `total_amount`.
    pub fn details_total(&self) -> f64 {
        self.payment_details.iter().map(|d| d.amount_applied).sum()
    }
}
