use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use utoipa::ToSchema;

use crate::constants::{
    CURRENCY_PREFIX, ORG_NAME, RECEIPT_DATE_FORMAT, RECEIPT_NUMBER_WIDTH, RECEIPT_TITLE,
    SIGNATURE_PLACEHOLDER,
};
use crate::models::Payment;

/// Fixed two-decimal rendering with the `Bs.` prefix. No locale separators.
pub fn format_currency(amount: f64) -> String {
    format!("{} {:.2}", CURRENCY_PREFIX, amount)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(RECEIPT_DATE_FORMAT).to_string()
}

/// Zero-padded receipt number derived from the payment id.
pub fn receipt_number(payment_id: i64) -> String {
    format!("{:0width$}", payment_id, width = RECEIPT_NUMBER_WIDTH)
}

/// Payload of the machine-readable token printed on a receipt. Re-derivable
/// from the stored payment, so a scanned receipt can be checked against the
/// record. A verification aid, not a security mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TokenPayload {
    receipt_number: String,
    total: String,
}

impl TokenPayload {
    fn for_payment(payment: &Payment) -> Self {
        TokenPayload {
            receipt_number: receipt_number(payment.id),
            total: format_currency(payment.total_amount),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ReceiptLine {
    pub reason: String,
    pub amount: f64,
}

/// Printable summary of a confirmed payment. Regenerating a receipt from the
/// same payment reproduces the same visible text byte for byte.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Receipt {
    pub number: String,
    pub date: NaiveDate,
    pub neighbor_name: String,
    pub neighbor_ci: String,
    pub lines: Vec<ReceiptLine>,
    pub total: f64,
    pub payment_method_label: Option<String>,
    pub reference_number: Option<String>,
    pub received_by: Option<String>,
    /// Base64-encoded `TokenPayload`; decodable, not byte-stable by contract.
    pub token: String,
}

impl Receipt {
    pub fn from_payment(payment: &Payment, neighbor_name: &str) -> Self {
        debug!("Generating receipt for payment {}", payment.id);
        let lines = payment
            .payment_details
            .iter()
            .map(|detail| ReceiptLine {
                reason: detail.debt_reason.clone(),
                amount: detail.amount_applied,
            })
            .collect();

        Receipt {
            number: receipt_number(payment.id),
            date: payment.payment_date,
            neighbor_name: neighbor_name.to_string(),
            neighbor_ci: payment.neighbor_ci.clone(),
            lines,
            total: payment.total_amount,
            payment_method_label: payment.payment_method.map(|m| m.label().to_string()),
            reference_number: payment.reference_number.clone(),
            received_by: payment.received_by.clone(),
            token: encode_token(payment),
        }
    }

    /// Renders the fixed-layout document. Field order is part of the
    /// contract: header, title, number and date, neighbor, detail lines,
    /// total, method, reference, signature.
    pub fn render(&self) -> String {
        let mut doc = String::new();
        let _ = writeln!(doc, "{}", ORG_NAME);
        let _ = writeln!(doc, "{}", RECEIPT_TITLE);
        doc.push('\n');
        let _ = writeln!(
            doc,
            "Recibo No: {}    Fecha: {}",
            self.number,
            format_date(self.date)
        );
        let _ = writeln!(doc, "{}", "-".repeat(40));
        let _ = writeln!(doc, "Recibí de: {}", self.neighbor_name);
        let _ = writeln!(doc, "CI: {}", self.neighbor_ci);
        let _ = writeln!(doc, "Detalle de Pagos:");
        for line in &self.lines {
            let _ = writeln!(doc, "  - {}  {}", line.reason, format_currency(line.amount));
        }
        let _ = writeln!(doc, "{}", "-".repeat(40));
        let _ = writeln!(doc, "TOTAL: {}", format_currency(self.total));
        if let Some(label) = &self.payment_method_label {
            let _ = writeln!(doc, "Método de pago: {}", label);
        }
        if let Some(reference) = &self.reference_number {
            let _ = writeln!(doc, "Referencia: {}", reference);
        }
        doc.push('\n');
        let _ = writeln!(doc, "{}", "_".repeat(32));
        let _ = writeln!(
            doc,
            "Recibido por: {}",
            self.received_by.as_deref().unwrap_or(SIGNATURE_PLACEHOLDER)
        );
        doc
    }
}

fn encode_token(payment: &Payment) -> String {
    let payload = TokenPayload::for_payment(payment);
    // Serializing a two-string struct cannot fail.
    let bytes = serde_json::to_vec(&payload).unwrap_or_default();
    STANDARD.encode(bytes)
}

/// Checks a scanned token against the stored payment record by re-deriving
/// the payload from the payment.
pub fn verify_token(token: &str, payment: &Payment) -> bool {
    let Ok(bytes) = STANDARD.decode(token) else {
        return false;
    };
    let Ok(payload) = serde_json::from_slice::<TokenPayload>(&bytes) else {
        return false;
    };
    payload == TokenPayload::for_payment(payment)
}
