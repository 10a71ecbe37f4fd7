// src/tests/receipt_tests.rs

use chrono::NaiveDate;

use crate::models::{Payment, PaymentDetail, PaymentMethod};
use crate::receipt::{self, Receipt, format_currency, receipt_number, verify_token};

fn detail(id: i64, debt_item_id: i64, reason: &str, amount: f64) -> PaymentDetail {
    PaymentDetail {
        id,
        debt_item_id,
        debt_reason: reason.to_string(),
        debt_type_name: "Cuota".to_string(),
        amount_applied: amount,
        previous_balance: Some(amount),
        new_balance: Some(0.0),
        notes: None,
    }
}

fn confirmed_payment() -> Payment {
    Payment {
        id: 7,
        neighbor_id: 1,
        neighbor_name: "Maria Flores".to_string(),
        neighbor_ci: "1234567".to_string(),
        payment_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        total_amount: 80.0,
        payment_method: Some(PaymentMethod::Transfer),
        reference_number: Some("TRX-0042".to_string()),
        received_by: Some("Ana Quispe".to_string()),
        notes: None,
        payment_details: vec![
            detail(1, 1, "Cuota mensual", 50.0),
            detail(2, 2, "Multa inasistencia", 30.0),
        ],
    }
}

#[test]
fn currency_is_fixed_two_decimals() {
    assert_eq!(format_currency(80.0), "Bs. 80.00");
    assert_eq!(format_currency(0.5), "Bs. 0.50");
    assert_eq!(format_currency(1234.567), "Bs. 1234.57");
}

#[test]
fn receipt_numbers_are_zero_padded() {
    assert_eq!(receipt_number(7), "00007");
    assert_eq!(receipt_number(12345), "12345");
    assert_eq!(receipt_number(123456), "123456");
}

#[test]
fn render_is_deterministic() {
    let payment = confirmed_payment();
    let first = Receipt::from_payment(&payment, &payment.neighbor_name).render();
    let second = Receipt::from_payment(&payment, &payment.neighbor_name).render();
    assert_eq!(first, second);
}

#[test]
fn render_carries_the_fixed_layout() {
    let payment = confirmed_payment();
    let receipt = Receipt::from_payment(&payment, &payment.neighbor_name);
    assert_eq!(receipt.number, "00007");

    let doc = receipt.render();
    assert!(doc.starts_with("OTB MIRAFLORES\nRECIBO DE COBRO\n"));
    assert!(doc.contains("Recibo No: 00007    Fecha: 15/03/2025"));
    assert!(doc.contains("Recibí de: Maria Flores"));
    assert!(doc.contains("CI: 1234567"));
    assert!(doc.contains("  - Cuota mensual  Bs. 50.00"));
    assert!(doc.contains("  - Multa inasistencia  Bs. 30.00"));
    assert!(doc.contains("TOTAL: Bs. 80.00"));
    assert!(doc.contains("Método de pago: Transferencia"));
    assert!(doc.contains("Referencia: TRX-0042"));
    assert!(doc.ends_with("Recibido por: Ana Quispe\n"));

    // Detail lines appear in payment order.
    let cuota = doc.find("Cuota mensual").unwrap();
    let multa = doc.find("Multa inasistencia").unwrap();
    assert!(cuota < multa);
}

#[test]
fn render_without_reference_or_signer_uses_the_placeholder() {
    let mut payment = confirmed_payment();
    payment.payment_method = Some(PaymentMethod::Cash);
    payment.reference_number = None;
    payment.received_by = None;

    let doc = Receipt::from_payment(&payment, &payment.neighbor_name).render();
    assert!(doc.contains("Método de pago: Efectivo"));
    assert!(!doc.contains("Referencia:"));
    assert!(doc.ends_with("Recibido por: _______________\n"));
}

#[test]
fn token_verifies_against_the_stored_payment() {
    let payment = confirmed_payment();
    let receipt = Receipt::from_payment(&payment, &payment.neighbor_name);
    assert!(verify_token(&receipt.token, &payment));
}

#[test]
fn token_rejects_a_tampered_payment() {
    let payment = confirmed_payment();
    let receipt = Receipt::from_payment(&payment, &payment.neighbor_name);

    let mut altered = payment.clone();
    altered.total_amount = 90.0;
    assert!(!verify_token(&receipt.token, &altered));

    let mut renumbered = payment.clone();
    renumbered.id = 8;
    assert!(!verify_token(&receipt.token, &renumbered));
}

#[test]
fn token_rejects_garbage() {
    let payment = confirmed_payment();
    assert!(!verify_token("not base64!", &payment));
    assert!(!verify_token("aGVsbG8=", &payment)); // valid base64, not a payload
}

#[test]
fn dates_render_day_month_year() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    assert_eq!(receipt::format_date(date), "02/01/2025");
}
