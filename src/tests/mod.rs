mod receipt_tests;
mod submission_tests;

use crate::client::in_memory::InMemoryCollectApi;
use crate::models::{DebtItem, DebtStatus, Neighbor};
use crate::service::RecaudaService;

pub fn create_test_service() -> RecaudaService<InMemoryCollectApi> {
    let _ = env_logger::builder().is_test(true).try_init();
    RecaudaService::new(InMemoryCollectApi::new(), "test-secret".to_string())
}

pub fn neighbor(id: i64, first_name: &str, last_name: &str, ci: &str) -> Neighbor {
    Neighbor {
        id,
        first_name: first_name.to_string(),
        second_name: None,
        last_name: last_name.to_string(),
        ci: ci.to_string(),
    }
}

pub fn debt(id: i64, reason: &str, amount: f64) -> DebtItem {
    DebtItem {
        id,
        debt_type_name: "Cuota".to_string(),
        reason: reason.to_string(),
        period: None,
        amount,
        balance: amount,
        status: DebtStatus::Pending,
    }
}

/// Seeds two neighbors: Maria (debts 1 and 2) and Jorge (debt 3).
pub async fn seed_roster(service: &RecaudaService<InMemoryCollectApi>) {
    service
        .api
        .seed_neighbor(neighbor(1, "Maria", "Flores", "1234567"))
        .await;
    service
        .api
        .seed_neighbor(neighbor(2, "Jorge", "Mamani", "7654321"))
        .await;
    service.api.seed_debt(1, debt(1, "Cuota mensual", 50.0)).await;
    service.api.seed_debt(1, debt(2, "Multa inasistencia", 30.0)).await;
    service.api.seed_debt(2, debt(3, "Cuota agua", 25.0)).await;
}
