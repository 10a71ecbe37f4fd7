use async_trait::async_trait;
use log::warn;
use reqwest::Client;

use crate::client::{
    ActiveDebtsResponse, CollectApi, NeighborListResponse, NewPayment, PaymentItemsBody,
};
use crate::error::RecaudaError;
use crate::models::{DebtItem, Neighbor, Payment};

impl From<reqwest::Error> for RecaudaError {
    fn from(err: reqwest::Error) -> Self {
        RecaudaError::NetworkError(err.to_string())
    }
}

/// `CollectApi` implementation backed by the real HTTP backend.
pub struct HttpCollectApi {
    client: Client,
    base_url: String,
}

impl HttpCollectApi {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check_status(response: &reqwest::Response) -> Result<(), RecaudaError> {
        let status = response.status();
        if !status.is_success() {
            warn!("Backend returned {} for {}", status, response.url());
            return Err(RecaudaError::UnexpectedStatus(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl CollectApi for HttpCollectApi {
    async fn list_neighbors(&self) -> Result<Vec<Neighbor>, RecaudaError> {
        let response = self.client.get(self.url("/neighbors/")).send().await?;
        Self::check_status(&response)?;
        let body: NeighborListResponse = response.json().await?;
        Ok(body.data)
    }

    async fn fetch_active_debts(&self, neighbor_id: i64) -> Result<Vec<DebtItem>, RecaudaError> {
        let response = self
            .client
            .get(self.url(&format!("/neighbors/{}/debts/active", neighbor_id)))
            .send()
            .await?;
        Self::check_status(&response)?;
        let body: ActiveDebtsResponse = response.json().await?;
        Ok(body.debt_details)
    }

    async fn create_payment(
        &self,
        collect_id: i64,
        payment: &NewPayment,
    ) -> Result<Payment, RecaudaError> {
        let mut query: Vec<(&str, String)> = vec![
            ("neighbor_id", payment.neighbor_id.to_string()),
            ("total_amount", format!("{:.2}", payment.total_amount)),
            ("payment_method", payment.payment_method.as_str().to_string()),
        ];
        if let Some(reference) = &payment.reference_number {
            query.push(("reference_number", reference.clone()));
        }
        if let Some(received_by) = &payment.received_by {
            query.push(("received_by", received_by.clone()));
        }
        if let Some(notes) = &payment.notes {
            query.push(("notes", notes.clone()));
        }

        let body = PaymentItemsBody {
            debt_items: payment.debt_items.clone(),
        };
        let response = self
            .client
            .post(self.url(&format!("/collect-debts/{}/payments", collect_id)))
            .query(&query)
            .json(&body)
            .send()
            .await?;
        Self::check_status(&response)?;
        Ok(response.json().await?)
    }

    async fn list_payments(&self, collect_id: i64) -> Result<Vec<Payment>, RecaudaError> {
        let response = self
            .client
            .get(self.url(&format!("/collect-debts/{}/payments", collect_id)))
            .send()
            .await?;
        Self::check_status(&response)?;
        Ok(response.json().await?)
    }
}
