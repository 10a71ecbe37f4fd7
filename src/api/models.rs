use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenCollectRequest {
    pub collect_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectNeighborRequest {
    pub neighbor_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AllocatedAmountRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResponse {
    pub selected: bool,
    pub total_amount: f64,
}

// Error response struct
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
