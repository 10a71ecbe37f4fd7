use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;
use std::sync::Arc;

use crate::{
    api::models::{
        AllocatedAmountRequest, ErrorResponse, LoginRequest, LoginResponse, OpenCollectRequest,
        SelectNeighborRequest, ToggleResponse,
    },
    client::http::HttpCollectApi,
    error::RecaudaError,
    models::{DebtItem, Neighbor, Payment},
    service::{PaymentInput, RecaudaService, SessionView, SubmissionOutcome},
};

// Newtype wrapper for RecaudaError to implement IntoResponse
pub struct ApiError(RecaudaError);

impl From<RecaudaError> for ApiError {
    fn from(err: RecaudaError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            RecaudaError::CollectNotOpen
            | RecaudaError::NoNeighborSelected
            | RecaudaError::DebtNotSelected(_)
            | RecaudaError::EmptySelection
            | RecaudaError::NonPositiveTotal(_)
            | RecaudaError::InvalidAllocation { .. }
            | RecaudaError::AmountTooLarge(_) => StatusCode::BAD_REQUEST,
            RecaudaError::NeighborNotFound(_) | RecaudaError::DebtNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RecaudaError::SubmissionInFlight => StatusCode::CONFLICT,
            RecaudaError::InvalidCredentials | RecaudaError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            RecaudaError::NetworkError(_)
            | RecaudaError::UnexpectedStatus(_)
            | RecaudaError::ReconciliationFailed(_)
            | RecaudaError::TotalMismatch { .. } => StatusCode::BAD_GATEWAY,
            RecaudaError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Middleware to validate the operator session token
async fn auth_middleware(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| RecaudaError::InvalidToken("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| RecaudaError::InvalidToken("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Define console routes
pub fn api_routes(service: Arc<RecaudaService<HttpCollectApi>>) -> Router {
    let protected_routes = Router::new()
        .route("/neighbors", axum::routing::get(list_neighbors))
        .route("/session", axum::routing::get(get_session))
        .route("/session/collect", axum::routing::post(open_collect))
        .route("/session/neighbor", axum::routing::post(select_neighbor))
        .route("/session/debts", axum::routing::get(reload_debts))
        .route(
            "/session/debts/{debt_id}/toggle",
            axum::routing::post(toggle_debt),
        )
        .route(
            "/session/debts/{debt_id}/amount",
            axum::routing::put(set_allocated_amount),
        )
        .route(
            "/session/selection",
            axum::routing::delete(discard_selection),
        )
        .route(
            "/session/payments",
            axum::routing::post(submit_payment).get(list_payments),
        )
        .route_layer(middleware::from_fn_with_state(
            service.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/login", axum::routing::post(login))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub(crate) async fn login(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = service.authenticate(&req.username, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(
    get,
    path = "/neighbors",
    responses(
        (status = 200, description = "Neighbor roster", body = [Neighbor]),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn list_neighbors(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
) -> Result<Json<Vec<Neighbor>>, ApiError> {
    let neighbors = service.list_neighbors().await?;
    Ok(Json(neighbors))
}

#[utoipa::path(
    post,
    path = "/session/collect",
    request_body = OpenCollectRequest,
    responses(
        (status = 200, description = "Session opened, payment history returned", body = [Payment]),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn open_collect(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
    Json(req): Json<OpenCollectRequest>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = service.open_collect(req.collect_id).await?;
    Ok(Json(payments))
}

#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current session snapshot", body = SessionView))
)]
pub(crate) async fn get_session(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
) -> Json<SessionView> {
    Json(service.session_view().await)
}

#[utoipa::path(
    post,
    path = "/session/neighbor",
    request_body = SelectNeighborRequest,
    responses(
        (status = 200, description = "Neighbor selected, active debts returned", body = [DebtItem]),
        (status = 404, description = "Neighbor not found", body = ErrorResponse)
    )
)]
pub(crate) async fn select_neighbor(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
    Json(req): Json<SelectNeighborRequest>,
) -> Result<Json<Vec<DebtItem>>, ApiError> {
    let debts = service.select_neighbor(req.neighbor_id).await?;
    Ok(Json(debts))
}

#[utoipa::path(
    get,
    path = "/session/debts",
    responses(
        (status = 200, description = "Active debts refreshed", body = [DebtItem]),
        (status = 400, description = "No neighbor selected", body = ErrorResponse)
    )
)]
pub(crate) async fn reload_debts(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
) -> Result<Json<Vec<DebtItem>>, ApiError> {
    let debts = service.reload_debts().await?;
    Ok(Json(debts))
}

#[utoipa::path(
    post,
    path = "/session/debts/{debt_id}/toggle",
    params(("debt_id" = i64, Path, description = "Debt item id")),
    responses(
        (status = 200, description = "Selection toggled", body = ToggleResponse),
        (status = 404, description = "Debt not among active debts", body = ErrorResponse)
    )
)]
pub(crate) async fn toggle_debt(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
    Path(debt_id): Path<i64>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let selected = service.toggle_debt(debt_id).await?;
    let total_amount = service.total_amount().await;
    Ok(Json(ToggleResponse {
        selected,
        total_amount,
    }))
}

#[utoipa::path(
    put,
    path = "/session/debts/{debt_id}/amount",
    params(("debt_id" = i64, Path, description = "Debt item id")),
    request_body = AllocatedAmountRequest,
    responses(
        (status = 200, description = "Amount updated", body = ToggleResponse),
        (status = 400, description = "Debt not selected", body = ErrorResponse)
    )
)]
pub(crate) async fn set_allocated_amount(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
    Path(debt_id): Path<i64>,
    Json(req): Json<AllocatedAmountRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    service.set_allocated_amount(debt_id, req.amount).await?;
    let total_amount = service.total_amount().await;
    Ok(Json(ToggleResponse {
        selected: true,
        total_amount,
    }))
}

#[utoipa::path(
    delete,
    path = "/session/selection",
    responses((status = 200, description = "Selection discarded"))
)]
pub(crate) async fn discard_selection(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
) -> Result<StatusCode, ApiError> {
    service.discard_selection().await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/session/payments",
    request_body = PaymentInput,
    responses(
        (status = 200, description = "Payment recorded", body = SubmissionOutcome),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Submission already in flight", body = ErrorResponse),
        (status = 502, description = "Backend unavailable, selection preserved", body = ErrorResponse)
    )
)]
pub(crate) async fn submit_payment(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
    Json(input): Json<PaymentInput>,
) -> Result<Json<SubmissionOutcome>, ApiError> {
    let outcome = service.submit_payment(input).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/session/payments",
    responses(
        (status = 200, description = "Payment history", body = [Payment]),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
pub(crate) async fn list_payments(
    State(service): State<Arc<RecaudaService<HttpCollectApi>>>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = service.refresh_payments().await?;
    Ok(Json(payments))
}
