use utoipa::OpenApi;

use crate::{
    api::models::{
        AllocatedAmountRequest, ErrorResponse, LoginRequest, LoginResponse, OpenCollectRequest,
        SelectNeighborRequest, ToggleResponse,
    },
    client::{DebtItemCharge, NewPayment},
    error::RecaudaError,
    models::{DebtItem, DebtStatus, Neighbor, Payment, PaymentDetail, PaymentMethod},
    receipt::{Receipt, ReceiptLine},
    selection::{Allocation, PaymentSelection},
    service::{PaymentInput, SessionView, SubmissionOutcome},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::login,
        super::handlers::list_neighbors,
        super::handlers::open_collect,
        super::handlers::get_session,
        super::handlers::select_neighbor,
        super::handlers::reload_debts,
        super::handlers::toggle_debt,
        super::handlers::set_allocated_amount,
        super::handlers::discard_selection,
        super::handlers::submit_payment,
        super::handlers::list_payments
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        OpenCollectRequest,
        SelectNeighborRequest,
        AllocatedAmountRequest,
        ToggleResponse,
        ErrorResponse,
        Neighbor,
        DebtItem,
        DebtStatus,
        Payment,
        PaymentDetail,
        PaymentMethod,
        DebtItemCharge,
        NewPayment,
        Allocation,
        PaymentSelection,
        PaymentInput,
        SessionView,
        SubmissionOutcome,
        Receipt,
        ReceiptLine,
        RecaudaError
    )),
    info(
        title = "Recauda Console API",
        description = "Admin console for neighborhood debt collection and receipts",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
