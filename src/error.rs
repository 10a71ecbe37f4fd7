use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Coarse classification used to pick notification severity and HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Local precondition failure; never reaches the network.
    Validation,
    /// Operator session problem (bad credentials, bad token).
    Auth,
    /// The backend request failed or returned a non-success status.
    Network,
    /// Post-success refetch failed or the server disagreed with the client.
    Reconciliation,
    /// Unexpected internal failure.
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize, ToSchema)]
pub enum RecaudaError {
    /// No collection session has been opened
    #[error("No collection session is open")]
    CollectNotOpen,

    /// Neighbor with given ID not found in the roster
    #[error("Neighbor {0} not found")]
    NeighborNotFound(i64),

    /// A payment operation was attempted without a selected neighbor
    #[error("No neighbor selected")]
    NoNeighborSelected,

    /// Debt item is not part of the loaded active debts
    #[error("Debt item {0} not found among active debts")]
    DebtNotFound(i64),

    /// Amount assigned to a debt that is not currently selected
    #[error("Debt item {0} is not selected")]
    DebtNotSelected(i64),

    /// Submission attempted with no debts selected
    #[error("No debt items selected")]
    EmptySelection,

    /// Submission attempted with a non-positive total
    #[error("Total amount must be greater than 0, got {0}")]
    NonPositiveTotal(f64),

    /// A selected debt carries a non-positive allocated amount
    #[error("Invalid amount {amount} allocated to debt item {debt_item_id}")]
    InvalidAllocation { debt_item_id: i64, amount: f64 },

    /// Payment total exceeds the accepted maximum
    #[error("Total amount {0} exceeds the accepted maximum")]
    AmountTooLarge(f64),

    /// Another submission for this session is still pending
    #[error("A payment submission is already in flight")]
    SubmissionInFlight,

    /// Login credentials did not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session token missing, malformed or expired
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// The backend request could not be completed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The backend answered with a non-success status
    #[error("Backend returned status {0}")]
    UnexpectedStatus(u16),

    /// Refetching authoritative state after a successful payment failed
    #[error("Reconciliation failed: {0}")]
    ReconciliationFailed(String),

    /// Server-confirmed total differs from the client-computed total
    #[error("Server total {server} differs from client total {client}")]
    TotalMismatch { client: f64, server: f64 },

    /// Catch-all for unexpected failures
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl RecaudaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecaudaError::CollectNotOpen
            | RecaudaError::NeighborNotFound(_)
            | RecaudaError::NoNeighborSelected
            | RecaudaError::DebtNotFound(_)
            | RecaudaError::DebtNotSelected(_)
            | RecaudaError::EmptySelection
            | RecaudaError::NonPositiveTotal(_)
            | RecaudaError::InvalidAllocation { .. }
            | RecaudaError::AmountTooLarge(_)
            | RecaudaError::SubmissionInFlight => ErrorKind::Validation,
            RecaudaError::InvalidCredentials | RecaudaError::InvalidToken(_) => ErrorKind::Auth,
            RecaudaError::NetworkError(_) | RecaudaError::UnexpectedStatus(_) => ErrorKind::Network,
            RecaudaError::ReconciliationFailed(_) | RecaudaError::TotalMismatch { .. } => {
                ErrorKind::Reconciliation
            }
            RecaudaError::InternalServerError(_) => ErrorKind::Internal,
        }
    }

    /// A retryable failure left no partial state behind.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }
}
