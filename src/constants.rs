/// Tolerance used when comparing monetary amounts held as f64.
pub const AMOUNT_TOLERANCE: f64 = 0.005;

/// Upper bound accepted for a single payment total.
pub const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Organization header printed on every receipt.
pub const ORG_NAME: &str = "OTB MIRAFLORES";

/// Receipt document title.
pub const RECEIPT_TITLE: &str = "RECIBO DE COBRO";

/// Fixed prefix for rendered currency amounts.
pub const CURRENCY_PREFIX: &str = "Bs.";

/// Width of the zero-padded receipt number.
pub const RECEIPT_NUMBER_WIDTH: usize = 5;

/// Placeholder printed on the signature line when no receiver was recorded.
pub const SIGNATURE_PLACEHOLDER: &str = "_______________";

/// Date format used on receipts (dd/mm/yyyy).
pub const RECEIPT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Lifetime of an operator session token, in seconds.
pub const SESSION_TTL_SECS: usize = 3600;
