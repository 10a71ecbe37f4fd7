pub mod debt;
pub mod neighbor;
pub mod payment;

pub use debt::{DebtItem, DebtStatus};
pub use neighbor::Neighbor;
pub use payment::{Payment, PaymentDetail, PaymentMethod};
