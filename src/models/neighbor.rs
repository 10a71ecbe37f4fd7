use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Neighbor {
    pub id: i64,
    pub first_name: String,
    pub second_name: Option<String>,
    pub last_name: String,
    /// National identity card number, printed on receipts.
    pub ci: String,
}

impl Neighbor {
    pub fn full_name(&self) -> String {
        match &self.second_name {
            Some(second) if !second.is_empty() => {
                format!("{} {} {}", self.first_name, second, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}
