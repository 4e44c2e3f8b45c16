use serde::{Deserialize, Serialize};

/// A shop customer. Phone numbers are stored as strings (they arrive from
/// messaging platforms with country prefixes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}
