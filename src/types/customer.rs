//! Customer record
//!
//! Customers are plain data; the ledger only needs to know that one exists
//! before opening an account for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer identifier
pub type CustomerId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub registered_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Customer {
            id: Uuid::new_v4(),
            name: name.into(),
            registered_at: Utc::now(),
        }
    }
}
