//! Accounts domain types

use std::fmt;

use async_graphql::{Object, SimpleObject, ID};
use serde::{Deserialize, Serialize};

use crate::repository::Keyed;

/// A user owned by the accounts subgraph
///
/// Federated on `id`: any other subgraph may reference a `User` by id alone.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ID,
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
}

impl Keyed for User {
    fn key(&self) -> &ID {
        &self.id
    }
}

/// Customer standing
///
/// `ACTIVE` and `ON_HOLD` are the known values; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CustomerStatus {
    Active,
    OnHold,
    Other(String),
}

impl CustomerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CustomerStatus::Active => "ACTIVE",
            CustomerStatus::OnHold => "ON_HOLD",
            CustomerStatus::Other(value) => value,
        }
    }
}

impl From<String> for CustomerStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACTIVE" => CustomerStatus::Active,
            "ON_HOLD" => CustomerStatus::OnHold,
            _ => CustomerStatus::Other(value),
        }
    }
}

impl From<&str> for CustomerStatus {
    fn from(value: &str) -> Self {
        CustomerStatus::from(value.to_string())
    }
}

impl From<CustomerStatus> for String {
    fn from(status: CustomerStatus) -> Self {
        match status {
            CustomerStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer record from the read-only catalog
///
/// Only [`Customer::new`] builds one, so every record has passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    id: ID,
    name: String,
    status: CustomerStatus,
    credit_limit: Option<f64>,
}

impl Customer {
    /// Build a customer record, rejecting negative or non-finite credit limits
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        status: impl Into<CustomerStatus>,
        credit_limit: Option<f64>,
    ) -> crate::Result<Self> {
        let id = ID(id.into());
        if let Some(limit) = credit_limit {
            if !limit.is_finite() || limit < 0.0 {
                return Err(crate::SubgraphError::InvalidRecord(format!(
                    "customer {} has invalid credit limit {}",
                    id.as_str(),
                    limit
                )));
            }
        }

        Ok(Self {
            id,
            name: name.into(),
            status: status.into(),
            credit_limit,
        })
    }

    pub fn status_kind(&self) -> &CustomerStatus {
        &self.status
    }
}

impl Keyed for Customer {
    fn key(&self) -> &ID {
        &self.id
    }
}

#[Object]
impl Customer {
    async fn id(&self) -> &ID {
        &self.id
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn status(&self) -> &str {
        self.status.as_str()
    }

    async fn credit_limit(&self) -> Option<f64> {
        self.credit_limit
    }
}
