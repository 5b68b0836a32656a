use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_shared::Masked;

use crate::{CoreError, CoreResult, CustomerId};

/// A customer as seen by order placement: a lookup target, never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Masked<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> CoreResult<Self> {
        let name = name.into().trim().to_string();
        let email = email.into().trim().to_lowercase();

        if name.is_empty() {
            return Err(CoreError::ValidationError("customer name is required".to_string()));
        }
        if !is_plausible_email(&email) {
            return Err(CoreError::ValidationError("customer email is invalid".to_string()));
        }

        Ok(Self {
            id: CustomerId::new(),
            name,
            email: Masked::new(email),
            created_at: Utc::now(),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
