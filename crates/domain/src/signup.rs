//! Signup request and its validation rules.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The input to one provisioning attempt.
///
/// All fields except `website_url` and `phone` are required; missing
/// required fields fail validation before any side effect occurs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub business_name: String,
    pub business_description: String,
    pub website_url: Option<String>,
    pub owner_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub category: String,
    pub plan_id: String,
}

impl SignupRequest {
    /// Validates required fields, failing fast on the first problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("business_name", &self.business_name),
            ("business_description", &self.business_description),
            ("owner_name", &self.owner_name),
            ("email", &self.email),
            ("password", &self.password),
            ("category", &self.category),
            ("plan_id", &self.plan_id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }

        // A full RFC-compliant check belongs to the identity provider;
        // this only rejects obviously malformed addresses.
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ValidationError::InvalidEmail(email.to_string())),
        }
    }
}
