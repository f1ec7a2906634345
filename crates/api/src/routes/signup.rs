//! Business signup endpoint.

use std::sync::Arc;

use account_store::AccountRepository;
use axum::Json;
use axum::extract::State;
use domain::SignupRequest;
use saga::ProvisioningSaga;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R: AccountRepository> {
    pub saga: ProvisioningSaga<R>,
}

// -- Request types --

/// Missing fields deserialize as empty strings so validation can report
/// which field is absent instead of a bare deserialization error.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SignupBody {
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

// -- Response types --

#[derive(Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub user_id: String,
    pub business_id: String,
    pub slug: String,
    pub message: &'static str,
}

// -- Handlers --

/// POST /signup — provision a business account.
#[tracing::instrument(skip(state, body), fields(email = %body.email))]
pub async fn create<R: AccountRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(body): Json<SignupBody>,
) -> Result<(axum::http::StatusCode, Json<SignupResponse>), ApiError> {
    let request = SignupRequest {
        business_name: body.business_name,
        business_description: body.business_description,
        website_url: body.website_url,
        owner_name: body.owner_name,
        email: body.email,
        phone: body.phone,
        password: body.password,
        category: body.category,
        plan_id: body.plan_id,
    };

    let result = state.saga.run(request).await?;

    let response = SignupResponse {
        success: true,
        user_id: result.identity_id.to_string(),
        business_id: result.business_id.to_string(),
        slug: result.slug,
        message: "Business account created",
    };

    Ok((axum::http::StatusCode::CREATED, Json(response)))
}
