//! Customer route handlers.
//!
//! Same scoping rule as orders: a principal only ever sees their own
//! profile, and anyone else's ID is a 404.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use duka_core::{AccountCode, CustomerId, Phone};

use crate::db::customers::CustomerRepository;
use crate::error::{ApiError, FieldErrors, Result};
use crate::middleware::CurrentUser;
use crate::models::Customer;
use crate::state::AppState;

/// Request body for `POST /customers`.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub phone: String,
    pub code: String,
}

/// Request body for `PUT|PATCH /customers/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub phone: Option<String>,
    pub code: Option<String>,
}

fn parse_phone(raw: &str) -> Result<Phone> {
    Phone::parse(raw)
        .map_err(|e| ApiError::Validation(FieldErrors::single("phone", e.to_string())))
}

fn parse_code(raw: &str) -> Result<AccountCode> {
    AccountCode::parse(raw)
        .map_err(|e| ApiError::Validation(FieldErrors::single("code", e.to_string())))
}

/// `GET /customers`
///
/// Lists the customers visible to the caller: their own profile, or nothing.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Customer>>> {
    let customers = CustomerRepository::new(state.pool()).list(user.scope()).await?;
    Ok(Json(customers))
}

/// `POST /customers`
///
/// Creates the caller's profile when their account predates one.
/// Registration normally creates user and customer together.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    let phone = parse_phone(&body.phone)?;
    let code = parse_code(&body.code)?;

    let customer = CustomerRepository::new(state.pool())
        .create(user.scope(), &phone, &code)
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// `GET /customers/{id}`
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>> {
    let customer = CustomerRepository::new(state.pool())
        .get(user.scope(), id)
        .await?;
    Ok(Json(customer))
}

/// `PUT|PATCH /customers/{id}`
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<CustomerId>,
    Json(body): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>> {
    let phone = body.phone.as_deref().map(parse_phone).transpose()?;
    let code = body.code.as_deref().map(parse_code).transpose()?;

    let customer = CustomerRepository::new(state.pool())
        .update(user.scope(), id, phone.as_ref(), code.as_ref())
        .await?;
    Ok(Json(customer))
}

/// `DELETE /customers/{id}`
///
/// Deletes the profile and all its orders in one transaction.
pub async fn destroy(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<CustomerId>,
) -> Result<StatusCode> {
    CustomerRepository::new(state.pool())
        .delete(user.scope(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
