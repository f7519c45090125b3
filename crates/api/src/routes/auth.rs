//! Auth route handlers: registration, login, token refresh, profile.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use duka_core::{CustomerId, UserId};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{Customer, User};
use crate::services::auth::{AuthService, Registration, TokenPair};
use crate::state::AppState;

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub phone: String,
    pub code: String,
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserBody {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Response body for `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserBody,
    pub access: String,
    pub refresh: String,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let service = AuthService::new(state.pool(), state.jwt());

    let registration = Registration {
        username: body.username,
        email: body.email,
        password: body.password,
        password2: body.password2,
        phone: body.phone,
        code: body.code,
    };

    let (user, _customer, pair) = service.register(&registration).await?;

    tracing::info!(user_id = %user.id, "new registration");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: user.into(),
            access: pair.access,
            refresh: pair.refresh,
        }),
    ))
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>> {
    let service = AuthService::new(state.pool(), state.jwt());
    let (_user, pair) = service.login(&body.username, &body.password).await?;
    Ok(Json(pair))
}

/// Request body for `POST /auth/token/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response body for `POST /auth/token/refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// `POST /auth/token/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let service = AuthService::new(state.pool(), state.jwt());
    let access = service.refresh(&body.refresh)?;
    Ok(Json(RefreshResponse { access }))
}

/// Embedded customer profile in the `/auth/me` response.
#[derive(Debug, Serialize)]
pub struct CustomerBody {
    pub id: CustomerId,
    pub phone: String,
    pub code: String,
}

impl From<Customer> for CustomerBody {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            phone: customer.phone.into_inner(),
            code: customer.code.into_inner(),
        }
    }
}

/// Response body for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub customer: Option<CustomerBody>,
}

/// `GET /auth/me`
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<ProfileResponse>> {
    let service = AuthService::new(state.pool(), state.jwt());
    let (user, customer) = service.profile(user.id).await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        customer: customer.map(Into::into),
    }))
}
