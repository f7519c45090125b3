//! Order route handlers.
//!
//! All handlers require a bearer access token and run against the
//! principal's ownership scope. A cross-owner order ID behaves exactly like
//! a missing one: 404.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use duka_core::OrderId;

use crate::db::users::UserRepository;
use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Request body for `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub item: String,
    pub amount: Decimal,
}

/// Request body for `PUT|PATCH /orders/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub item: Option<String>,
    pub amount: Option<Decimal>,
}

/// `GET /orders`
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Vec<Order>>> {
    let service = OrderService::new(state.pool(), state.notifier());
    let orders = service.list(user.scope()).await?;
    Ok(Json(orders))
}

/// `POST /orders`
///
/// Places the order and dispatches the SMS receipt. The response reflects
/// whatever SMS state was reached; a failed receipt is still a 201.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    // The SMS greeting uses the login handle as the display name.
    let identity = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let service = OrderService::new(state.pool(), state.notifier());
    let order = service
        .place_order(user.scope(), &identity.username, &body.item, body.amount)
        .await?;

    tracing::info!(
        order_id = %order.id,
        sms_status = %order.sms_status,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.pool(), state.notifier());
    let order = service.get(user.scope(), id).await?;
    Ok(Json(order))
}

/// `PUT|PATCH /orders/{id}`
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderRequest>,
) -> Result<Json<Order>> {
    let service = OrderService::new(state.pool(), state.notifier());
    let order = service
        .update(user.scope(), id, body.item.as_deref(), body.amount)
        .await?;
    Ok(Json(order))
}

/// `DELETE /orders/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    let service = OrderService::new(state.pool(), state.notifier());
    service.delete(user.scope(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
