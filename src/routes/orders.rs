use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use crate::{
    app_error::{AppError, ErrorBody, StdResponse},
    app_state::AppState,
    models::{Order, OrderDetails},
    params::OrderParams,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_order, get_orders))
        .routes(routes!(get_order))
}

/// Book a theatre slot for a date and create its payment intent.
#[utoipa::path(
    post,
    path = "/orders",
    tags = ["Orders"],
    request_body = OrderParams,
    responses(
        (status = 201, description = "Order created", body = StdResponse<Order, String>),
        (status = 400, description = "Invalid order or slot already booked", body = ErrorBody),
        (status = 500, description = "Payment provider or storage failure", body = ErrorBody)
    )
)]
async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(params) = payload?;
    let order = state.orders.create(params).await?;

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(order),
            message: Some("Order created successfully"),
        },
    ))
}

/// List all orders with theatre, slot, addon and payment details.
#[utoipa::path(
    get,
    path = "/orders",
    tags = ["Orders"],
    responses(
        (status = 200, description = "List orders", body = StdResponse<Vec<OrderDetails>, String>)
    )
)]
async fn get_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.get_all().await?;

    Ok(StdResponse {
        data: Some(orders),
        message: Some("Get orders successfully"),
    })
}

/// Fetch a specific order.
#[utoipa::path(
    get,
    path = "/orders/{orderId}",
    tags = ["Orders"],
    params(
        ("orderId" = String, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = StdResponse<OrderDetails, String>),
        (status = 404, description = "Unknown or malformed order id", body = ErrorBody)
    )
)]
async fn get_order(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let id = Uuid::parse_str(&order_id)
        .map_err(|_| AppError::NotFound("invalid order id".into()))?;
    let order = state.orders.get_by_id(id).await?;

    Ok(StdResponse {
        data: Some(order),
        message: Some("Get order successfully"),
    })
}
