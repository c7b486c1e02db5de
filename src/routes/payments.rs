use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    app_error::{AppError, ErrorBody, StdResponse},
    app_state::AppState,
    models::OrderPayment,
    params::PaymentVerificationBody,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(verify_payment))
}

/// Confirm a payment using the provider's signed callback data.
#[utoipa::path(
    post,
    path = "/verify-payment",
    tags = ["Payments"],
    request_body = PaymentVerificationBody,
    responses(
        (status = 200, description = "Payment verified", body = StdResponse<OrderPayment, String>),
        (status = 400, description = "Signature does not match", body = ErrorBody),
        (status = 404, description = "No payment for the provider order id", body = ErrorBody)
    )
)]
async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentVerificationBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let payment = state.payments.verify_payment(&body).await?;

    Ok(StdResponse {
        data: Some(payment.to_order_payment()),
        message: Some("successfully verified payment information"),
    })
}
