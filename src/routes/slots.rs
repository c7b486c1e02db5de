use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    app_error::{AppError, ErrorBody, StdResponse},
    app_state::AppState,
    auth::AdminUser,
    models::SlotEntity,
    params::CreateSlotParams,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(create_slot, get_slots))
}

/// Create a daily time slot (minutes from midnight).
#[utoipa::path(
    post,
    path = "/slots",
    tags = ["Slots"],
    request_body = CreateSlotParams,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Slot created", body = StdResponse<SlotEntity, String>),
        (status = 400, description = "Invalid slot", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody)
    )
)]
async fn create_slot(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CreateSlotParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(params) = payload?;
    let slot = state.slots.create(params, admin.user_id).await?;

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(slot),
            message: Some("Slot created successfully"),
        },
    ))
}

#[utoipa::path(
    get,
    path = "/slots",
    tags = ["Slots"],
    responses(
        (status = 200, description = "List slots", body = StdResponse<Vec<SlotEntity>, String>)
    )
)]
async fn get_slots(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let slots = state.slots.list().await?;

    Ok(StdResponse {
        data: Some(slots),
        message: Some("Get slots successfully"),
    })
}
