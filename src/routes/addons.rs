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
    models::{AddonCategory, AddonEntity},
    params::AddonParams,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_addon, get_addons))
        .routes(routes!(get_categories))
}

/// Create an addon in one of the fixed categories.
#[utoipa::path(
    post,
    path = "/addons",
    tags = ["Addons"],
    request_body = AddonParams,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Addon created", body = StdResponse<AddonEntity, String>),
        (status = 400, description = "Invalid addon", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody)
    )
)]
async fn create_addon(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<AddonParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(params) = payload?;
    let addon = state.addons.create(params, admin.user_id).await?;

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(addon),
            message: Some("Addon created successfully"),
        },
    ))
}

#[utoipa::path(
    get,
    path = "/addons",
    tags = ["Addons"],
    responses(
        (status = 200, description = "List addons", body = StdResponse<Vec<AddonEntity>, String>)
    )
)]
async fn get_addons(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let addons = state.addons.list().await?;

    Ok(StdResponse {
        data: Some(addons),
        message: Some("Get addons successfully"),
    })
}

/// The fixed list of addon categories.
#[utoipa::path(
    get,
    path = "/addons/categories",
    tags = ["Addons"],
    responses(
        (status = 200, description = "List addon categories", body = StdResponse<Vec<AddonCategory>, String>)
    )
)]
async fn get_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(StdResponse {
        data: Some(state.addons.categories()),
        message: Some("Get addon categories successfully"),
    })
}
