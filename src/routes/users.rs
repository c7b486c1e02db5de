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
    models::User,
    params::UserParams,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(create_user))
}

/// Create a user account. Roles default to `customer`.
#[utoipa::path(
    post,
    path = "/users",
    tags = ["Users"],
    request_body = UserParams,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "User created", body = StdResponse<User, String>),
        (status = 400, description = "Invalid user or email already taken", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody)
    )
)]
async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<UserParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(params) = payload?;
    let user = state.users.create(params).await?;
    tracing::info!(user_id = %user.id, created_by = %admin.user_id, "Admin created user");

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(user),
            message: Some("User created successfully"),
        },
    ))
}
