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
    auth::AdminUser,
    models::{TheatreEntity, TheatreWithSlots},
    params::CreateTheatreParams,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_theatre, get_theatres))
        .routes(routes!(get_theatre))
}

/// Create a theatre and assign its slots.
#[utoipa::path(
    post,
    path = "/theatres",
    tags = ["Theatres"],
    request_body = CreateTheatreParams,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Theatre created", body = StdResponse<TheatreEntity, String>),
        (status = 400, description = "Invalid theatre", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody)
    )
)]
async fn create_theatre(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CreateTheatreParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(params) = payload?;
    let theatre = state.theatres.create(params, admin.user_id).await?;

    Ok((
        StatusCode::CREATED,
        StdResponse {
            data: Some(theatre),
            message: Some("Theatre created successfully"),
        },
    ))
}

/// List all theatres.
#[utoipa::path(
    get,
    path = "/theatres",
    tags = ["Theatres"],
    responses(
        (status = 200, description = "List theatres", body = StdResponse<Vec<TheatreEntity>, String>)
    )
)]
async fn get_theatres(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let theatres = state.theatres.list().await?;

    Ok(StdResponse {
        data: Some(theatres),
        message: Some("Get theatres successfully"),
    })
}

/// Fetch a theatre together with its slots.
#[utoipa::path(
    get,
    path = "/theatres/{id}",
    tags = ["Theatres"],
    params(
        ("id" = String, Path, description = "Theatre ID to fetch")
    ),
    responses(
        (status = 200, description = "Get theatre successfully", body = StdResponse<TheatreWithSlots, String>),
        (status = 404, description = "Unknown or malformed theatre id", body = ErrorBody)
    )
)]
async fn get_theatre(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("invalid theatre id".into()))?;
    let theatre = state.theatres.get_with_slots(id).await?;

    Ok(StdResponse {
        data: Some(theatre),
        message: Some("Get theatre successfully"),
    })
}
