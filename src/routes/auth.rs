use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    app_error::{AppError, ErrorBody, StdResponse},
    app_state::AppState,
    auth::TokenPair,
    params::{LoginParams, RefreshTokenParams},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(refresh_token))
}

/// Exchange credentials for an access and refresh token pair.
#[utoipa::path(
    post,
    path = "/login",
    tags = ["Auth"],
    request_body = LoginParams,
    responses(
        (status = 200, description = "Logged in", body = StdResponse<TokenPair, String>),
        (status = 401, description = "Wrong password", body = ErrorBody),
        (status = 404, description = "No user with that email", body = ErrorBody)
    )
)]
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(params) = payload?;
    let tokens = state.users.login(params).await?;

    Ok(StdResponse {
        data: Some(tokens),
        message: Some("Logged in successfully"),
    })
}

/// Mint a new access token from a refresh token.
#[utoipa::path(
    post,
    path = "/refresh-token",
    tags = ["Auth"],
    request_body = RefreshTokenParams,
    responses(
        (status = 200, description = "Token refreshed", body = StdResponse<TokenPair, String>),
        (status = 401, description = "Expired or invalid refresh token", body = ErrorBody)
    )
)]
async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenParams>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(params) = payload?;
    let tokens = state.users.refresh(params)?;

    Ok(StdResponse {
        data: Some(tokens),
        message: Some("Token refreshed successfully"),
    })
}
