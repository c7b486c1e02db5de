pub mod addons;
pub mod auth;
pub mod orders;
pub mod payments;
pub mod slots;
pub mod theatres;
pub mod users;

use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderName, Request, StatusCode},
    routing::get,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::openapi::{
    InfoBuilder, OpenApi,
    security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_axum::router::OpenApiRouter;

use crate::app_state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    orders::routes_with_openapi()
        .merge(payments::routes_with_openapi())
        .merge(theatres::routes_with_openapi())
        .merge(slots::routes_with_openapi())
        .merge(addons::routes_with_openapi())
        .merge(users::routes_with_openapi())
        .merge(auth::routes_with_openapi())
}

pub fn openapi_document(mut openapi: OpenApi) -> OpenApi {
    openapi.info = InfoBuilder::new()
        .title("Private Theatre API")
        .version(env!("CARGO_PKG_VERSION"))
        .build();
    openapi
        .components
        .get_or_insert_with(Default::default)
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    openapi
}

/// Requests running past `timeout` are answered with 408.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

async fn healthz() -> &'static str {
    "OK"
}

/// Full application router with the OpenAPI document and the HTTP middleware
/// stack applied.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let (router, openapi) = routes_with_openapi().split_for_parts();
    let openapi = openapi_document(openapi);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .route("/healthz", get(healthz))
        .route("/api-docs/openapi.json", get(move || async move { Json(openapi) }))
        .layer(timeout_layer(request_timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn slow_request_times_out_with_408() {
        let router: Router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(Duration::from_millis(20)));

        let response = router
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
