use std::sync::{Arc, LazyLock};

use aide::{
    axum::ApiRouter,
    openapi::{Info, OpenApi},
    scalar::Scalar,
};
use axum::{http::StatusCode, response::Html, routing::get, Extension, Json};

use crate::types::{AppError, Environment};

static DOCS_PAGE: LazyLock<String> = LazyLock::new(|| {
    Scalar::new("/openapi.json")
        .with_title("Upscale Relay Docs")
        .html()
});

/// OpenAPI document skeleton, completed by `finish_api`
#[must_use]
pub fn openapi() -> OpenApi {
    OpenApi {
        info: Info {
            title: "Upscale Relay".to_string(),
            description: Some(
                "Relays video uploads to a RunPod upscaling endpoint and issues presigned R2 URLs"
                    .to_string(),
            ),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    }
}

/// Routes for the Scalar UI and the OpenAPI document
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .route("/docs", get(docs_page))
        .route("/openapi.json", get(openapi_schema))
}

fn ensure_visible(environment: Environment) -> Result<(), AppError> {
    if environment.show_api_docs() {
        Ok(())
    } else {
        Err(AppError::new(
            StatusCode::NOT_FOUND,
            "not_found",
            "Not Found",
            false,
        ))
    }
}

#[allow(clippy::unused_async)]
async fn docs_page(
    Extension(environment): Extension<Environment>,
) -> Result<Html<&'static str>, AppError> {
    ensure_visible(environment)?;
    Ok(Html(DOCS_PAGE.as_str()))
}

#[allow(clippy::unused_async)]
async fn openapi_schema(
    Extension(environment): Extension<Environment>,
    Extension(openapi): Extension<Arc<OpenApi>>,
) -> Result<Json<OpenApi>, AppError> {
    ensure_visible(environment)?;
    Ok(Json(openapi.as_ref().clone()))
}
