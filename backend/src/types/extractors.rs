//! Custom extractors for request validation

use aide::operation::OperationInput;
use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, StatusCode},
};
use schemars::JsonSchema;
use validator::Validate;

use crate::types::error::AppError;

/// Query string extractor that validates the parsed parameters
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| {
                AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_query",
                    err.body_text(),
                    false,
                )
            })?;

        params.validate().map_err(|errors| {
            // Report the first failing field
            let field = errors
                .field_errors()
                .into_keys()
                .next()
                .map_or_else(|| "query".to_string(), |field| field.to_string());
            AppError::new(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("Invalid value for `{field}`"),
                false,
            )
        })?;

        Ok(Self(params))
    }
}

impl<T> OperationInput for ValidatedQuery<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        // Same parameters as a plain `Query<T>`
        Query::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        use aide::OperationOutput;
        AppError::inferred_responses(ctx, operation)
    }
}
