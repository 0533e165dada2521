//! services/api/src/web/validate.rs
//!
//! Request validation middleware.
//!
//! [`validate`] turns a [`Schema`] and a [`RequestPart`] into a middleware
//! function for `axum::middleware::from_fn`. The selected part is parsed
//! against the schema; on success the parsed value replaces it and the
//! request continues, on a shape violation the request is answered with a
//! 400 envelope listing every violated constraint. Anything else (an
//! unreadable or oversized body, malformed JSON) is answered by [`ApiError`].
//!
//! Bodies are only read as JSON when the request declares a JSON content
//! type. Any other body validates as `{}`, the same as an empty one.

use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, Path, Query, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use http_body_util::LengthLimitError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use vivamate_core::{Schema, ValidationErrors};

use crate::error::ApiError;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Which part of the request a schema applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPart {
    #[default]
    Body,
    Query,
    Params,
}

//=========================================================================================
// Error Envelope
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The 400 body returned for shape violations.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationFailure {
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            message: "Validation failed".to_string(),
            errors: errors
                .into_issues()
                .into_iter()
                .map(|issue| FieldError {
                    field: issue.field(),
                    message: issue.message,
                })
                .collect(),
        }
    }
}

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

//=========================================================================================
// Middleware
//=========================================================================================

#[derive(Clone)]
struct ParsedQuery(Value);

#[derive(Clone)]
struct ParsedParams(Value);

/// Validates the request body against `schema`.
pub fn validate_body(
    schema: Schema,
) -> impl Fn(Request, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    validate(schema, RequestPart::Body)
}

/// Builds a middleware function that validates `part` against `schema`.
///
/// Use with `axum::middleware::from_fn`.
pub fn validate(
    schema: Schema,
    part: RequestPart,
) -> impl Fn(Request, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    let schema = Arc::new(schema);
    move |req: Request, next: Next| -> BoxFuture<'static, Response> {
        let schema = Arc::clone(&schema);
        Box::pin(async move {
            match replace_part(&schema, part, req).await {
                Ok(req) => next.run(req).await,
                Err(rejection) => rejection,
            }
        })
    }
}

async fn replace_part(schema: &Schema, part: RequestPart, req: Request) -> Result<Request, Response> {
    match part {
        RequestPart::Body => {
            let (mut parts, body) = req.into_parts();
            let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
                if exceeds_limit(&e) {
                    ApiError::PayloadTooLarge(format!(
                        "Request body exceeds {} bytes",
                        MAX_BODY_BYTES
                    ))
                } else {
                    ApiError::MalformedRequest(format!("Failed to read request body: {}", e))
                }
                .into_response()
            })?;

            // An absent or non-JSON body is treated as an empty object.
            let raw = if !is_json(&parts.headers) || bytes.iter().all(u8::is_ascii_whitespace) {
                Value::Object(Map::new())
            } else {
                serde_json::from_slice(&bytes).map_err(|e| {
                    ApiError::MalformedRequest(format!("Invalid JSON body: {}", e)).into_response()
                })?
            };

            let parsed = schema.parse(&raw).map_err(reject)?;
            let body = serde_json::to_vec(&parsed)
                .map_err(|e| ApiError::Internal(e.to_string()).into_response())?;

            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            parts
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
            Ok(Request::from_parts(parts, Body::from(body)))
        }
        RequestPart::Query => {
            let Query(raw) = Query::<BTreeMap<String, String>>::try_from_uri(req.uri())
                .map_err(|e| ApiError::MalformedRequest(e.body_text()).into_response())?;

            let parsed = schema.parse(&string_map(raw)).map_err(reject)?;
            let mut req = req;
            req.extensions_mut().insert(ParsedQuery(parsed));
            Ok(req)
        }
        RequestPart::Params => {
            let (mut parts, body) = req.into_parts();
            let Path(raw) = Path::<BTreeMap<String, String>>::from_request_parts(&mut parts, &())
                .await
                .map_err(|e| ApiError::MalformedRequest(e.body_text()).into_response())?;

            let parsed = schema.parse(&string_map(raw)).map_err(reject)?;
            parts.extensions.insert(ParsedParams(parsed));
            Ok(Request::from_parts(parts, body))
        }
    }
}

/// Whether the declared content type is JSON (`application/json` or `*/*+json`).
fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn exceeds_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

fn string_map(raw: BTreeMap<String, String>) -> Value {
    Value::Object(
        raw.into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    )
}

fn reject(errors: ValidationErrors) -> Response {
    debug!(fields = ?errors.fields(), "Request failed validation");
    ValidationFailure::from(errors).into_response()
}

//=========================================================================================
// Extractors
//=========================================================================================

/// The query string as parsed by a `RequestPart::Query` validation layer.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

/// The path parameters as parsed by a `RequestPart::Params` validation layer.
#[derive(Debug, Clone)]
pub struct ValidatedParams<T>(pub T);

fn from_parsed<T: DeserializeOwned>(value: Option<Value>, part: &str) -> Result<T, ApiError> {
    let value = value
        .ok_or_else(|| ApiError::Internal(format!("{} was not validated for this route", part)))?;
    serde_json::from_value(value)
        .map_err(|e| ApiError::Internal(format!("validated {} does not fit handler: {}", part, e)))
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.extensions.get::<ParsedQuery>().map(|p| p.0.clone());
        from_parsed(value, "query").map(ValidatedQuery)
    }
}

impl<S, T> FromRequestParts<S> for ValidatedParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.extensions.get::<ParsedParams>().map(|p| p.0.clone());
        from_parsed(value, "params").map(ValidatedParams)
    }
}
