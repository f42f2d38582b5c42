//! Request body validation
//!
//! [`ValidJson`] deserializes a JSON body and runs its `validator` rules.
//! Both failures become a 400 `ValidationFailed` response whose `details`
//! carry the offending fields, keyed by path (`items[0].quantity`).

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::utils::AppError;

/// JSON extractor that also validates
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::validation("Invalid request body")
                    .with_detail("body", rejection.body_text())
            })?;

        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

/// Convert `validator` output into an [`AppError`]
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields = Map::new();
    flatten("", &errors, &mut fields);
    AppError::validation("Validation failed").with_detail("fields", Value::Object(fields))
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Map<String, Value>) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.insert(key, errs.iter().map(describe).collect());
            }
            ValidationErrorsKind::Struct(inner) => flatten(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{}[{}]", key, index), inner, out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> Value {
    match &error.message {
        Some(message) => Value::String(message.to_string()),
        None => Value::String(error.code.to_string()),
    }
}
