use crate::dto::{ValidationErrorBody, ValidationIssue};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fare_model::ModelError;
use std::borrow::Cow;
use tracing::{debug, error};

/// Failures of the prediction endpoint.
#[fare_derive::fare_error]
pub enum PricingError {
    /// The request body is not a valid fare request. Answered with `422`.
    #[error("Invalid fare request{}: {source}", format_context(.context))]
    Validation { source: JsonRejection, context: Option<Cow<'static, str>> },

    /// The model could not produce a usable prediction. Answered with `500`.
    #[error("Fare inference failed{}: {source}", format_context(.context))]
    Inference { source: ModelError, context: Option<Cow<'static, str>> },
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation { source, .. } => {
                debug!(error = %source, "Rejected fare request");
                let body = ValidationErrorBody { detail: vec![issue(&source)] };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            },
            err @ Self::Inference { .. } => {
                error!(error = %err, "Fare prediction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            },
        }
    }
}

fn issue(rejection: &JsonRejection) -> ValidationIssue {
    let msg = rejection.body_text();
    let kind = match rejection {
        JsonRejection::JsonSyntaxError(_) => "json_invalid",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        JsonRejection::BytesRejection(_) => "body_unreadable",
        JsonRejection::JsonDataError(_) if msg.contains("missing field") => "missing",
        JsonRejection::JsonDataError(_) if msg.contains("invalid type") => "type_error",
        _ => "value_error",
    };

    ValidationIssue { kind: kind.to_owned(), loc: vec!["body".to_owned()], msg }
}
