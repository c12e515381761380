pub mod courses;
pub mod docs;
pub mod schedules;

pub use courses::*;
pub use docs::*;
pub use schedules::*;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::api_json::ErrorResponse;
use crate::error::SchedulerError;

pub fn status_for(err: &SchedulerError) -> StatusCode {
    match err {
        SchedulerError::InvalidCap { .. }
        | SchedulerError::EmptyCourseSelection
        | SchedulerError::CourseNotFound(_)
        | SchedulerError::UnparseableSchedules(_)
        | SchedulerError::InvalidFilename(_) => StatusCode::BAD_REQUEST,
        SchedulerError::ConflictingSections { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SchedulerError::CatalogNotFound(_) | SchedulerError::NoCourseData => StatusCode::NOT_FOUND,
        SchedulerError::Io(_) | SchedulerError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{"detail": ..., "error_code": ...}` with the status matching the error.
pub fn error_response(err: &SchedulerError) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
    }
    HttpResponse::build(status).json(ErrorResponse::from(err))
}

/// Decodes a JSON body into a request type, answering 400 with the serde
/// message instead of actix's plain-text extractor error.
pub(crate) fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, HttpResponse> {
    serde_json::from_value::<T>(body).map_err(|e| {
        HttpResponse::BadRequest().json(json!({
            "detail": format!("invalid JSON body: {}", e),
            "error_code": "invalid_request",
        }))
    })
}
