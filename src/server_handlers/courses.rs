use std::collections::HashMap;

use actix_web::{web, HttpResponse, Responder};

use crate::api_json::CoursesResponse;
use crate::catalog::unique_course_count;
use crate::error::SchedulerError;
use crate::server::AppState;
use crate::server_handlers::error_response;

fn courses_from(state: &AppState, filename: Option<&str>) -> Result<CoursesResponse, SchedulerError> {
    let (path, sections) = state.store.load(filename)?;
    Ok(CoursesResponse {
        count: sections.len(),
        unique_codes: unique_course_count(&sections),
        courses: sections.as_ref().clone(),
        last_updated: state.store.last_modified(&path),
    })
}

/// GET /api/courses?filename=...
///
/// A missing catalog is not an error here: the client gets an empty list.
pub async fn courses_handler(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let filename = query.get("filename").map(String::as_str);
    match courses_from(&state, filename) {
        Ok(mut resp) => {
            resp.last_updated = None;
            HttpResponse::Ok().json(resp)
        }
        Err(SchedulerError::CatalogNotFound(_)) => HttpResponse::Ok().json(CoursesResponse::empty()),
        Err(e) => error_response(&e),
    }
}

/// GET /api/courses/cached: newest catalog file plus its modification time.
pub async fn cached_courses_handler(state: web::Data<AppState>) -> impl Responder {
    match courses_from(&state, None) {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(SchedulerError::CatalogNotFound(_)) => HttpResponse::Ok().json(CoursesResponse::empty()),
        Err(e) => error_response(&e),
    }
}
