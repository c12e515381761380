use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::algorithm::{
    course_availability, generate_annotated, validate_combination, AnnotatedReport, GeneratorOptions,
};
use crate::api_json::{
    parse_json_input, AvailabilityRequest, AvailabilityResponse, CoursesResponse, GenerateSchedulesRequest,
    GenerateSchedulesResponse, ValidateCombinationRequest,
};
use crate::catalog::{unique_course_count, CatalogStore};
use crate::error::SchedulerError;
use crate::models::CourseGroups;
use crate::server::AppState;
use crate::server_handlers::{error_response, parse_body};

/// Counts a generation as active for as long as it is alive.
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        ActiveGuard(Arc::clone(counter))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Loads the catalog and builds the requested course groups. DISSOLVED
/// sections are dropped while grouping.
fn selected_groups(
    store: &CatalogStore,
    json_filename: Option<&str>,
    codes: &[String],
) -> Result<CourseGroups, SchedulerError> {
    let (_, sections) = store.load(json_filename)?;
    if sections.is_empty() {
        return Err(SchedulerError::NoCourseData);
    }
    let groups = CourseGroups::from_sections(sections.iter().cloned());
    groups.select(codes)
}

fn run_generation(
    store: &CatalogStore,
    req: &GenerateSchedulesRequest,
    options: &GeneratorOptions,
) -> Result<AnnotatedReport, SchedulerError> {
    let groups = selected_groups(store, req.json_filename.as_deref(), &req.codes())?;
    tracing::info!(
        courses = groups.len(),
        sections = groups.section_count(),
        max = options.max_combinations,
        "generating schedules"
    );
    generate_annotated(&groups, options)
}

/// POST /api/schedules/generate
pub async fn generate_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> impl Responder {
    let body_value = body.into_inner();
    let json_str = match serde_json::to_string(&body_value) {
        Ok(s) => s,
        Err(e) => return error_response(&SchedulerError::from(e)),
    };
    let req = match parse_json_input(&json_str) {
        Ok(r) => r,
        Err(e) => {
            return HttpResponse::BadRequest().json(json!({
                "detail": format!("failed to parse input: {}", e),
                "error_code": "invalid_request",
            }));
        }
    };

    let cap = match req.validate(state.config.default_max_combinations, state.config.max_combinations_limit) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let policy = req.unscheduled_policy.unwrap_or(state.config.unscheduled_policy);
    let options = GeneratorOptions::new(cap).with_policy(policy).with_skip_dissolved(true);

    tracing::info!(codes = ?req.course_codes, file = ?req.json_filename, "schedule generate request");
    let start = Instant::now();

    let permit = match Arc::clone(&state.generation_permits).acquire_owned().await {
        Ok(p) => p,
        Err(_) => {
            return HttpResponse::InternalServerError().json(json!({
                "detail": "failed to acquire semaphore",
                "error_code": "internal_error",
            }));
        }
    };

    let store = Arc::clone(&state.store);
    let active = ActiveGuard::enter(&state.active_generations);
    let blocking_handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let _active = active;
        run_generation(&store, &req, &options)
    });

    let report = match blocking_handle.await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => return error_response(&e),
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "detail": format!("task join error: {}", e),
                "error_code": "internal_error",
            }));
        }
    };

    let elapsed = start.elapsed().as_secs_f64();
    let resp = GenerateSchedulesResponse {
        count: report.combinations.len(),
        cap_reached: report.diagnostics.cap_reached,
        generation_time: (elapsed * 1000.0).round() / 1000.0,
        combinations: report.combinations,
        diagnostics: report.diagnostics,
    };
    tracing::info!(
        count = resp.count,
        seconds = resp.generation_time,
        cap_reached = resp.cap_reached,
        "schedules generated"
    );

    HttpResponse::Ok().json(resp)
}

/// POST /api/schedules/validate
///
/// Checks a client-assembled combination; 422 names the first clashing pair.
pub async fn validate_handler(body: web::Json<serde_json::Value>) -> impl Responder {
    let req: ValidateCombinationRequest = match parse_body(body.into_inner()) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match validate_combination(&req.sections) {
        Ok(()) => HttpResponse::Ok().json(json!({"valid": true, "sections": req.sections.len()})),
        Err(e) => error_response(&e),
    }
}

/// POST /api/schedules/availability
pub async fn availability_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> impl Responder {
    let req: AvailabilityRequest = match parse_body(body.into_inner()) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let codes: Vec<String> =
        req.course_codes.iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect();

    let groups = match selected_groups(&state.store, req.json_filename.as_deref(), &codes) {
        Ok(g) => g,
        Err(e) => return error_response(&e),
    };

    let courses = course_availability(&groups);
    let warnings = courses
        .iter()
        .filter(|c| !c.has_open_section())
        .map(|c| format!("All sections of {} are full", c.course_code))
        .collect();
    HttpResponse::Ok().json(AvailabilityResponse { courses, warnings })
}

/// GET /api/schedules/available
pub async fn available_files_handler(state: web::Data<AppState>) -> impl Responder {
    match state.store.list_files() {
        Ok(files) => HttpResponse::Ok().json(json!({"count": files.len(), "files": files})),
        Err(e) => error_response(&e),
    }
}

/// GET /api/schedules/load/{filename}
pub async fn load_file_handler(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let filename = path.into_inner();
    match state.store.load_named(&filename) {
        Ok((path, sections)) => HttpResponse::Ok().json(CoursesResponse {
            count: sections.len(),
            unique_codes: unique_course_count(&sections),
            courses: sections.as_ref().clone(),
            last_updated: state.store.last_modified(&path),
        }),
        Err(e) => error_response(&e),
    }
}
