use std::sync::atomic::Ordering;

use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use serde_json::json;

use crate::server::AppState;

pub async fn root_handler() -> impl Responder {
    let info = json!({
        "name": "ISMIS Course Scheduler API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "courses": "/api/courses",
            "cached_courses": "/api/courses/cached",
            "generate": "POST /api/schedules/generate",
            "validate": "POST /api/schedules/validate",
            "availability": "POST /api/schedules/availability",
            "files": "/api/schedules/available",
            "load": "/api/schedules/load/{filename}"
        },
        "generate_example": {
            "course_codes": ["CIS 2106N", "GE-STS"],
            "max_combinations": 500,
            "unscheduled_policy": "wildcard"
        }
    });
    HttpResponse::Ok().json(info)
}

pub async fn health_handler(state: web::Data<AppState>) -> impl Responder {
    let (hits, misses, entries) = state.store.cache_stats();
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Local::now().to_rfc3339(),
        "active_tasks": state.active_generations.load(Ordering::Relaxed),
        "catalog_cache": {"hits": hits, "misses": misses, "entries": entries}
    }))
}
