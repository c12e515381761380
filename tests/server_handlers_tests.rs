use std::fs;
use std::path::PathBuf;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use ismis_scheduler::config::AppConfig;
use ismis_scheduler::server::{configure, AppState};

const CATALOG: &str = r#"[
    {"code": "CIS 2101 - Group 1", "schedule": "MWF 10:00 AM - 11:00 AM", "enrolled": "40/40", "status": "OPEN"},
    {"code": "CIS 2101 - Group 2", "schedule": "TTh 10:00 AM - 11:30 AM", "enrolled": "12/40"},
    {"code": "CIS 2101 - Group 3", "schedule": "MWF 01:00 PM - 02:00 PM", "status": "DISSOLVED"},
    {"code": "MATH 101 - Group 1", "schedule": "MWF 10:30 AM - 11:30 AM", "enrolled": "3/35"},
    {"code": "MATH 101 - Group 2", "schedule": "TTh 11:00 AM - 12:30 PM", "enrolled": "35/35"},
    {"code": "GE-STS - Group 1", "schedule": "TBA"},
    {"code": "GE-PE - Group 1", "schedule": "whenever the gym is free"}
]"#;

fn catalog_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ismis-handlers-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("2nd-Semester_2025_all.json"), CATALOG).unwrap();
    dir
}

fn state_for(dir: &PathBuf) -> web::Data<AppState> {
    let config = AppConfig { data_dir: dir.clone(), ..AppConfig::default() };
    web::Data::new(AppState::new(config))
}

#[actix_web::test]
async fn test_generate_schedules() {
    let dir = catalog_dir("generate");
    let app = test::init_service(App::new().app_data(state_for(&dir)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/schedules/generate")
        .set_json(json!({"course_codes": ["CIS 2101", "MATH 101", "GE-STS"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    // CIS 2101 - Group 1 clashes with MATH 101 - Group 1, Group 2 with MATH 101 - Group 2,
    // Group 3 is dissolved: two combinations remain
    assert_eq!(body["count"], 2);
    assert_eq!(body["cap_reached"], false);
    let combos = body["combinations"].as_array().unwrap();
    assert_eq!(combos[0]["courses"][0]["code"], "CIS 2101 - Group 1");
    assert_eq!(combos[0]["courses"][1]["code"], "MATH 101 - Group 2");
    assert_eq!(combos[0]["status"], "unavailable");
    assert_eq!(combos[0]["full_courses"], json!(["CIS 2101 - Group 1", "MATH 101 - Group 2"]));
    assert_eq!(combos[1]["courses"][0]["code"], "CIS 2101 - Group 2");
    assert_eq!(combos[1]["courses"][1]["code"], "MATH 101 - Group 1");
    assert_eq!(combos[1]["status"], "available");
    assert!(body["generation_time"].as_f64().unwrap() >= 0.0);
}

#[actix_web::test]
async fn test_generate_respects_cap_and_reports_it() {
    let dir = catalog_dir("cap");
    let app = test::init_service(App::new().app_data(state_for(&dir)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/schedules/generate")
        .set_json(json!({"course_codes": ["CIS 2101", "MATH 101"], "max_combinations": 1}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["cap_reached"], true);
}

#[actix_web::test]
async fn test_generate_rejects_bad_requests() {
    let dir = catalog_dir("bad");
    let app = test::init_service(App::new().app_data(state_for(&dir)).configure(configure)).await;

    let cases = vec![
        (json!({"course_codes": ["NOPE 999"]}), "course_not_found"),
        (json!({"course_codes": []}), "empty_selection"),
        (json!({"course_codes": ["CIS 2101"], "max_combinations": 0}), "invalid_cap"),
        (json!({"course_codes": ["CIS 2101"], "max_combinations": 10001}), "invalid_cap"),
        (json!({"course_codes": "CIS 2101"}), "invalid_request"),
        (json!({"course_codes": ["GE-PE"], "unscheduled_policy": "reject"}), "unparseable_schedule"),
    ];
    for (payload, code) in cases {
        let req = test::TestRequest::post().uri("/api/schedules/generate").set_json(&payload).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error_code"], code, "payload {}", payload);
    }

    let req = test::TestRequest::post()
        .uri("/api/schedules/generate")
        .set_json(json!({"course_codes": ["NOPE 999"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["detail"], "Course NOPE 999 not found in loaded data");
}

#[actix_web::test]
async fn test_generate_reports_unparseable_as_diagnostics() {
    let dir = catalog_dir("diag");
    let app = test::init_service(App::new().app_data(state_for(&dir)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/schedules/generate")
        .set_json(json!({"course_codes": ["GE-PE", "GE-STS"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["diagnostics"]["unparseable"][0]["code"], "GE-PE - Group 1");
}

#[actix_web::test]
async fn test_generate_without_catalog_is_not_found() {
    let dir = std::env::temp_dir().join(format!("ismis-handlers-none-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let app = test::init_service(App::new().app_data(state_for(&dir)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/schedules/generate")
        .set_json(json!({"course_codes": ["CIS 2101"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // the course listing degrades to an empty response instead
    let req = test::TestRequest::get().uri("/api/courses").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 0);
}

#[actix_web::test]
async fn test_validate_combination() {
    let app = test::init_service(App::new().configure(configure)).await;

    let ok = json!({"sections": [
        {"code": "A - Group 1", "schedule": "M 09:00 AM - 10:00 AM"},
        {"code": "B - Group 1", "schedule": "M 10:00 AM - 11:00 AM"}
    ]});
    let req = test::TestRequest::post().uri("/api/schedules/validate").set_json(&ok).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["valid"], true);

    let clash = json!({"sections": [
        {"code": "A - Group 1", "schedule": "M 09:00 AM - 10:00 AM"},
        {"code": "B - Group 1", "schedule": "MW 09:30 AM - 10:30 AM"}
    ]});
    let req = test::TestRequest::post().uri("/api/schedules/validate").set_json(&clash).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "conflicting_sections");
    assert_eq!(body["detail"], "sections A - Group 1 and B - Group 1 conflict");
}

#[actix_web::test]
async fn test_availability() {
    let dir = catalog_dir("availability");
    let app = test::init_service(App::new().app_data(state_for(&dir)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/schedules/availability")
        .set_json(json!({"course_codes": ["CIS 2101", "GE-STS"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let courses = body["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0]["course_code"], "CIS 2101");
    // the dissolved group is not counted
    assert_eq!(courses[0]["sections"], 2);
    assert_eq!(courses[0]["full_sections"], json!(["CIS 2101 - Group 1"]));
    assert_eq!(courses[0]["open_seats"], 28);
    assert_eq!(body["warnings"], json!([]));
}

#[actix_web::test]
async fn test_courses_and_files() {
    let dir = catalog_dir("courses");
    let app = test::init_service(App::new().app_data(state_for(&dir)).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/courses").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 7);
    assert_eq!(body["unique_codes"], 4);

    let req = test::TestRequest::get().uri("/api/courses/cached").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 7);
    assert!(body["last_updated"].is_string());

    let req = test::TestRequest::get().uri("/api/schedules/available").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["files"][0]["filename"], "2nd-Semester_2025_all.json");

    let req = test::TestRequest::get().uri("/api/schedules/load/2nd-Semester_2025_all.json").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 7);

    let req = test::TestRequest::get().uri("/api/schedules/load/missing.json").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/schedules/load/..%5Csecret.json").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_files_outside_the_data_dir_are_refused() {
    let root = catalog_dir("outside");
    let data = root.join("data");
    let secret = root.join("secret");
    fs::create_dir_all(&data).unwrap();
    fs::create_dir_all(&secret).unwrap();
    fs::write(data.join("courses.json"), CATALOG).unwrap();
    fs::write(secret.join("private.json"), r#"[{"code": "SECRET - Group 1", "teacher": "hidden"}]"#).unwrap();
    let absolute = secret.join("private.json").to_string_lossy().to_string();

    let app = test::init_service(App::new().app_data(state_for(&data)).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/courses?filename=..%2Fsecret%2Fprivate.json").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "invalid_filename");

    let payloads = vec![
        ("/api/schedules/generate", json!({"course_codes": ["SECRET"], "json_filename": absolute})),
        ("/api/schedules/generate", json!({"course_codes": ["SECRET"], "json_filename": "../secret/private.json"})),
        ("/api/schedules/availability", json!({"course_codes": ["SECRET"], "json_filename": absolute})),
    ];
    for (uri, payload) in payloads {
        let req = test::TestRequest::post().uri(uri).set_json(&payload).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{} {}", uri, payload);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error_code"], "invalid_filename");
        assert!(!body.to_string().contains("hidden"));
    }

    // the same request naming a file inside the data dir works
    let req = test::TestRequest::post()
        .uri("/api/schedules/generate")
        .set_json(json!({"course_codes": ["GE-STS"], "json_filename": "courses.json"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_root_and_health() {
    let dir = catalog_dir("health");
    let app = test::init_service(App::new().app_data(state_for(&dir)).configure(configure)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "running");

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["active_tasks"], 0);
}
