use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::config::SchedulerConfig;
use crate::event::EventRecord;
use crate::parser::read_csv;
use crate::schedule::ShiftSummary;
use crate::search::{plan_schedules, Plan, SearchStats};

// Results only live in memory; a restart forgets them
pub struct AppState {
    pub config: SchedulerConfig,
    pub latest: Mutex<Option<ScheduleResponse>>,
}

impl AppState {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            latest: Mutex::new(None),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub num_shifts: Option<usize>,
    #[serde(default)]
    pub num_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub num_shifts: Option<usize>,
    pub num_results: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleOption {
    pub option: usize,
    pub score: f64,
    pub shifts: Vec<ShiftSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub schedules: Vec<ScheduleOption>,
    pub stats: SearchStats,
}

impl From<&Plan> for ScheduleResponse {
    fn from(plan: &Plan) -> Self {
        let schedules = plan
            .results
            .iter()
            .enumerate()
            .map(|(index, ranked)| ScheduleOption {
                option: index + 1,
                score: ranked.score,
                shifts: ranked.schedule.shift_summaries(),
            })
            .collect();

        Self {
            schedules,
            stats: plan.stats.clone(),
        }
    }
}

fn bad_request(message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": message.to_string()
    }))
}

fn request_config(
    base: &SchedulerConfig,
    num_shifts: Option<usize>,
    num_results: Option<usize>,
) -> SchedulerConfig {
    let mut config = base.clone();
    if let Some(num_shifts) = num_shifts {
        config.num_shifts = num_shifts;
    }
    if let Some(num_results) = num_results {
        config.num_results = num_results;
    }
    config
}

/// Runs the search off the async workers and stores the result as the latest.
async fn run_plan(
    records: Vec<EventRecord>,
    config: SchedulerConfig,
    state: &AppState,
) -> Result<HttpResponse> {
    info!(events = records.len(), shifts = config.num_shifts, "Scheduling request");

    let plan = match web::block(move || plan_schedules(records, &config)).await? {
        Ok(plan) => plan,
        Err(e) => {
            warn!(error = %e, "Rejected scheduling request");
            return Ok(bad_request(e));
        }
    };

    let response = ScheduleResponse::from(&plan);
    *state.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(response.clone());
    Ok(HttpResponse::Ok().json(response))
}

// JSON roster endpoint
async fn create_schedule(
    req: web::Json<ScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let request = req.into_inner();
    let config = request_config(&state.config, request.num_shifts, request.num_results);
    run_plan(request.events, config, &state).await
}

// CSV roster upload endpoint
async fn upload_roster(
    query: web::Query<UploadQuery>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let records = match read_csv(&body[..]) {
        Ok(records) => records,
        Err(e) => return Ok(bad_request(format!("Failed to process CSV: {}", e))),
    };
    let config = request_config(&state.config, query.num_shifts, query.num_results);
    run_plan(records, config, &state).await
}

async fn latest_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let latest = state.latest.lock().unwrap_or_else(|e| e.into_inner());
    match latest.as_ref() {
        Some(response) => Ok(HttpResponse::Ok().json(response)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No schedule available"}))),
    }
}

async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "ok"})))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health))
        .route("/api/schedule", web::post().to(create_schedule))
        .route("/api/schedule/upload", web::post().to(upload_roster))
        .route("/api/schedule/latest", web::get().to(latest_schedule));
}

pub async fn start_server(port: u16, config: SchedulerConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(config));

    info!(port, "Starting web server");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(SchedulerConfig::default()))
    }

    fn roster() -> Value {
        json!([
            { "name": "Towers", "division": "C", "kids": ["Ann", "Bo"], "coach": "Kim" },
            { "name": "Anatomy", "division": "C", "kids": ["Ann"], "coach": "Lee" },
            { "name": "Optics", "division": "C", "kids": ["Bo"], "coach": "Kim" }
        ])
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_schedule_then_latest() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/schedule/latest").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/schedule")
            .set_json(json!({ "events": roster(), "num_shifts": 3, "num_results": 2 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let schedules = body["schedules"].as_array().unwrap();
        assert!(!schedules.is_empty() && schedules.len() <= 2);
        assert_eq!(schedules[0]["option"], 1);
        assert_eq!(schedules[0]["score"], 0.0);
        assert_eq!(schedules[0]["shifts"].as_array().unwrap().len(), 3);
        assert!(body["stats"]["nodes"].as_u64().unwrap() > 0);

        let req = test::TestRequest::get().uri("/api/schedule/latest").to_request();
        let latest: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(latest, body);
    }

    #[actix_web::test]
    async fn test_invalid_shift_count_is_bad_request() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/schedule")
            .set_json(json!({ "events": roster(), "num_shifts": 0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_csv_upload() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/schedule/upload?num_shifts=2&num_results=1")
            .set_payload("name,students,coach\nTowers,\"Ann,Bo\",Kim\nAnatomy,Ann,none\n")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let schedules = body["schedules"].as_array().unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0]["score"], 0.0);
    }
}
