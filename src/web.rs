use std::fmt::Display;
use std::sync::{Arc, Mutex};

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{cookie::Key, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::ServeArgs;
use crate::display::{summarize_by_employee, EmployeeShifts};
use crate::form::{validate_submission, PreferenceSubmissionRequest};
use crate::schedule::{all_slots, calculate_slot_rankings, CoverageDeficit, Day, Rules, Shift};
use crate::store::{ScheduleStore, StoreError};

const ADMIN_SESSION_KEY: &str = "is_admin";
const ADMIN_HEADER: &str = "X-Admin-Password";

pub struct AppState {
    pub store: ScheduleStore,
    pub rules: Rules,
    /// Shared so a seeded server produces a reproducible sequence of schedules
    pub rng: Arc<Mutex<StdRng>>,
    pub admin_password: Option<String>,
}

impl AppState {
    pub fn new(store: ScheduleStore, rules: Rules, rng: StdRng, admin_password: Option<String>) -> Self {
        AppState {
            store,
            rules,
            rng: Arc::new(Mutex::new(rng)),
            admin_password,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    success: bool,
    assignments: usize,
    deficits: Vec<CoverageDeficit>,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    generated_at: Option<String>,
    slots: Vec<ScheduleSlot>,
    employees: Vec<EmployeeShifts>,
}

#[derive(Serialize)]
pub struct ScheduleSlot {
    day: Day,
    shift: Shift,
    employees: Vec<String>,
    is_empty: bool,
}

#[derive(Serialize)]
pub struct StatsResponse {
    employees: usize,
    preferences: usize,
    slot_popularity: Vec<SlotPopularity>,
}

#[derive(Serialize)]
pub struct SlotPopularity {
    day: Day,
    shift: Shift,
    requests: u32,
}

fn storage_failure(e: impl Display) -> HttpResponse {
    error!("storage failure: {e}");
    HttpResponse::InternalServerError().json(serde_json::json!({"success": false, "error": "Storage unavailable"}))
}

/// Generation is open when no admin password is configured
fn is_authorized(req: &HttpRequest, session: &Session, state: &AppState) -> bool {
    let Some(expected) = state.admin_password.as_deref() else {
        return true;
    };

    let header = req.headers().get(ADMIN_HEADER).and_then(|v| v.to_str().ok());
    if header == Some(expected) {
        return true;
    }

    session
        .get::<bool>(ADMIN_SESSION_KEY)
        .ok()
        .flatten()
        .unwrap_or(false)
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    match state.admin_password.as_deref() {
        Some(expected) if req.password != expected => {
            warn!("rejected admin login");
            Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Invalid password"})))
        }
        _ => {
            session
                .insert(ADMIN_SESSION_KEY, true)
                .map_err(actix_web::error::ErrorInternalServerError)?;
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
        }
    }
}

// Preference intake endpoint
async fn submit_preferences(
    req: web::Json<PreferenceSubmissionRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let submission = match validate_submission(&req) {
        Ok(submission) => submission,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e.to_string()
            })))
        }
    };

    let store = state.store.clone();
    match web::block(move || store.submit_preferences(&submission)).await {
        Ok(Ok(employee)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "employee_id": employee.id,
            "message": format!("Shift preferences saved for {}", employee.name)
        }))),
        Ok(Err(e)) => Ok(storage_failure(e)),
        Err(e) => Ok(storage_failure(e)),
    }
}

// Schedule generation endpoint
async fn generate_schedule(
    req: HttpRequest,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_authorized(&req, &session, &state) {
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let store = state.store.clone();
    let rules = state.rules.clone();
    let rng = state.rng.clone();
    let result = web::block(move || -> crate::store::Result<_> {
        let mut rng = rng.lock().map_err(|_| StoreError::LockPoisoned)?;
        store.regenerate(&rules, &mut *rng)
    })
    .await;

    match result {
        Ok(Ok(outcome)) => Ok(HttpResponse::Ok().json(GenerateResponse {
            success: true,
            assignments: outcome.schedule.total_assignments(),
            deficits: outcome.deficits,
        })),
        Ok(Err(e)) => Ok(storage_failure(e)),
        Err(e) => Ok(storage_failure(e)),
    }
}

// Schedule view endpoint
async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.store.clone();
    let loaded = web::block(move || -> crate::store::Result<_> {
        Ok((store.load_schedule()?, store.generated_at()?))
    })
    .await;

    let (rows, generated_at) = match loaded {
        Ok(Ok(loaded)) => loaded,
        Ok(Err(e)) => return Ok(storage_failure(e)),
        Err(e) => return Ok(storage_failure(e)),
    };

    let slots = all_slots(&state.rules.days, &state.rules.shifts)
        .into_iter()
        .map(|slot| {
            let employees: Vec<String> = rows
                .iter()
                .filter(|r| r.slot == slot)
                .map(|r| r.employee_name.clone())
                .collect();
            ScheduleSlot {
                day: slot.day,
                shift: slot.shift,
                is_empty: employees.is_empty(),
                employees,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(ScheduleResponse {
        generated_at,
        slots,
        employees: summarize_by_employee(&rows),
    }))
}

// Stats endpoint
async fn get_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let store = state.store.clone();
    let loaded = web::block(move || -> crate::store::Result<_> {
        Ok((store.list_employees()?.len(), store.list_preferences()?))
    })
    .await;

    let (employees, preferences) = match loaded {
        Ok(Ok(loaded)) => loaded,
        Ok(Err(e)) => return Ok(storage_failure(e)),
        Err(e) => return Ok(storage_failure(e)),
    };

    let rankings = calculate_slot_rankings(&preferences);
    let slot_popularity = all_slots(&state.rules.days, &state.rules.shifts)
        .into_iter()
        .map(|slot| SlotPopularity {
            day: slot.day,
            shift: slot.shift,
            requests: rankings.get(&slot).copied().unwrap_or(0),
        })
        .collect();

    Ok(HttpResponse::Ok().json(StatsResponse {
        employees,
        preferences: preferences.len(),
        slot_popularity,
    }))
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn schedule_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/schedule.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Pages and JSON API; static files are mounted separately by `start_server`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/schedule", web::get().to(schedule_page))
        .route("/api/login", web::post().to(admin_login))
        .route("/api/preferences", web::post().to(submit_preferences))
        .route("/api/generate", web::post().to(generate_schedule))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/stats", web::get().to(get_stats));
}

pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    // served over plain http like the rest of the app
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .build()
}

pub async fn start_server(store: ScheduleStore, args: ServeArgs) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(
        store,
        args.rules.rules(),
        args.rules.rng(),
        args.admin_password.clone(),
    ));
    // Sessions do not survive a restart
    let key = Key::generate();

    info!(
        bind = %args.bind,
        port = args.port,
        admin_gate = args.admin_password.is_some(),
        "starting web server"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(session_middleware(key.clone()))
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(configure)
    })
    .bind((args.bind.clone(), args.port))?
    .run()
    .await
}
