use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::actor::Actor;
use crate::config::Config;
use crate::core::schedule::{locations_of, set_note, transfer, AssignmentSlot};
use crate::model::schedule::DailySchedule;
use crate::model::site::SiteId;
use crate::model::worker::WorkerId;
use crate::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct TransferRequest {
    #[schema(example = 7, value_type = u64)]
    pub worker_id: WorkerId,
    /// A site id, or one of POOL / HOLIDAYS / SICKNESS
    #[schema(example = "3")]
    pub target: String,
    /// Site the worker is being dragged away from, when the move starts
    /// on a site rather than in the pool
    #[schema(value_type = Option<u64>, nullable = true)]
    pub source_site_id: Option<SiteId>,
    /// Overrides the organization-wide multi-assignment policy for this
    /// one move
    #[schema(example = json!(null), nullable = true)]
    pub multi: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct NoteRequest {
    #[schema(example = "Gate code 4411, deliveries after 10:00")]
    pub note: String,
}

#[derive(Serialize, ToSchema)]
pub struct LocationsResponse {
    #[schema(example = 7, value_type = u64)]
    pub worker_id: WorkerId,
    #[schema(example = json!(["North Yard", "Harbor Depot"]))]
    pub labels: Vec<String>,
    /// More than one label means the worker is double-booked
    #[schema(example = true)]
    pub multi_assigned: bool,
}

/* =========================
Schedule snapshot
========================= */
/// Swagger doc for get_schedule endpoint
#[utoipa::path(
    get,
    path = "/api/schedule/{date}",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Schedule for the date; empty if nothing was planned yet", body = DailySchedule),
        (status = 400, description = "Bad date"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Schedule"
)]
pub async fn get_schedule(
    _actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<NaiveDate>,
) -> actix_web::Result<impl Responder> {
    let date = path.into_inner();
    Ok(HttpResponse::Ok().json(state.schedules.get_or_create(date)))
}

/* =========================
Assignment transfer (planner)
========================= */
/// Swagger doc for transfer_worker endpoint
#[utoipa::path(
    post,
    path = "/api/schedule/{date}/transfer",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)")
    ),
    request_body(
        content = TransferRequest,
        description = "Move one worker to a site, the pool, or an off-duty category",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Transfer applied", body = Object, example = json!({
            "message": "Transfer applied"
        })),
        (status = 400, description = "Bad target or date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown site", body = Object, example = json!({
            "message": "unknown site 99"
        }))
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Schedule"
)]
pub async fn transfer_worker(
    actor: Actor,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    path: web::Path<NaiveDate>,
    payload: web::Json<TransferRequest>,
) -> actix_web::Result<impl Responder> {
    actor.require_planner()?;

    let date = path.into_inner();

    // 1️⃣ resolve the drop target
    let target: AssignmentSlot = payload.target.parse()?;
    let multi = payload.multi.unwrap_or(config.multi_assignment);

    // 2️⃣ apply the move as one atomic read-modify-write
    let updated = state.schedules.update(date, |schedule| {
        transfer(
            schedule,
            state.directory.sites(),
            payload.worker_id,
            target,
            payload.source_site_id,
            multi,
        )
    })?;

    tracing::info!(
        worker_id = payload.worker_id,
        slot = %target,
        date = %date,
        multi,
        "Assignment transfer applied"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Transfer applied",
        "schedule": updated
    })))
}

/* =========================
Per-site note (planner)
========================= */
/// Swagger doc for put_note endpoint
#[utoipa::path(
    put,
    path = "/api/schedule/{date}/notes/{site_id}",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)"),
        ("site_id" = u64, Path, description = "Site the note belongs to")
    ),
    request_body(
        content = NoteRequest,
        description = "Free text for the site; empty text clears the note",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Note saved", body = Object, example = json!({
            "message": "Note saved"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown site")
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Schedule"
)]
pub async fn put_note(
    actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<(NaiveDate, SiteId)>,
    payload: web::Json<NoteRequest>,
) -> actix_web::Result<impl Responder> {
    actor.require_planner()?;

    let (date, site_id) = path.into_inner();
    state.schedules.update(date, |schedule| {
        set_note(schedule, state.directory.sites(), site_id, &payload.note)
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Note saved"
    })))
}

/* =========================
Worker locations
========================= */
/// Swagger doc for worker_locations endpoint
#[utoipa::path(
    get,
    path = "/api/schedule/{date}/locations/{worker_id}",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)"),
        ("worker_id" = u64, Path, description = "Worker to look up")
    ),
    responses(
        (status = 200, description = "Everywhere the worker is placed on that date", body = LocationsResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Schedule"
)]
pub async fn worker_locations(
    _actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<(NaiveDate, WorkerId)>,
) -> actix_web::Result<impl Responder> {
    let (date, worker_id) = path.into_inner();
    let schedule = state.schedules.get_or_create(date);
    let labels = locations_of(&schedule, state.directory.sites(), worker_id);

    Ok(HttpResponse::Ok().json(LocationsResponse {
        worker_id,
        multi_assigned: labels.len() > 1,
        labels,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::site::Site;
    use crate::model::worker::{Role, Worker};
    use crate::state::Directory;
    use actix_web::{test, App};

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(Directory::new(
            vec![Worker {
                id: 7,
                full_name: "Dana Kovács".to_string(),
                role: Role::FieldWorker,
                active: true,
            }],
            vec![
                Site {
                    id: 1,
                    name: "North Yard".to_string(),
                    active: true,
                    position: None,
                },
                Site {
                    id: 2,
                    name: "Harbor Depot".to_string(),
                    active: true,
                    position: None,
                },
            ],
        )))
    }

    fn test_config() -> web::Data<Config> {
        web::Data::new(Config {
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            seed_file: None,
            org_offset: chrono::FixedOffset::east_opt(0).unwrap(),
            stale_shift_hours: 10,
            multi_assignment: false,
            rate_attendance_per_min: 120,
            rate_schedule_per_min: 60,
            rate_report_per_min: 30,
            rate_protected_per_min: 1000,
        })
    }

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.route("/schedule/{date}", web::get().to(get_schedule))
            .route("/schedule/{date}/transfer", web::post().to(transfer_worker))
            .route("/schedule/{date}/notes/{site_id}", web::put().to(put_note))
            .route(
                "/schedule/{date}/locations/{worker_id}",
                web::get().to(worker_locations),
            );
    }

    #[actix_web::test]
    async fn planner_can_transfer_and_read_back() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/schedule/2026-08-21/transfer")
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "supervisor"))
            .set_json(serde_json::json!({ "worker_id": 7, "target": "1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get()
            .uri("/schedule/2026-08-21/locations/7")
            .insert_header(("X-Worker-Id", "7"))
            .insert_header(("X-Worker-Role", "field_worker"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["labels"], serde_json::json!(["North Yard"]));
        assert_eq!(body["multi_assigned"], serde_json::json!(false));
    }

    #[actix_web::test]
    async fn field_workers_cannot_transfer() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/schedule/2026-08-21/transfer")
            .insert_header(("X-Worker-Id", "7"))
            .insert_header(("X-Worker-Role", "field_worker"))
            .set_json(serde_json::json!({ "worker_id": 7, "target": "1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_target_site_is_a_404() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/schedule/2026-08-21/transfer")
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "admin"))
            .set_json(serde_json::json!({ "worker_id": 7, "target": "99" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn notes_round_trip_through_the_schedule() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/schedule/2026-08-21/notes/2")
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "supervisor"))
            .set_json(serde_json::json!({ "note": "crane arrives at noon" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get()
            .uri("/schedule/2026-08-21")
            .insert_header(("X-Worker-Id", "7"))
            .insert_header(("X-Worker-Role", "field_worker"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["notes"]["2"], serde_json::json!("crane arrives at noon"));
    }
}
