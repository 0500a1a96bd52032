use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::actor::Actor;
use crate::config::Config;
use crate::core::error::CoreError;
use crate::core::geo::{classify, ComplianceClass, Coordinate, GeoCheck};
use crate::core::ledger::{self, CheckOutDecision};
use crate::model::shift::AttendanceRecord;
use crate::model::site::SiteId;
use crate::state::AppState;
use crate::utils::site_cache;

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 3, value_type = u64)]
    pub site_id: SiteId,
    /// Device GPS fix at the moment of check-in, if the device had one
    pub position: Option<Coordinate>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    /// Device GPS fix at the moment of check-out, if the device had one
    pub position: Option<Coordinate>,
}

/// A shift event reply: the stored record plus how far from the site the
/// device said it was.
#[derive(Serialize, ToSchema)]
pub struct ShiftResponse {
    pub record: AttendanceRecord,
    pub geo: GeoCheck,
}

#[derive(Serialize, ToSchema)]
pub struct DecisionResponse {
    pub decision: CheckOutDecision,
    #[schema(value_type = String, format = "uuid")]
    pub record_id: Uuid,
    #[schema(example = 3, value_type = u64)]
    pub site_id: SiteId,
    #[schema(value_type = String, format = "date", example = "2026-08-21")]
    pub shift_date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct CorrectionRequest {
    #[schema(value_type = String, format = "date-time", example = "2026-08-21T06:30:00Z")]
    pub new_start: DateTime<Utc>,
    /// Omit to leave the recorded end time untouched
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub new_end: Option<DateTime<Utc>>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    #[schema(example = "2026-08-21", value_type = Option<String>, format = "date")]
    #[param(example = "2026-08-21", value_type = Option<String>, format = "date")]
    /// Filter by shift date
    pub date: Option<NaiveDate>,
    #[schema(example = 7)]
    /// Filter by worker ID
    pub worker_id: Option<u64>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/* =========================
Check-in
========================= */
/// Swagger doc for check_in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body(
        content = CheckInRequest,
        description = "Site and optional GPS fix",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Shift opened", body = ShiftResponse),
        (status = 400, description = "Malformed position"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No worker profile"),
        (status = 404, description = "Unknown site"),
        (status = 409, description = "Worker already has an open shift", body = Object, example = json!({
            "message": "worker 7 already has an open shift"
        }))
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    actor: Actor,
    state: web::Data<AppState>,
    payload: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    // 1️⃣ the actor must be a known worker
    if state.directory.worker(actor.worker_id).is_none() {
        return Err(actix_web::error::ErrorForbidden("No worker profile"));
    }

    // 2️⃣ resolve the site, cache first
    let site = match site_cache::lookup(payload.site_id, &state.directory).await {
        Some(site) => site,
        None => {
            return Err(CoreError::UnknownSite {
                site_id: payload.site_id,
            }
            .into())
        }
    };

    // 3️⃣ compare the device fix against the site's reference position
    let geo = classify(payload.position, site.position)?;
    if geo.class == ComplianceClass::Violation {
        tracing::warn!(
            worker_id = actor.worker_id,
            site_id = site.id,
            distance_m = ?geo.distance_m,
            "Check-in far away from site"
        );
    }

    // 4️⃣ open the shift; the store turns away a second open one
    let record = state
        .shifts
        .check_in(actor.worker_id, payload.site_id, payload.position, Utc::now())?;

    tracing::info!(worker_id = actor.worker_id, site_id = site.id, "Checked in");
    Ok(HttpResponse::Ok().json(ShiftResponse { record, geo }))
}

/* =========================
Check-out decision
========================= */
/// Swagger doc for check_out_decision endpoint
#[utoipa::path(
    get,
    path = "/api/attendance/check-out/decision",
    responses(
        (status = 200, description = "What the check-out flow must do next", body = DecisionResponse),
        (status = 400, description = "No open shift", body = Object, example = json!({
            "message": "worker 7 has no open shift"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out_decision(
    actor: Actor,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let records = state.shifts.snapshot();
    let open = records
        .iter()
        .find(|r| r.worker_id == actor.worker_id && r.is_open())
        .ok_or(CoreError::NoOpenShift {
            worker_id: actor.worker_id,
        })?;

    let reports = state.reports.index_snapshot();
    let decision =
        ledger::check_out_decision(actor.worker_id, &records, &reports, config.org_offset)?;

    Ok(HttpResponse::Ok().json(DecisionResponse {
        decision,
        record_id: open.id,
        site_id: open.site_id,
        shift_date: open.shift_date(config.org_offset),
    }))
}

/* =========================
Check-out
========================= */
/// Swagger doc for check_out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    request_body(
        content = CheckOutRequest,
        description = "Optional GPS fix at departure",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Shift closed", body = ShiftResponse),
        (status = 400, description = "No open shift or malformed position", body = Object, example = json!({
            "message": "worker 7 has no open shift"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    actor: Actor,
    state: web::Data<AppState>,
    payload: web::Json<CheckOutRequest>,
) -> actix_web::Result<impl Responder> {
    let record = state
        .shifts
        .close_open(actor.worker_id, payload.position, Utc::now())?;

    let site_position = site_cache::lookup(record.site_id, &state.directory)
        .await
        .and_then(|site| site.position);
    let geo = classify(payload.position, site_position)?;
    if geo.class == ComplianceClass::Violation {
        tracing::warn!(
            worker_id = actor.worker_id,
            site_id = record.site_id,
            distance_m = ?geo.distance_m,
            "Check-out far away from site"
        );
    }

    tracing::info!(worker_id = actor.worker_id, site_id = record.site_id, "Checked out");
    Ok(HttpResponse::Ok().json(ShiftResponse { record, geo }))
}

/* =========================
Privileged correction (Admin)
========================= */
/// Swagger doc for correct_record endpoint
#[utoipa::path(
    put,
    path = "/api/attendance/{record_id}",
    params(
        ("record_id" = String, Path, description = "Attendance record to correct")
    ),
    request_body(
        content = CorrectionRequest,
        description = "Replacement times; originals are preserved on the first correction",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Corrected record", body = AttendanceRecord),
        (status = 400, description = "End before start"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found", body = Object, example = json!({
            "message": "Attendance record not found"
        }))
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Attendance"
)]
pub async fn correct_record(
    actor: Actor,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<CorrectionRequest>,
) -> actix_web::Result<impl Responder> {
    actor.require_admin()?;

    let record_id = path.into_inner();
    let corrected = state.shifts.apply_correction(
        record_id,
        payload.new_start,
        payload.new_end,
        actor.worker_id,
        Utc::now(),
    )?;

    match corrected {
        Some(record) => {
            tracing::info!(
                record_id = %record_id,
                corrected_by = actor.worker_id,
                "Attendance record corrected"
            );
            Ok(HttpResponse::Ok().json(record))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Attendance record not found"
        }))),
    }
}

/* =========================
Attendance listing
========================= */
/// Swagger doc for attendance_list endpoint
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance records, newest first", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_list(
    _actor: Actor,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(per_page) as usize;

    // -------------------------
    // Filter + order
    // -------------------------
    let mut records = state.shifts.snapshot();
    if let Some(date) = query.date {
        records.retain(|r| r.shift_date(config.org_offset) == date);
    }
    if let Some(worker_id) = query.worker_id {
        records.retain(|r| r.worker_id == worker_id);
    }
    records.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let total = records.len() as i64;
    let data: Vec<AttendanceRecord> = records
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::report::DailyReport;
    use crate::model::site::Site;
    use crate::model::worker::{Role, Worker};
    use crate::state::Directory;
    use actix_web::{test, App};
    use std::collections::BTreeSet;

    fn worker(id: u64, name: &str) -> Worker {
        Worker {
            id,
            full_name: name.to_string(),
            role: Role::FieldWorker,
            active: true,
        }
    }

    // site ids are namespaced per test module: the site cache is a
    // process-wide static shared by every test in the binary
    const YARD: u64 = 101;
    const DEPOT: u64 = 102;

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState::new(Directory::new(
            vec![worker(7, "Dana Kovács"), worker(8, "Ruth Adler")],
            vec![
                Site {
                    id: YARD,
                    name: "North Yard".to_string(),
                    active: true,
                    position: Some(Coordinate { lat: 45.0, lng: 9.0 }),
                },
                Site {
                    id: DEPOT,
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
        cfg.route("/attendance/check-in", web::post().to(check_in))
            .route(
                "/attendance/check-out/decision",
                web::get().to(check_out_decision),
            )
            .route("/attendance/check-out", web::post().to(check_out))
            .route("/attendance/{record_id}", web::put().to(correct_record))
            .route("/attendance", web::get().to(attendance_list));
    }

    fn as_worker(id: u64) -> [(&'static str, String); 2] {
        [
            ("X-Worker-Id", id.to_string()),
            ("X-Worker-Role", "field_worker".to_string()),
        ]
    }

    #[actix_web::test]
    async fn check_out_walks_the_whole_decision_protocol() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        // both workers open a shift at the same site
        for id in [7u64, 8] {
            let [h1, h2] = as_worker(id);
            let req = test::TestRequest::post()
                .uri("/attendance/check-in")
                .insert_header(h1)
                .insert_header(h2)
                .set_json(serde_json::json!({ "site_id": YARD }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
        }

        // colleague still on site, no report: delegate
        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::get()
            .uri("/attendance/check-out/decision")
            .insert_header(h1)
            .insert_header(h2)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["decision"], serde_json::json!("ASK_DELEGATE"));

        // the colleague leaves
        let [h1, h2] = as_worker(8);
        let req = test::TestRequest::post()
            .uri("/attendance/check-out")
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        // now the worker is the last one out
        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::get()
            .uri("/attendance/check-out/decision")
            .insert_header(h1)
            .insert_header(h2)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["decision"], serde_json::json!("FORCE_REPORT"));

        // a filed report downgrades the exit to a plain confirmation
        state.reports.submit(DailyReport {
            id: Uuid::new_v4(),
            site_id: YARD,
            worker_id: 7,
            shift_date: Utc::now().date_naive(),
            description: "footings done".to_string(),
            photos: Vec::new(),
            submitted_at: Utc::now(),
            position: None,
            workers_present: BTreeSet::from([7, 8]),
        });

        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::get()
            .uri("/attendance/check-out/decision")
            .insert_header(h1)
            .insert_header(h2)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["decision"], serde_json::json!("SIMPLE_CONFIRM"));

        // leave, then a second check-out has nothing to close
        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::post()
            .uri("/attendance/check-out")
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::post()
            .uri("/attendance/check-out")
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn double_check_in_conflicts() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({ "site_id": YARD }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({ "site_id": DEPOT }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn check_in_embeds_the_distance_check() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        // ≈400 m north of the reference position
        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({
                "site_id": YARD,
                "position": { "lat": 45.0036, "lng": 9.0 }
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["geo"]["class"], serde_json::json!("WARN"));

        // the site without a reference position cannot be thresholded
        let [h1, h2] = as_worker(8);
        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({
                "site_id": DEPOT,
                "position": { "lat": 45.0, "lng": 9.0 }
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["geo"]["class"], serde_json::json!("NO_GPS"));
    }

    #[actix_web::test]
    async fn unknown_workers_cannot_check_in() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        let [h1, h2] = as_worker(999);
        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({ "site_id": YARD }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn correction_is_admin_only_and_404s_on_unknown_ids() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        let record = state
            .shifts
            .check_in(7, YARD, None, Utc::now())
            .unwrap();

        // a field worker may not correct records
        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::put()
            .uri(&format!("/attendance/{}", record.id))
            .insert_header(h1)
            .insert_header(h2)
            .set_json(serde_json::json!({ "new_start": "2026-08-21T06:30:00Z" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

        // an admin may, and originals are preserved
        let req = test::TestRequest::put()
            .uri(&format!("/attendance/{}", record.id))
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "admin"))
            .set_json(serde_json::json!({ "new_start": "2026-08-21T06:30:00Z" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["corrected_by"], serde_json::json!(1));
        assert!(body["original_start_time"].is_string());

        // unknown record id
        let req = test::TestRequest::put()
            .uri(&format!("/attendance/{}", Uuid::new_v4()))
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "admin"))
            .set_json(serde_json::json!({ "new_start": "2026-08-21T06:30:00Z" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn listing_filters_and_paginates() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        state.shifts.check_in(7, YARD, None, Utc::now()).unwrap();
        state.shifts.check_in(8, YARD, None, Utc::now()).unwrap();

        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::get()
            .uri("/attendance?worker_id=7&per_page=1")
            .insert_header(h1)
            .insert_header(h2)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], serde_json::json!(1));
        assert_eq!(body["data"][0]["worker_id"], serde_json::json!(7));
    }

    #[actix_web::test]
    async fn listing_clamps_degenerate_pagination() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .app_data(test_config())
                .configure(routes),
        )
        .await;

        state.shifts.check_in(7, YARD, None, Utc::now()).unwrap();
        state.shifts.check_in(8, YARD, None, Utc::now()).unwrap();

        // per_page=0 reads as the smallest page, not a page that never fills
        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::get()
            .uri("/attendance?per_page=0")
            .insert_header(h1)
            .insert_header(h2)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["per_page"], serde_json::json!(1));
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["total"], serde_json::json!(2));

        // a page far past the data comes back empty instead of wrapping
        let [h1, h2] = as_worker(7);
        let req = test::TestRequest::get()
            .uri(&format!("/attendance?page={}&per_page=100", u64::MAX))
            .insert_header(h1)
            .insert_header(h2)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], serde_json::json!(2));
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
