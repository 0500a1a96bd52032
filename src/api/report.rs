use std::collections::BTreeSet;

use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::actor::Actor;
use crate::config::Config;
use crate::core::error::CoreError;
use crate::model::report::DailyReport;
use crate::model::site::SiteId;
use crate::model::worker::WorkerId;
use crate::state::AppState;
use crate::utils::site_cache;

#[derive(Deserialize, ToSchema)]
pub struct SubmitReportRequest {
    #[schema(example = 3, value_type = u64)]
    pub site_id: SiteId,
    /// Defaults to the actor's open shift at the site, or today's date
    #[schema(value_type = Option<String>, format = "date", nullable = true)]
    pub shift_date: Option<NaiveDate>,
    #[schema(example = "Poured footings on the east wing, two pallets left over.")]
    pub description: String,
    #[serde(default)]
    #[schema(example = json!(["photos/2026-08-21/footings-1.jpg"]))]
    pub photos: Vec<String>,
    pub position: Option<crate::core::geo::Coordinate>,
    /// Everyone who worked the site today; the compiler is always added
    #[serde(default)]
    #[schema(value_type = Vec<u64>, example = json!([12, 19]))]
    pub workers_present: Vec<WorkerId>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ReportLookupFilter {
    #[schema(example = 3, value_type = u64)]
    #[param(example = 3, value_type = u64)]
    /// Site the report was filed for
    pub site_id: SiteId,
    #[schema(example = 7, value_type = u64)]
    #[param(example = 7, value_type = u64)]
    /// Worker who compiled the report
    pub worker_id: WorkerId,
    #[schema(example = "2026-08-21", value_type = String, format = "date")]
    #[param(example = "2026-08-21", value_type = String, format = "date")]
    /// Shift date of the report
    pub date: NaiveDate,
}

/* =========================
Submit daily report
========================= */
/// Swagger doc for submit_report endpoint
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body(
        content = SubmitReportRequest,
        description = "End-of-shift report for a site",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Report filed", body = Object, example = json!({
            "message": "Report filed",
            "records_marked": 1
        })),
        (status = 400, description = "Empty description or malformed position"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No worker profile"),
        (status = 404, description = "Unknown site"),
        (status = 409, description = "Already filed", body = Object, example = json!({
            "message": "A report for this site, worker and shift date already exists"
        }))
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Reports"
)]
pub async fn submit_report(
    actor: Actor,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    payload: web::Json<SubmitReportRequest>,
) -> actix_web::Result<impl Responder> {
    // 1️⃣ the compiler must be a known worker
    if state.directory.worker(actor.worker_id).is_none() {
        return Err(actix_web::error::ErrorForbidden("No worker profile"));
    }

    // 2️⃣ the site must exist
    if site_cache::lookup(payload.site_id, &state.directory).await.is_none() {
        return Err(CoreError::UnknownSite {
            site_id: payload.site_id,
        }
        .into());
    }

    // 3️⃣ validate the payload
    if payload.description.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "description must not be empty"
        })));
    }
    if let Some(position) = &payload.position {
        position.validate()?;
    }

    // 4️⃣ resolve the shift date: explicit, else the open shift at this
    // site, else today in organization-local time
    let shift_date = payload.shift_date.unwrap_or_else(|| {
        state
            .shifts
            .open_for(actor.worker_id)
            .filter(|record| record.site_id == payload.site_id)
            .map(|record| record.shift_date(config.org_offset))
            .unwrap_or_else(|| Utc::now().with_timezone(&config.org_offset).date_naive())
    });

    let mut workers_present: BTreeSet<WorkerId> =
        payload.workers_present.iter().copied().collect();
    workers_present.insert(actor.worker_id);

    let report = DailyReport {
        id: Uuid::new_v4(),
        site_id: payload.site_id,
        worker_id: actor.worker_id,
        shift_date,
        description: payload.description.trim().to_string(),
        photos: payload.photos.clone(),
        submitted_at: Utc::now(),
        position: payload.position,
        workers_present,
    };

    // 5️⃣ file it; the first report for a key wins
    if !state.reports.submit(report.clone()) {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "message": "A report for this site, worker and shift date already exists"
        })));
    }

    let records_marked = state.shifts.mark_report_submitted(
        payload.site_id,
        actor.worker_id,
        shift_date,
        config.org_offset,
    );

    tracing::info!(
        worker_id = actor.worker_id,
        site_id = payload.site_id,
        shift_date = %shift_date,
        records_marked,
        "Daily report filed"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Report filed",
        "report": report,
        "records_marked": records_marked
    })))
}

/* =========================
Report lookup
========================= */
/// Swagger doc for lookup_report endpoint
#[utoipa::path(
    get,
    path = "/api/reports/lookup",
    params(ReportLookupFilter),
    responses(
        (status = 200, description = "Report on file", body = DailyReport),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No report for that key", body = Object, example = json!({
            "message": "No report on file for that site, worker and date"
        }))
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Reports"
)]
pub async fn lookup_report(
    _actor: Actor,
    state: web::Data<AppState>,
    query: web::Query<ReportLookupFilter>,
) -> actix_web::Result<impl Responder> {
    match state.reports.find(query.site_id, query.worker_id, query.date) {
        Some(report) => Ok(HttpResponse::Ok().json(report)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "No report on file for that site, worker and date"
        }))),
    }
}
