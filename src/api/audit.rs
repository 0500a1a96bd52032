use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::actor::Actor;
use crate::config::Config;
use crate::core::audit::{reconcile, DaySnapshot, ReconciliationResult};
use crate::state::AppState;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AuditFilter {
    #[schema(example = 10)]
    /// Hours after which an open shift counts as stale
    pub stale_hours: Option<i64>,
}

/* =========================
Reconciliation audit
========================= */
/// Swagger doc for audit_date endpoint
#[utoipa::path(
    get,
    path = "/api/audit/{date}",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)"),
        AuditFilter
    ),
    responses(
        (status = 200, description = "Coverage picture for the date", body = ReconciliationResult),
        (status = 400, description = "Bad date"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("gateway_identity" = [])
    ),
    tag = "Audit"
)]
pub async fn audit_date(
    _actor: Actor,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    path: web::Path<NaiveDate>,
    query: web::Query<AuditFilter>,
) -> actix_web::Result<impl Responder> {
    let date = path.into_inner();
    let stale_hours = query.stale_hours.unwrap_or(config.stale_shift_hours);

    // consistent-enough snapshots; the audit is advisory and recomputable
    let schedule = state.schedules.get_or_create(date);
    let records = state.shifts.snapshot();
    let reports = state.reports.index_snapshot();

    let result = reconcile(
        date,
        &DaySnapshot {
            schedule: &schedule,
            records: &records,
            reports: &reports,
            sites: state.directory.sites(),
        },
        Utc::now(),
        stale_hours,
        config.org_offset,
    );

    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schedule::{transfer, AssignmentSlot};
    use crate::model::site::Site;
    use crate::model::worker::{Role, Worker};
    use crate::state::Directory;
    use actix_web::{test, App};

    const SITE: u64 = 301;

    fn test_state() -> web::Data<AppState> {
        let workers = (1..=3)
            .map(|id| Worker {
                id,
                full_name: format!("Worker {id}"),
                role: Role::FieldWorker,
                active: true,
            })
            .collect();

        web::Data::new(AppState::new(Directory::new(
            workers,
            vec![Site {
                id: SITE,
                name: "North Yard".to_string(),
                active: true,
                position: None,
            }],
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

    #[actix_web::test]
    async fn audit_reports_coverage_and_missing_workers() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .app_data(test_config())
                .route("/audit/{date}", web::get().to(audit_date)),
        )
        .await;

        let today = Utc::now().date_naive();
        state
            .schedules
            .update(today, |schedule| {
                for worker_id in 1..=3 {
                    transfer(
                        schedule,
                        state.directory.sites(),
                        worker_id,
                        AssignmentSlot::Site(SITE),
                        None,
                        true,
                    )?;
                }
                Ok(())
            })
            .unwrap();

        state.shifts.check_in(1, SITE, None, Utc::now()).unwrap();
        state.shifts.check_in(2, SITE, None, Utc::now()).unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/audit/{today}"))
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "supervisor"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["scheduled_count"], serde_json::json!(3));
        assert_eq!(body["clocked_in_count"], serde_json::json!(2));
        assert_eq!(body["missing_check_ins"], serde_json::json!([3]));
        assert_eq!(body["sites_without_report"], serde_json::json!([SITE]));
    }

    #[actix_web::test]
    async fn stale_threshold_can_be_overridden_per_request() {
        let state = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .app_data(test_config())
                .route("/audit/{date}", web::get().to(audit_date)),
        )
        .await;

        state.shifts.check_in(1, SITE, None, Utc::now()).unwrap();
        let today = Utc::now().date_naive();

        // with the 10h default nothing is stale yet
        let req = test::TestRequest::get()
            .uri(&format!("/audit/{today}"))
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "supervisor"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stale_open_shifts"], serde_json::json!([]));

        // forcing the threshold to zero flags the just-opened shift
        let req = test::TestRequest::get()
            .uri(&format!("/audit/{today}?stale_hours=0"))
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "supervisor"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stale_open_shifts"].as_array().unwrap().len(), 1);

        // a threshold past chrono's range saturates and flags nothing
        let req = test::TestRequest::get()
            .uri(&format!("/audit/{today}?stale_hours={}", i64::MAX))
            .insert_header(("X-Worker-Id", "1"))
            .insert_header(("X-Worker-Role", "supervisor"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stale_open_shifts"], serde_json::json!([]));
    }
}
