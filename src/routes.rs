use crate::{
    api::{attendance, audit, geo, report, schedule},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let schedule_limiter = Arc::new(build_limiter(config.rate_schedule_per_min));
    let attendance_limiter = Arc::new(build_limiter(config.rate_attendance_per_min));
    let report_limiter = Arc::new(build_limiter(config.rate_report_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/schedule")
                    .wrap(schedule_limiter)
                    // /schedule/{date}
                    .service(
                        web::resource("/{date}").route(web::get().to(schedule::get_schedule)),
                    )
                    // /schedule/{date}/transfer
                    .service(
                        web::resource("/{date}/transfer")
                            .route(web::post().to(schedule::transfer_worker)),
                    )
                    // /schedule/{date}/notes/{site_id}
                    .service(
                        web::resource("/{date}/notes/{site_id}")
                            .route(web::put().to(schedule::put_note)),
                    )
                    // /schedule/{date}/locations/{worker_id}
                    .service(
                        web::resource("/{date}/locations/{worker_id}")
                            .route(web::get().to(schedule::worker_locations)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .wrap(attendance_limiter)
                    // /attendance
                    .service(
                        web::resource("").route(web::get().to(attendance::attendance_list)),
                    )
                    // /attendance/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/check-out/decision
                    .service(
                        web::resource("/check-out/decision")
                            .route(web::get().to(attendance::check_out_decision)),
                    )
                    // /attendance/check-out
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    // /attendance/{record_id}, registered last so named routes win
                    .service(
                        web::resource("/{record_id}")
                            .route(web::put().to(attendance::correct_record)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .wrap(report_limiter)
                    // /reports
                    .service(web::resource("").route(web::post().to(report::submit_report)))
                    // /reports/lookup
                    .service(
                        web::resource("/lookup").route(web::get().to(report::lookup_report)),
                    ),
            )
            .service(
                web::scope("/audit")
                    .wrap(protected_limiter.clone())
                    // /audit/{date}
                    .service(web::resource("/{date}").route(web::get().to(audit::audit_date))),
            )
            .service(
                web::scope("/geo")
                    .wrap(protected_limiter)
                    // /geo/classify
                    .service(
                        web::resource("/classify")
                            .route(web::post().to(geo::classify_positions)),
                    ),
            ),
    );
}

// CHECK-OUT
//  ├─ report filed for (site, worker, shift date)
//  │    └─ SIMPLE_CONFIRM: close the shift
//  ├─ another shift still open at the same site
//  │    └─ ASK_DELEGATE: a colleague can carry the report
//  └─ neither
//       └─ FORCE_REPORT: file the report first, then close

// IDENTITY
//  └─ X-Worker-Id / X-Worker-Role headers (set by the gateway)
//       └─ transfer + notes need supervisor/admin, corrections need admin
