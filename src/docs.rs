use crate::api::attendance::{
    AttendanceFilter, AttendanceListResponse, CheckInRequest, CheckOutRequest, CorrectionRequest,
    DecisionResponse, ShiftResponse,
};
use crate::api::audit::AuditFilter;
use crate::api::geo::ClassifyRequest;
use crate::api::report::{ReportLookupFilter, SubmitReportRequest};
use crate::api::schedule::{LocationsResponse, NoteRequest, TransferRequest};
use crate::core::audit::{PositionAlert, ReconciliationResult, ShiftLeg, StaleShift};
use crate::core::geo::{ComplianceClass, Coordinate, GeoCheck};
use crate::core::ledger::CheckOutDecision;
use crate::model::report::DailyReport;
use crate::model::schedule::{DailySchedule, OffDuty};
use crate::model::shift::AttendanceRecord;
use crate::model::site::Site;
use crate::model::worker::{Role, Worker};
use utoipa::Modify;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SiteCrew Presence API",
        version = "1.0.0",
        description = r#"
## Field Crew Presence Coordination

This API keeps a mobile workforce and its dispatchers in sync: **who is planned
where today, who actually showed up, and whether the paperwork got done**.

### 🔹 Key Features
- **Daily Schedule**
  - Per-date site rosters, holiday/sickness lists, transfers between sites and site notes
- **Shift Tracking**
  - Check-in / check-out with a decision step that routes each check-out to
    `SIMPLE_CONFIRM`, `ASK_DELEGATE` or `FORCE_REPORT`
- **GPS Compliance**
  - Haversine distance against the site position, classified `OK` / `WARN` / `VIOLATION` / `NO_GPS`
- **Daily Reports**
  - One report per site, worker and shift date, with exact-match lookup
- **Reconciliation**
  - End-of-day audit: coverage ratio, missing check-ins, stale open shifts, position alerts

### 🔐 Security
Callers are identified by the **`X-Worker-Id`** and **`X-Worker-Role`** headers,
asserted by the edge gateway in front of this service.
Schedule transfers and notes require **supervisor/admin**; record corrections require **admin**.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

### 🚀 Usage
Use this API to build:
- Dispatcher planning boards
- Field-worker mobile check-in apps
- Back-office compliance dashboards

---
Built with **Rust**, **Actix Web**, **Moka**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::schedule::get_schedule,
        crate::api::schedule::transfer_worker,
        crate::api::schedule::put_note,
        crate::api::schedule::worker_locations,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out_decision,
        crate::api::attendance::check_out,
        crate::api::attendance::correct_record,
        crate::api::attendance::attendance_list,

        crate::api::report::submit_report,
        crate::api::report::lookup_report,

        crate::api::audit::audit_date,

        crate::api::geo::classify_positions
    ),
    components(
        schemas(
            Coordinate,
            ComplianceClass,
            GeoCheck,
            Worker,
            Role,
            Site,
            DailySchedule,
            OffDuty,
            AttendanceRecord,
            DailyReport,
            CheckOutDecision,
            ReconciliationResult,
            StaleShift,
            ShiftLeg,
            PositionAlert,
            TransferRequest,
            NoteRequest,
            LocationsResponse,
            CheckInRequest,
            CheckOutRequest,
            ShiftResponse,
            DecisionResponse,
            CorrectionRequest,
            AttendanceFilter,
            AttendanceListResponse,
            SubmitReportRequest,
            ReportLookupFilter,
            AuditFilter,
            ClassifyRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Schedule", description = "Daily schedule and transfer APIs"),
        (name = "Attendance", description = "Shift check-in / check-out APIs"),
        (name = "Reports", description = "Daily report filing and lookup APIs"),
        (name = "Audit", description = "Day reconciliation APIs"),
        (name = "Geo", description = "Position classification APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "gateway_identity",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "X-Worker-Id",
                    "Worker id asserted by the edge gateway; send X-Worker-Role alongside it",
                ))),
            );
        }
    }
}
