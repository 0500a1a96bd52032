use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::geo::Coordinate;
use crate::model::site::SiteId;
use crate::model::worker::WorkerId;

/// One shift: created on check-in, closed once on check-out. An admin
/// correction may rewrite the times, but the first correction stashes the
/// untouched values in the `original_*` fields forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,

    #[schema(example = 7, value_type = u64)]
    pub worker_id: WorkerId,

    #[schema(example = 3, value_type = u64)]
    pub site_id: SiteId,

    #[schema(value_type = String, format = "date-time", example = "2026-08-21T06:58:00Z")]
    pub start_time: DateTime<Utc>,

    pub start_position: Option<Coordinate>,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub end_time: Option<DateTime<Utc>>,

    pub end_position: Option<Coordinate>,

    #[schema(example = false)]
    pub report_submitted: bool,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub original_start_time: Option<DateTime<Utc>>,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub original_end_time: Option<DateTime<Utc>>,

    #[schema(value_type = Option<u64>, nullable = true)]
    pub corrected_by: Option<WorkerId>,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub corrected_at: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Calendar day this shift belongs to, in organization-local time.
    /// A shift crossing midnight stays on its start date.
    pub fn shift_date(&self, tz: FixedOffset) -> NaiveDate {
        self.start_time.with_timezone(&tz).date_naive()
    }
}
