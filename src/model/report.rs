use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::geo::Coordinate;
use crate::model::site::SiteId;
use crate::model::worker::WorkerId;

/// End-of-day report filed from a site by its compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyReport {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,

    #[schema(example = 3, value_type = u64)]
    pub site_id: SiteId,

    /// Worker who compiled the report.
    #[schema(example = 7, value_type = u64)]
    pub worker_id: WorkerId,

    #[schema(value_type = String, format = "date", example = "2026-08-21")]
    pub shift_date: NaiveDate,

    #[schema(example = "Poured footings on the east wing, two pallets left over.")]
    pub description: String,

    #[schema(example = json!(["photos/2026-08-21/footings-1.jpg"]))]
    pub photos: Vec<String>,

    #[schema(value_type = String, format = "date-time", example = "2026-08-21T15:40:00Z")]
    pub submitted_at: DateTime<Utc>,

    pub position: Option<Coordinate>,

    /// Everyone the compiler lists as having worked the site that day,
    /// compiler included.
    #[schema(value_type = Vec<u64>, example = json!([7, 12, 19]))]
    pub workers_present: BTreeSet<WorkerId>,
}
