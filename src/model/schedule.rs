use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::site::SiteId;
use crate::model::worker::WorkerId;

/// Off-duty categories. A worker sits in at most one of them, and never in a
/// category and on a site at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OffDuty {
    #[schema(value_type = Vec<u64>, example = json!([12]))]
    pub holidays: BTreeSet<WorkerId>,

    #[schema(value_type = Vec<u64>, example = json!([]))]
    pub sickness: BTreeSet<WorkerId>,
}

/// One planning day: who is placed where, who is off, and the per-site notes
/// the planners leave for the crews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailySchedule {
    #[schema(value_type = String, format = "date", example = "2026-08-21")]
    pub date: NaiveDate,

    /// site id → workers placed there for the day (no duplicates)
    #[schema(value_type = Object, example = json!({"3": [7, 9]}))]
    pub site_assignments: BTreeMap<SiteId, BTreeSet<WorkerId>>,

    pub off_duty: OffDuty,

    #[schema(value_type = Object, example = json!({"3": "bring the scaffold clamps"}))]
    pub notes: BTreeMap<SiteId, String>,
}

impl DailySchedule {
    pub fn empty(date: NaiveDate) -> Self {
        DailySchedule {
            date,
            site_assignments: BTreeMap::new(),
            off_duty: OffDuty::default(),
            notes: BTreeMap::new(),
        }
    }

    /// Every worker placed on some site for the day. Off-duty workers are
    /// deliberately not part of this set.
    pub fn assigned_workers(&self) -> BTreeSet<WorkerId> {
        self.site_assignments
            .values()
            .flat_map(|workers| workers.iter().copied())
            .collect()
    }
}
