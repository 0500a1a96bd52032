use std::collections::BTreeSet;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::geo::{classify, ComplianceClass, GeoCheck};
use crate::core::linkage::ReportIndex;
use crate::model::schedule::DailySchedule;
use crate::model::shift::AttendanceRecord;
use crate::model::site::{SiteDirectory, SiteId};
use crate::model::worker::WorkerId;

/* ===================== Result shape ===================== */

/// An open shift that has been running longer than the staleness
/// threshold, usually a forgotten check-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StaleShift {
    #[schema(value_type = String, format = "uuid")]
    pub record_id: Uuid,
    #[schema(example = 7, value_type = u64)]
    pub worker_id: WorkerId,
    #[schema(example = 3, value_type = u64)]
    pub site_id: SiteId,
    #[schema(value_type = String, format = "date-time")]
    pub start_time: DateTime<Utc>,
    #[schema(example = 12.5)]
    pub open_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftLeg {
    CheckIn,
    CheckOut,
}

/// A check-in or check-out whose recorded position lands outside the
/// OK band around the site's reference position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PositionAlert {
    #[schema(value_type = String, format = "uuid")]
    pub record_id: Uuid,
    #[schema(example = 7, value_type = u64)]
    pub worker_id: WorkerId,
    #[schema(example = 3, value_type = u64)]
    pub site_id: SiteId,
    pub leg: ShiftLeg,
    pub check: GeoCheck,
}

/// Coverage picture for one calendar date. Derived on demand, never
/// stored, and advisory throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReconciliationResult {
    #[schema(value_type = String, format = "date", example = "2026-08-21")]
    pub date: NaiveDate,
    #[schema(example = 3)]
    pub scheduled_count: usize,
    #[schema(example = 2)]
    pub clocked_in_count: usize,
    /// clocked-in workers over scheduled workers, 0 when nobody was
    /// scheduled.
    #[schema(example = 0.6666666666666666)]
    pub coverage: f64,
    #[schema(value_type = Vec<u64>, example = json!([19]))]
    pub missing_check_ins: Vec<WorkerId>,
    pub stale_open_shifts: Vec<StaleShift>,
    pub position_alerts: Vec<PositionAlert>,
    #[schema(value_type = Vec<u64>, example = json!([4]))]
    pub sites_without_report: Vec<SiteId>,
}

/* ===================== Audit ===================== */

/// The read state one audit run walks: the day's schedule plus ledger,
/// report and site snapshots, all borrowed from the caller.
#[derive(Clone, Copy)]
pub struct DaySnapshot<'a> {
    pub schedule: &'a DailySchedule,
    pub records: &'a [AttendanceRecord],
    pub reports: &'a ReportIndex,
    pub sites: &'a SiteDirectory,
}

/// Recomputes the day's coverage from a consistent snapshot of schedule,
/// ledger and reports. Never fails: missing inputs yield degenerate
/// results instead of errors, and staleness thresholds beyond what
/// chrono can represent saturate.
pub fn reconcile(
    date: NaiveDate,
    snapshot: &DaySnapshot<'_>,
    now: DateTime<Utc>,
    stale_hours: i64,
    tz: FixedOffset,
) -> ReconciliationResult {
    let day_records: Vec<&AttendanceRecord> = snapshot
        .records
        .iter()
        .filter(|record| record.shift_date(tz) == date)
        .collect();

    let scheduled = snapshot.schedule.assigned_workers();
    let clocked_in: BTreeSet<WorkerId> =
        day_records.iter().map(|record| record.worker_id).collect();

    let missing_check_ins: Vec<WorkerId> =
        scheduled.difference(&clocked_in).copied().collect();

    let coverage = if scheduled.is_empty() {
        0.0
    } else {
        clocked_in.len() as f64 / scheduled.len() as f64
    };

    let threshold = Duration::try_hours(stale_hours).unwrap_or_else(|| {
        if stale_hours < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        }
    });
    let stale_open_shifts: Vec<StaleShift> = day_records
        .iter()
        .filter(|record| record.is_open())
        .filter(|record| now.signed_duration_since(record.start_time) > threshold)
        .map(|record| StaleShift {
            record_id: record.id,
            worker_id: record.worker_id,
            site_id: record.site_id,
            start_time: record.start_time,
            open_hours: now.signed_duration_since(record.start_time).num_minutes() as f64 / 60.0,
        })
        .collect();

    let mut position_alerts = Vec::new();
    for record in &day_records {
        let site_position = snapshot.sites.get(record.site_id).and_then(|site| site.position);
        let legs = [
            (ShiftLeg::CheckIn, record.start_position),
            (ShiftLeg::CheckOut, record.end_time.and(record.end_position)),
        ];
        for (leg, position) in legs {
            if let Ok(check) = classify(position, site_position) {
                if matches!(
                    check.class,
                    ComplianceClass::Warn | ComplianceClass::Violation
                ) {
                    position_alerts.push(PositionAlert {
                        record_id: record.id,
                        worker_id: record.worker_id,
                        site_id: record.site_id,
                        leg,
                        check,
                    });
                }
            }
        }
    }

    let sites_without_report: Vec<SiteId> = day_records
        .iter()
        .map(|record| record.site_id)
        .collect::<BTreeSet<SiteId>>()
        .into_iter()
        .filter(|site_id| !snapshot.reports.has_report_for_site(*site_id, date))
        .collect();

    ReconciliationResult {
        date,
        scheduled_count: scheduled.len(),
        clocked_in_count: clocked_in.len(),
        coverage,
        missing_check_ins,
        stale_open_shifts,
        position_alerts,
        sites_without_report,
    }
}
