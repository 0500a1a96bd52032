use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::CoreError;
use crate::core::geo::Coordinate;
use crate::core::linkage::ReportIndex;
use crate::model::shift::AttendanceRecord;
use crate::model::site::SiteId;
use crate::model::worker::WorkerId;

/* ===================== Clock-out decision ===================== */

/// What the clock-out flow must do next for a worker who wants to leave.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckOutDecision {
    /// A report for this shift is already on file: just confirm.
    SimpleConfirm,
    /// No report yet, but someone else is still clocked in at the site,
    /// so the report can be delegated to them.
    AskDelegate,
    /// No report and nobody else left on site: this worker must file the
    /// report before the clock-out goes through.
    ForceReport,
}

/* ===================== Operations ===================== */

/// Opens a shift for the worker at a site.
///
/// `records` is a snapshot of the ledger; any open record for the worker
/// in it rejects the call, so the worker can never hold two open shifts.
pub fn check_in(
    worker_id: WorkerId,
    site_id: SiteId,
    position: Option<Coordinate>,
    now: DateTime<Utc>,
    records: &[AttendanceRecord],
) -> Result<AttendanceRecord, CoreError> {
    if let Some(coord) = &position {
        coord.validate()?;
    }

    if records.iter().any(|r| r.worker_id == worker_id && r.is_open()) {
        return Err(CoreError::ShiftAlreadyOpen { worker_id });
    }

    Ok(AttendanceRecord {
        id: Uuid::new_v4(),
        worker_id,
        site_id,
        start_time: now,
        start_position: position,
        end_time: None,
        end_position: None,
        report_submitted: false,
        original_start_time: None,
        original_end_time: None,
        corrected_by: None,
        corrected_at: None,
    })
}

/// Evaluates the three-way clock-out branch for the worker's open shift.
/// Read-only: callers run it first, resolve the outcome (confirm,
/// delegate, or file the report), and only then call [`check_out`].
pub fn check_out_decision(
    worker_id: WorkerId,
    records: &[AttendanceRecord],
    reports: &ReportIndex,
    tz: FixedOffset,
) -> Result<CheckOutDecision, CoreError> {
    let open = records
        .iter()
        .find(|r| r.worker_id == worker_id && r.is_open())
        .ok_or(CoreError::NoOpenShift { worker_id })?;

    let shift_date = open.shift_date(tz);
    if reports.find(open.site_id, worker_id, shift_date).is_some() {
        return Ok(CheckOutDecision::SimpleConfirm);
    }

    let someone_else_on_site = records
        .iter()
        .any(|r| r.worker_id != worker_id && r.site_id == open.site_id && r.is_open());

    if someone_else_on_site {
        Ok(CheckOutDecision::AskDelegate)
    } else {
        Ok(CheckOutDecision::ForceReport)
    }
}

/// Closes the shift: stamps the end time and position.
pub fn check_out(
    record: &mut AttendanceRecord,
    position: Option<Coordinate>,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    if let Some(coord) = &position {
        coord.validate()?;
    }
    if !record.is_open() {
        return Err(CoreError::NoOpenShift {
            worker_id: record.worker_id,
        });
    }

    record.end_time = Some(now);
    record.end_position = position;
    Ok(())
}

/// Rewrites a record's times on behalf of an administrator.
///
/// The first correction stashes the untouched `start_time`/`end_time`
/// into the `original_*` fields; later corrections keep editing the live
/// values but never touch that snapshot again. `new_end = None` leaves
/// the end time as it is.
pub fn correct(
    record: &mut AttendanceRecord,
    new_start: DateTime<Utc>,
    new_end: Option<DateTime<Utc>>,
    by: WorkerId,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    let effective_end = new_end.or(record.end_time);
    if let Some(end) = effective_end {
        if end < new_start {
            return Err(CoreError::invalid(format!(
                "shift cannot end before it starts ({end} < {new_start})"
            )));
        }
    }

    if record.original_start_time.is_none() {
        record.original_start_time = Some(record.start_time);
        record.original_end_time = record.end_time;
    }

    record.start_time = new_start;
    if new_end.is_some() {
        record.end_time = new_end;
    }
    record.corrected_by = Some(by);
    record.corrected_at = Some(now);
    Ok(())
}
