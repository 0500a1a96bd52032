use std::fmt;
use std::str::FromStr;

use crate::core::error::CoreError;
use crate::model::schedule::DailySchedule;
use crate::model::site::{SiteDirectory, SiteId};
use crate::model::worker::WorkerId;

/* ===================== Assignment slots ===================== */

/// Where a transfer can drop a worker: a concrete site, the unassigned
/// pool, or one of the off-duty categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentSlot {
    Pool,
    Holidays,
    Sickness,
    Site(SiteId),
}

impl AssignmentSlot {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, AssignmentSlot::Site(_))
    }
}

impl FromStr for AssignmentSlot {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "POOL" => Ok(AssignmentSlot::Pool),
            "HOLIDAYS" => Ok(AssignmentSlot::Holidays),
            "SICKNESS" => Ok(AssignmentSlot::Sickness),
            other => other
                .parse::<SiteId>()
                .map(AssignmentSlot::Site)
                .map_err(|_| {
                    CoreError::invalid(format!(
                        "target must be a site id, POOL, HOLIDAYS or SICKNESS, got '{other}'"
                    ))
                }),
        }
    }
}

impl fmt::Display for AssignmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentSlot::Pool => write!(f, "POOL"),
            AssignmentSlot::Holidays => write!(f, "HOLIDAYS"),
            AssignmentSlot::Sickness => write!(f, "SICKNESS"),
            AssignmentSlot::Site(id) => write!(f, "{id}"),
        }
    }
}

/* ===================== Transfer algorithm ===================== */

/// Moves `worker_id` into `target` for the day.
///
/// A move clears the worker from everywhere first whenever any of these
/// holds: an explicit `source` site was given, multi-assignment is off,
/// or the target is one of the sentinels. Only a pool-drag onto a site
/// under multi-assignment adds without clearing, which is what lets one
/// worker hold several sites at once. Off-duty categories are always
/// exclusive, so landing on them clears unconditionally.
pub fn transfer(
    schedule: &mut DailySchedule,
    directory: &SiteDirectory,
    worker_id: WorkerId,
    target: AssignmentSlot,
    source: Option<SiteId>,
    multi: bool,
) -> Result<(), CoreError> {
    if let AssignmentSlot::Site(site_id) = target {
        if !directory.contains(site_id) {
            return Err(CoreError::UnknownSite { site_id });
        }
    }

    let clear_all = source.is_some() || !multi || target.is_sentinel();
    if clear_all {
        remove_everywhere(schedule, worker_id);
    }

    match target {
        AssignmentSlot::Pool => {}
        AssignmentSlot::Holidays => {
            schedule.off_duty.holidays.insert(worker_id);
        }
        AssignmentSlot::Sickness => {
            schedule.off_duty.sickness.insert(worker_id);
        }
        AssignmentSlot::Site(site_id) => {
            schedule
                .site_assignments
                .entry(site_id)
                .or_default()
                .insert(worker_id);
        }
    }

    Ok(())
}

/// Drops the worker from every site crew and both off-duty sets.
/// Site entries left with an empty crew are pruned.
pub fn remove_everywhere(schedule: &mut DailySchedule, worker_id: WorkerId) {
    schedule.site_assignments.retain(|_, crew| {
        crew.remove(&worker_id);
        !crew.is_empty()
    });
    schedule.off_duty.holidays.remove(&worker_id);
    schedule.off_duty.sickness.remove(&worker_id);
}

/// Labels for every place the worker sits on this day: site names in
/// site-id order, then "Holidays"/"Sickness". More than one label means
/// the worker is multi-assigned, which planners treat as a flag, not an
/// error.
pub fn locations_of(
    schedule: &DailySchedule,
    directory: &SiteDirectory,
    worker_id: WorkerId,
) -> Vec<String> {
    let mut labels: Vec<String> = schedule
        .site_assignments
        .iter()
        .filter(|(_, crew)| crew.contains(&worker_id))
        .map(|(site_id, _)| match directory.name_of(*site_id) {
            Some(name) => name.to_string(),
            None => format!("Site {site_id}"),
        })
        .collect();

    if schedule.off_duty.holidays.contains(&worker_id) {
        labels.push("Holidays".to_string());
    }
    if schedule.off_duty.sickness.contains(&worker_id) {
        labels.push("Sickness".to_string());
    }

    labels
}

/// Replaces the free-text note on a site for the day. An empty (or
/// whitespace-only) note removes the entry.
pub fn set_note(
    schedule: &mut DailySchedule,
    directory: &SiteDirectory,
    site_id: SiteId,
    note: &str,
) -> Result<(), CoreError> {
    if !directory.contains(site_id) {
        return Err(CoreError::UnknownSite { site_id });
    }

    let trimmed = note.trim();
    if trimmed.is_empty() {
        schedule.notes.remove(&site_id);
    } else {
        schedule.notes.insert(site_id, trimmed.to_string());
    }
    Ok(())
}
