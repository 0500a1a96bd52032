use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::CoreError;
use crate::core::geo::Coordinate;
use crate::core::ledger;
use crate::core::linkage::ReportIndex;
use crate::model::report::DailyReport;
use crate::model::schedule::DailySchedule;
use crate::model::shift::AttendanceRecord;
use crate::model::site::{Site, SiteDirectory, SiteId};
use crate::model::worker::{Worker, WorkerId};

/* ===================== Reference data ===================== */

/// Workers and sites as delivered by the facility-management collaborator.
/// Loaded once at startup and immutable afterwards.
#[derive(Debug)]
pub struct Directory {
    workers: HashMap<WorkerId, Worker>,
    sites: SiteDirectory,
}

impl Directory {
    /// Builds the directory, dropping any site position that does not pass
    /// coordinate validation so later classification can trust what it reads.
    pub fn new(workers: Vec<Worker>, sites: Vec<Site>) -> Self {
        let sites = sites.into_iter().map(|mut site| {
            if let Some(position) = &site.position {
                if let Err(e) = position.validate() {
                    tracing::warn!(site_id = site.id, error = %e, "dropping bad site position");
                    site.position = None;
                }
            }
            site
        });

        Directory {
            workers: workers.into_iter().map(|w| (w.id, w)).collect(),
            sites: SiteDirectory::new(sites),
        }
    }

    pub fn empty() -> Self {
        Directory {
            workers: HashMap::new(),
            sites: SiteDirectory::new([]),
        }
    }

    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(&id)
    }

    pub fn sites(&self) -> &SiteDirectory {
        &self.sites
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

/// Shape of the reference-data seed file.
#[derive(Debug, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub sites: Vec<Site>,
}

pub fn load_seed(path: &Path) -> Result<SeedData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing seed file {}", path.display()))
}

/* ===================== Schedule store ===================== */

/// Keyed store for daily schedules. All mutation goes through [`update`],
/// which runs the whole read-modify-write under one write lock so a
/// transfer's clear and add land as a unit.
///
/// [`update`]: ScheduleStore::update
#[derive(Debug, Default)]
pub struct ScheduleStore {
    by_date: RwLock<HashMap<NaiveDate, DailySchedule>>,
}

impl ScheduleStore {
    /// Snapshot of the schedule for a date; an empty one if nothing was
    /// written yet. The empty schedule is not persisted by reading it.
    pub fn get_or_create(&self, date: NaiveDate) -> DailySchedule {
        self.by_date
            .read()
            .expect("schedule store poisoned")
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DailySchedule::empty(date))
    }

    /// Atomic read-modify-write for one date. The mutation runs on a
    /// working copy; only a successful mutation is committed, so a failed
    /// transfer neither persists a half-applied move nor lazily creates
    /// the day's schedule.
    pub fn update<F>(&self, date: NaiveDate, mutate: F) -> Result<DailySchedule, CoreError>
    where
        F: FnOnce(&mut DailySchedule) -> Result<(), CoreError>,
    {
        let mut by_date = self.by_date.write().expect("schedule store poisoned");
        let mut working = by_date
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DailySchedule::empty(date));

        mutate(&mut working)?;
        by_date.insert(date, working.clone());
        Ok(working)
    }
}

/* ===================== Shift store ===================== */

/// Ledger of attendance records. Writers take the lock for the whole
/// check-plus-insert, which is what upholds at-most-one-open-shift when
/// two check-ins race.
#[derive(Debug, Default)]
pub struct ShiftStore {
    records: RwLock<Vec<AttendanceRecord>>,
}

impl ShiftStore {
    pub fn check_in(
        &self,
        worker_id: WorkerId,
        site_id: SiteId,
        position: Option<Coordinate>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, CoreError> {
        let mut records = self.records.write().expect("shift store poisoned");
        let record = ledger::check_in(worker_id, site_id, position, now, &records)?;
        records.push(record.clone());
        Ok(record)
    }

    /// Closes the worker's open shift, if any.
    pub fn close_open(
        &self,
        worker_id: WorkerId,
        position: Option<Coordinate>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, CoreError> {
        let mut records = self.records.write().expect("shift store poisoned");
        let record = records
            .iter_mut()
            .find(|r| r.worker_id == worker_id && r.is_open())
            .ok_or(CoreError::NoOpenShift { worker_id })?;

        ledger::check_out(record, position, now)?;
        Ok(record.clone())
    }

    /// Point update for the privileged correction. `Ok(None)` means no
    /// record carries that id.
    pub fn apply_correction(
        &self,
        record_id: Uuid,
        new_start: DateTime<Utc>,
        new_end: Option<DateTime<Utc>>,
        by: WorkerId,
        now: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, CoreError> {
        let mut records = self.records.write().expect("shift store poisoned");
        let record = match records.iter_mut().find(|r| r.id == record_id) {
            Some(record) => record,
            None => return Ok(None),
        };

        ledger::correct(record, new_start, new_end, by, now)?;
        Ok(Some(record.clone()))
    }

    /// Flips `report_submitted` on the compiler's records for that site
    /// and shift date. Returns how many records were touched.
    pub fn mark_report_submitted(
        &self,
        site_id: SiteId,
        worker_id: WorkerId,
        shift_date: NaiveDate,
        tz: FixedOffset,
    ) -> usize {
        let mut records = self.records.write().expect("shift store poisoned");
        let mut touched = 0;
        for record in records.iter_mut() {
            if record.site_id == site_id
                && record.worker_id == worker_id
                && record.shift_date(tz) == shift_date
                && !record.report_submitted
            {
                record.report_submitted = true;
                touched += 1;
            }
        }
        touched
    }

    pub fn snapshot(&self) -> Vec<AttendanceRecord> {
        self.records.read().expect("shift store poisoned").clone()
    }

    pub fn open_for(&self, worker_id: WorkerId) -> Option<AttendanceRecord> {
        self.records
            .read()
            .expect("shift store poisoned")
            .iter()
            .find(|r| r.worker_id == worker_id && r.is_open())
            .cloned()
    }
}

/* ===================== Report store ===================== */

#[derive(Debug, Default)]
pub struct ReportStore {
    index: RwLock<ReportIndex>,
}

impl ReportStore {
    /// False when a report already sits under the same (site, worker,
    /// date) key; the first filing wins.
    pub fn submit(&self, report: DailyReport) -> bool {
        self.index
            .write()
            .expect("report store poisoned")
            .insert(report)
    }

    pub fn find(
        &self,
        site_id: SiteId,
        worker_id: WorkerId,
        shift_date: NaiveDate,
    ) -> Option<DailyReport> {
        self.index
            .read()
            .expect("report store poisoned")
            .find(site_id, worker_id, shift_date)
            .cloned()
    }

    pub fn index_snapshot(&self) -> ReportIndex {
        self.index.read().expect("report store poisoned").clone()
    }
}

/* ===================== App state ===================== */

pub struct AppState {
    pub directory: Directory,
    pub schedules: ScheduleStore,
    pub shifts: ShiftStore,
    pub reports: ReportStore,
}

impl AppState {
    pub fn new(directory: Directory) -> Self {
        AppState {
            directory,
            schedules: ScheduleStore::default(),
            shifts: ShiftStore::default(),
            reports: ReportStore::default(),
        }
    }
}
