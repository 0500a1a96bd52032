use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::report::DailyReport;
use crate::model::site::SiteId;
use crate::model::worker::WorkerId;

/// Lookup table over filed reports, keyed by (site, compiling worker,
/// shift date). Matching is exact; there is deliberately no fuzzy path.
#[derive(Debug, Clone, Default)]
pub struct ReportIndex {
    reports: BTreeMap<(SiteId, WorkerId, NaiveDate), DailyReport>,
}

impl ReportIndex {
    /// Files a report under its key. Returns false (and keeps the first
    /// report) if one already exists for the same site, compiler and date.
    pub fn insert(&mut self, report: DailyReport) -> bool {
        let key = (report.site_id, report.worker_id, report.shift_date);
        if self.reports.contains_key(&key) {
            return false;
        }
        self.reports.insert(key, report);
        true
    }

    pub fn find(
        &self,
        site_id: SiteId,
        worker_id: WorkerId,
        shift_date: NaiveDate,
    ) -> Option<&DailyReport> {
        self.reports.get(&(site_id, worker_id, shift_date))
    }

    /// True if anyone at all has filed a report for this site and date.
    pub fn has_report_for_site(&self, site_id: SiteId, shift_date: NaiveDate) -> bool {
        self.reports
            .range((site_id, WorkerId::MIN, shift_date)..=(site_id, WorkerId::MAX, shift_date))
            .any(|((_, _, date), _)| *date == shift_date)
    }
}
