//! Selection of items eligible for download.
//!
//! An item qualifies when its status is empty or equals the target status
//! (trimmed, ASCII case-insensitive) and its timestamp falls on or after the
//! start of the recency window. The window starts at 00:00 UTC of the day
//! `days_to_process` days before `now`, so one day means today and yesterday.

use chrono::{DateTime, Days, NaiveTime, Utc};

use crate::item::Item;
use crate::settings::{RunSettings, TimestampField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub target_status: String,
    pub days_to_process: u32,
    pub timestamp_field: TimestampField,
}

impl From<&RunSettings> for FilterCriteria {
    fn from(settings: &RunSettings) -> Self {
        Self {
            target_status: settings.target_status.clone(),
            days_to_process: settings.days_to_process,
            timestamp_field: settings.timestamp_field,
        }
    }
}

impl FilterCriteria {
    pub fn status_matches(&self, status: &str) -> bool {
        let status = status.trim();
        status.is_empty() || status.eq_ignore_ascii_case(self.target_status.trim())
    }

    /// First instant inside the recency window.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let day = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(self.days_to_process)))
            .unwrap_or(chrono::NaiveDate::MIN);
        day.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn matches(&self, item: &Item, window_start: DateTime<Utc>) -> bool {
        if !self.status_matches(&item.status) {
            return false;
        }
        match item.timestamp(self.timestamp_field) {
            Some(ts) => ts >= window_start,
            None => false,
        }
    }
}

/// Keep qualifying items, preserving input order.
pub fn filter_items(items: Vec<Item>, criteria: &FilterCriteria, now: DateTime<Utc>) -> Vec<Item> {
    let start = criteria.window_start(now);
    items
        .into_iter()
        .filter(|item| criteria.matches(item, start))
        .collect()
}
