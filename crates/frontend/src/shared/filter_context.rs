use chrono::{Datelike, NaiveDate, Utc};
use contracts::dashboards::d404_group_drilldown::{AmbientFilters, DateRange};
use leptos::prelude::*;

/// Глобальные фильтры дашбордов, общие для всех страниц.
/// Dashboards treat the value as an immutable snapshot.
#[derive(Clone, Copy)]
pub struct FilterContext {
    pub filters: RwSignal<AmbientFilters>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self {
            filters: RwSignal::new(default_filters(Utc::now().date_naive())),
        }
    }

    pub fn snapshot(&self) -> AmbientFilters {
        self.filters.get_untracked()
    }

    /// Publish new filters; an identical value does not notify subscribers
    pub fn apply(&self, next: AmbientFilters) {
        if self.filters.with_untracked(|current| current != &next) {
            self.filters.set(next);
        }
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_filter_context() -> FilterContext {
    use_context::<FilterContext>().expect("FilterContext not found")
}

/// С первого числа текущего месяца по сегодня
pub fn default_filters(today: NaiveDate) -> AmbientFilters {
    let from = today.with_day(1).unwrap_or(today);
    AmbientFilters {
        date_range: Some(DateRange { from, to: today }),
        ..Default::default()
    }
}

/// Range from two `<input type="date">` values (yyyy-mm-dd). Reversed bounds
/// are swapped; a blank or malformed bound drops the range.
pub fn date_range_from_inputs(from: &str, to: &str) -> Option<DateRange> {
    let from = NaiveDate::parse_from_str(from.trim(), "%Y-%m-%d").ok()?;
    let to = NaiveDate::parse_from_str(to.trim(), "%Y-%m-%d").ok()?;
    Some(if from <= to {
        DateRange { from, to }
    } else {
        DateRange { from: to, to: from }
    })
}

/// yyyy-mm-dd for a date input
pub fn date_input_value(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
