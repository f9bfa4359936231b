//! Viewing intent for the equipment charts

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sample::Sample;
use crate::window::{derive_display_window, DisplayWindow, ZoomRange};

/// Threshold shown when the view is first opened
pub const DEFAULT_HOUR: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => panic!("invalid default hour"),
};

/// Which end of the zoom slider moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomBound {
    Start,
    End,
}

/// Selected day, hour threshold, page and zoom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSelector {
    day: NaiveDate,
    hour: NaiveTime,
    page: usize,
    zoom: Option<ZoomRange>,
}

impl Default for WindowSelector {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl WindowSelector {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            hour: DEFAULT_HOUR,
            page: 0,
            zoom: None,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn hour(&self) -> NaiveTime {
        self.hour
    }

    /// The hour threshold as a zero-padded `HH:MM:SS` label
    pub fn hour_label(&self) -> String {
        self.hour.format("%H:%M:%S").to_string()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn zoom(&self) -> Option<ZoomRange> {
        self.zoom
    }

    /// Select a day; a different day goes back to the first page unzoomed
    pub fn set_day(&mut self, day: NaiveDate) {
        if self.day != day {
            self.day = day;
            self.reset();
        }
    }

    /// Select an hour threshold; a different hour goes back to the first page unzoomed
    pub fn set_hour(&mut self, hour: NaiveTime) {
        if self.hour != hour {
            self.hour = hour;
            self.reset();
        }
    }

    /// Request a page. Out-of-range pages are clamped when the window is derived.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Step back from the page actually shown, which may be below a stale request
    pub fn prev_page(&mut self, total_pages: usize) {
        let shown = self.page.min(total_pages.saturating_sub(1));
        self.page = shown.saturating_sub(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.saturating_sub(1));
    }

    pub fn set_zoom(&mut self, zoom: Option<ZoomRange>) {
        self.zoom = zoom;
    }

    /// Move one end of the zoom slider over a page of `page_len` samples.
    ///
    /// Without an active zoom the slider starts from the full page. The moved
    /// end never crosses the other one.
    pub fn adjust_zoom(&mut self, bound: ZoomBound, value: usize, page_len: usize) {
        if page_len == 0 {
            return;
        }
        let current = self
            .zoom
            .unwrap_or_else(|| ZoomRange::new(0, page_len - 1));
        let next = match bound {
            ZoomBound::Start => ZoomRange::new(value.min(current.end.saturating_sub(1)), current.end),
            ZoomBound::End => ZoomRange::new(current.start, value.max(current.start + 1)),
        };
        self.zoom = Some(next);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = None;
    }

    /// Back to the first page with no zoom
    pub fn reset(&mut self) {
        self.page = 0;
        self.zoom = None;
    }
}

/// The equipment currently charted and how it is being viewed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentView {
    pub equipment: Option<String>,
    pub selector: WindowSelector,
}

impl EquipmentView {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            equipment: None,
            selector: WindowSelector::new(day),
        }
    }

    /// Select equipment to chart; switching equipment resets page and zoom
    pub fn select_equipment(&mut self, name: &str) {
        if self.equipment.as_deref() != Some(name) {
            tracing::debug!("Selected equipment '{}'", name);
            self.equipment = Some(name.to_string());
            self.selector.reset();
        }
    }

    /// Drop the selection if it is `name`. Returns true if it was cleared.
    pub fn clear_equipment_if(&mut self, name: &str) -> bool {
        if self.equipment.as_deref() == Some(name) {
            self.equipment = None;
            self.selector.reset();
            true
        } else {
            false
        }
    }

    pub fn window(&self, series: &[Sample]) -> DisplayWindow {
        if self.equipment.is_none() {
            return DisplayWindow::empty();
        }
        derive_display_window(series, &self.selector)
    }
}

/// Quick-pick hour thresholds, every five minutes of the day
pub fn hour_options() -> Vec<String> {
    (0..24)
        .flat_map(|h| (0..60).step_by(5).map(move |m| format!("{:02}:{:02}:00", h, m)))
        .collect()
}
