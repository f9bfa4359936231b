//! Time-series windowing
//!
//! Turns a raw sensor series into the bounded, paginated and optionally zoomed
//! slice that a chart should render. Every step is a pure function over its
//! input; nothing here mutates the series or the selector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sample::Sample;
use crate::selector::WindowSelector;

/// Samples per page
pub const PAGE_SIZE: usize = 20;

/// Minimum time-of-day spacing between two displayed samples
pub const CADENCE_SECONDS: u32 = 20;

/// Inclusive pair of indices into the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub start: usize,
    pub end: usize,
}

impl ZoomRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The samples handed to the chart, with the pagination state that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayWindow {
    pub samples: Vec<Sample>,
    /// Page actually shown, after clamping
    pub page: usize,
    pub total_pages: usize,
    /// Length of the current page before zoom
    pub page_len: usize,
    /// Zoom actually applied, after clamping
    pub zoom: Option<ZoomRange>,
    /// Number of samples left after filtering and dedup
    pub filtered_len: usize,
}

impl DisplayWindow {
    pub fn empty() -> Self {
        Self {
            samples: Vec::new(),
            page: 0,
            total_pages: 1,
            page_len: 0,
            zoom: None,
            filtered_len: 0,
        }
    }
}

/// Keep samples on `day` whose clock label is at or after `threshold`.
///
/// `threshold` is a zero-padded `HH:MM:SS` string, so the string comparison
/// matches chronological order within the day. Samples without a timestamp
/// are dropped.
pub fn filter_day(series: &[Sample], day: NaiveDate, threshold: &str) -> Vec<Sample> {
    series
        .iter()
        .filter(|s| match s.timestamp {
            Some(ts) => ts.date_naive() == day && s.clock_label.as_str() >= threshold,
            None => false,
        })
        .cloned()
        .collect()
}

/// Keep one sample per cadence bucket.
///
/// The first sample is always kept; after that a sample is kept only when at
/// least [`CADENCE_SECONDS`] have passed since the last kept one.
pub fn dedup_by_cadence(samples: &[Sample]) -> Vec<Sample> {
    let mut last_kept: Option<u32> = None;
    samples
        .iter()
        .filter(|s| {
            let Some(secs) = s.seconds_of_day() else {
                return false;
            };
            match last_kept {
                Some(last) if secs < last + CADENCE_SECONDS => false,
                _ => {
                    last_kept = Some(secs);
                    true
                }
            }
        })
        .cloned()
        .collect()
}

/// Number of pages for `len` samples; never less than one
pub fn total_pages(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE).max(1)
}

/// Clamp `page` into range and return it with its slice of `samples`
pub fn page_slice(samples: &[Sample], page: usize) -> (usize, &[Sample]) {
    let page = page.min(total_pages(samples.len()) - 1);
    let start = (page * PAGE_SIZE).min(samples.len());
    let end = (start + PAGE_SIZE).min(samples.len());
    (page, &samples[start..end])
}

/// Clamp a zoom request to a page of `page_len` samples.
///
/// The result always spans at least two samples. Pages shorter than that
/// cannot be zoomed and yield `None`.
pub fn clamp_zoom(zoom: ZoomRange, page_len: usize) -> Option<ZoomRange> {
    if page_len < 2 {
        return None;
    }
    let end = zoom.end.clamp(1, page_len - 1);
    let start = zoom.start.min(end - 1);
    Some(ZoomRange { start, end })
}

/// Derive the window to render for `series` under `selector`
pub fn derive_display_window(series: &[Sample], selector: &WindowSelector) -> DisplayWindow {
    let threshold = selector.hour_label();
    let filtered = filter_day(series, selector.day(), &threshold);
    let deduped = dedup_by_cadence(&filtered);

    let total_pages = total_pages(deduped.len());
    let (page, page_samples) = page_slice(&deduped, selector.page());
    let zoom = selector
        .zoom()
        .and_then(|z| clamp_zoom(z, page_samples.len()));

    let samples = match zoom {
        Some(z) => page_samples[z.start..=z.end].to_vec(),
        None => page_samples.to_vec(),
    };

    DisplayWindow {
        samples,
        page,
        total_pages,
        page_len: page_samples.len(),
        zoom,
        filtered_len: deduped.len(),
    }
}
