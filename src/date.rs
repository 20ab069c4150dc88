/// Calendar helpers shared by every page
///
/// All date arithmetic in the app happens here, as pure functions over
/// `NaiveDate` values. A fetch window is always derived from an anchor
/// date and passed around by value; nothing mutates a date in place.

use chrono::{Days, Months, NaiveDate};

/// Canonical date-key format shared with the remote API and the like store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date into the YYYY-MM-DD key format.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a YYYY-MM-DD string.
///
/// Returns `None` for anything that is not a real calendar date, which
/// doubles as input validation for the custom-range page.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// An inclusive [start, end] date range requested from the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// The one-month window that ends at `end`.
    ///
    /// Month arithmetic clamps the day-of-month, so a window ending on
    /// 2024-03-31 starts on 2024-02-29.
    pub fn ending_at(end: NaiveDate) -> Self {
        Window {
            start: end - Months::new(1),
            end,
        }
    }

    /// The window immediately before this one: it ends the day before
    /// this window starts and reaches one month further back.
    ///
    /// Windows produced this way never overlap and leave no gap, so no
    /// date is ever fetched twice across pages.
    pub fn preceding(&self) -> Self {
        let end = self.start - Days::new(1);
        Window {
            start: end - Months::new(1),
            end,
        }
    }
}
