//! Budget periods, the date windows they cover and the chart time ranges.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, PrimitiveDateTime};

use crate::Error;

/// How often a budget resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Period {
    /// Every period, in the order the forms list them.
    pub const ALL: [Period; 3] = [Period::Weekly, Period::Monthly, Period::Yearly];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::Yearly => "Yearly",
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(Error::InvalidPeriod(other.to_owned())),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: Date,
    pub end: Date,
}

impl Window {
    /// Whether `date_time` falls on a day inside the window.
    pub fn contains(&self, date_time: PrimitiveDateTime) -> bool {
        let date = date_time.date();

        self.start <= date && date <= self.end
    }
}

/// Get the window of `period` that contains `now`.
///
/// Weeks start on Sunday.
pub fn resolve_window(now: PrimitiveDateTime, period: Period) -> Window {
    let today = now.date();

    match period {
        Period::Weekly => {
            let days_since_sunday = today.weekday().number_days_from_sunday() as i64;
            let start = today - Duration::days(days_since_sunday);

            Window {
                start,
                end: start + Duration::days(6),
            }
        }
        Period::Monthly => {
            let start = today - Duration::days(today.day() as i64 - 1);
            let length = days_in_month(today.year(), today.month()) as i64;

            Window {
                start,
                end: start + Duration::days(length - 1),
            }
        }
        Period::Yearly => {
            let start = today - Duration::days(today.ordinal() as i64 - 1);
            let length = time::util::days_in_year(today.year()) as i64;

            Window {
                start,
                end: start + Duration::days(length - 1),
            }
        }
    }
}

/// The time filter for the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    All,
    Month,
    Year,
}

impl TimeRange {
    /// Every range, in the order the range selector lists them.
    pub const ALL: [TimeRange; 3] = [TimeRange::All, TimeRange::Month, TimeRange::Year];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::All => "all",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::All => "All Time",
            TimeRange::Month => "Last Month",
            TimeRange::Year => "Last Year",
        }
    }

    /// The earliest moment kept by this range, or `None` if everything is kept.
    ///
    /// The cutoff is midnight of `now`'s date moved back one calendar month
    /// or year. A day past the end of the target month rolls over into the
    /// next month, e.g. 31 March goes back to 3 March (28 days in February).
    pub fn cutoff(self, now: PrimitiveDateTime) -> Option<PrimitiveDateTime> {
        let today = now.date();

        let (year, month) = match self {
            TimeRange::All => return None,
            TimeRange::Month => match today.month() {
                Month::January => (today.year() - 1, Month::December),
                month => (today.year(), month.previous()),
            },
            TimeRange::Year => (today.year() - 1, today.month()),
        };

        let first_of_month = Date::from_calendar_date(year, month, 1).ok()?;
        let cutoff = first_of_month + Duration::days(today.day() as i64 - 1);

        Some(cutoff.midnight())
    }

    /// Whether a record that happened at `occurred_at` is kept.
    pub fn includes(self, occurred_at: PrimitiveDateTime, now: PrimitiveDateTime) -> bool {
        match self.cutoff(now) {
            Some(cutoff) => occurred_at >= cutoff,
            None => true,
        }
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TimeRange::All),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            other => Err(Error::InvalidTimeRange(other.to_owned())),
        }
    }
}

fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February if time::util::is_leap_year(year) => 29,
        Month::February => 28,
        _ => 31,
    }
}

#[cfg(test)]
mod resolve_window_tests {
    use time::{
        Duration,
        macros::{date, datetime},
    };

    use crate::window::{Period, Window, resolve_window};

    #[test]
    fn monthly_covers_calendar_month() {
        let window = resolve_window(datetime!(2025-03-15 10:30), Period::Monthly);

        assert_eq!(
            window,
            Window {
                start: date!(2025 - 03 - 01),
                end: date!(2025 - 03 - 31),
            }
        );
    }

    #[test]
    fn monthly_handles_leap_february() {
        let window = resolve_window(datetime!(2024-02-10 00:00), Period::Monthly);

        assert_eq!(window.end, date!(2024 - 02 - 29));
    }

    #[test]
    fn weekly_starts_on_previous_sunday() {
        // 2025-03-12 is a Wednesday.
        let window = resolve_window(datetime!(2025-03-12 18:00), Period::Weekly);

        assert_eq!(
            window,
            Window {
                start: date!(2025 - 03 - 09),
                end: date!(2025 - 03 - 15),
            }
        );
    }

    #[test]
    fn weekly_on_sunday_starts_today() {
        let window = resolve_window(datetime!(2025-03-09 00:00), Period::Weekly);

        assert_eq!(window.start, date!(2025 - 03 - 09));
    }

    #[test]
    fn weekly_on_saturday_ends_today() {
        let window = resolve_window(datetime!(2025-03-15 23:59), Period::Weekly);

        assert_eq!(window.start, date!(2025 - 03 - 09));
        assert_eq!(window.end, date!(2025 - 03 - 15));
    }

    #[test]
    fn weekly_crosses_year_boundary() {
        // 2025-01-01 is a Wednesday.
        let window = resolve_window(datetime!(2025-01-01 12:00), Period::Weekly);

        assert_eq!(window.start, date!(2024 - 12 - 29));
        assert_eq!(window.end, date!(2025 - 01 - 04));
    }

    #[test]
    fn yearly_covers_calendar_year() {
        let window = resolve_window(datetime!(2025-07-04 09:00), Period::Yearly);

        assert_eq!(
            window,
            Window {
                start: date!(2025 - 01 - 01),
                end: date!(2025 - 12 - 31),
            }
        );
    }

    #[test]
    fn window_lengths_hold_for_every_day_of_two_years() {
        let mut day = date!(2023 - 01 - 01);

        while day <= date!(2024 - 12 - 31) {
            let now = day.midnight();

            let weekly = resolve_window(now, Period::Weekly);
            assert_eq!(weekly.end - weekly.start, Duration::days(6));
            assert!(weekly.contains(now));

            let monthly = resolve_window(now, Period::Monthly);
            assert_eq!(monthly.start.month(), day.month());
            assert_eq!(monthly.end.month(), day.month());
            assert_eq!((monthly.end + Duration::days(1)).day(), 1);
            assert!(monthly.contains(now));

            let yearly = resolve_window(now, Period::Yearly);
            let want_days = if day.year() == 2024 { 365 } else { 364 };
            assert_eq!(yearly.end - yearly.start, Duration::days(want_days));
            assert!(yearly.contains(now));

            day = day + Duration::days(1);
        }
    }

    #[test]
    fn contains_whole_last_day() {
        let window = resolve_window(datetime!(2025-03-15 10:30), Period::Monthly);

        assert!(window.contains(datetime!(2025-03-31 23:59:59.999)));
        assert!(window.contains(datetime!(2025-03-01 00:00)));
        assert!(!window.contains(datetime!(2025-04-01 00:00)));
        assert!(!window.contains(datetime!(2025-02-28 23:59:59)));
    }
}
