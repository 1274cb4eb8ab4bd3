//! Business-day dates for forecast horizons

use chrono::{Datelike, Duration, NaiveDate, Weekday};

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn next_business_day(mut date: NaiveDate) -> NaiveDate {
    date += Duration::days(1);
    while !is_business_day(date) {
        date += Duration::days(1);
    }
    date
}

/// `periods` consecutive Monday-to-Friday dates, starting at `start` rolled
/// forward to a weekday
pub fn business_day_range(start: NaiveDate, periods: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(periods);
    if periods == 0 {
        return dates;
    }

    let mut current = start;
    while !is_business_day(current) {
        current += Duration::days(1);
    }
    dates.push(current);
    while dates.len() < periods {
        current = next_business_day(current);
        dates.push(current);
    }

    dates
}

/// `count` business days following `anchor`.
///
/// Built as a `count + 1` range from `anchor` with its first element
/// dropped, so a weekend anchor skips the Monday it rolls onto.
pub fn business_days_after(anchor: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = business_day_range(anchor, count + 1);
    dates.remove(0);
    dates
}
