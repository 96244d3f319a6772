//! Days until the next annual occurrence of a date.

use chrono::{Datelike, Local, NaiveDate};

/// The month/day of `birthday` placed in `year`. Feb 29 falls on Mar 1 in
/// non-leap years.
fn occurrence_in(birthday: NaiveDate, year: i32) -> NaiveDate {
    birthday
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(NaiveDate::MAX)
}

/// Days from `today` until the next occurrence of `birthday`'s month/day,
/// `0` when it is today. The year of `birthday` is ignored. Always in `0..366`.
pub fn countdown_from(birthday: NaiveDate, today: NaiveDate) -> i64 {
    let this_year = occurrence_in(birthday, today.year());
    let next = if this_year < today {
        occurrence_in(birthday, today.year() + 1)
    } else {
        this_year
    };
    (next - today).num_days()
}

/// [`countdown_from`] evaluated against the local current date.
pub fn calculate_birthday_countdown(birthday: NaiveDate) -> i64 {
    countdown_from(birthday, Local::now().date_naive())
}
