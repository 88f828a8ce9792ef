use crate::error::{LiasseError, Result};
use crate::schema::ExercisePeriod;
use chrono::{Datelike, Days, NaiveDate};
use log::warn;

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let year_diff = end.year() - start.year();
    let month_diff = end.month() as i32 - start.month() as i32;
    year_diff * 12 + month_diff
}

/// Number of months covered by the exercise, counting both the opening and
/// the closing month (2023-01-01..2023-12-31 is 12).
pub fn exercise_duration_months(period: &ExercisePeriod) -> i32 {
    months_between(period.start, period.end) + 1
}

/// Rejects an exercise ending before it starts. Exercises that are not 12
/// months long (first or last exercise of an entity) are allowed but logged.
pub fn validate_exercise_period(period: &ExercisePeriod) -> Result<()> {
    if period.end < period.start {
        return Err(LiasseError::InvalidPeriod(format!(
            "exercise ends on {} before it starts on {}",
            period.end, period.start
        )));
    }

    let months = exercise_duration_months(period);
    if months != 12 {
        warn!(
            "Exercise {} to {} covers {} months instead of 12",
            period.start, period.end, months
        );
    }
    if last_day_of_month(period.end.year(), period.end.month()) != Some(period.end) {
        warn!("Exercise closes on {}, which is not a month end", period.end);
    }

    Ok(())
}
