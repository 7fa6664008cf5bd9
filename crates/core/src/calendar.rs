//! Whole-day calendar navigation and the two date formats used by the app.
//!
//! All arithmetic is on [`NaiveDate`], never on instants, so year rollover
//! and DST changes cannot skip or repeat a weekday.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::{PedibusError, Result};

/// Walking-bus days, in display order. Wednesday is never a duty day.
pub const DUTY_DAYS: [Weekday; 4] = [Weekday::Mon, Weekday::Tue, Weekday::Thu, Weekday::Fri];

const DATE_KEY_FORMAT: &str = "%Y/%m/%d";
const DISPLAY_FORMAT: &str = "%d/%m";

/// Latest date on or before `reference` falling on `weekday`.
pub fn previous_weekday(weekday: Weekday, reference: NaiveDate) -> NaiveDate {
    let back = days_between(weekday, reference.weekday());
    reference - Days::new(back)
}

/// Earliest date on or after `from` falling on `weekday`.
pub fn next_weekday(weekday: Weekday, from: NaiveDate) -> NaiveDate {
    let ahead = days_between(from.weekday(), weekday);
    from + Days::new(ahead)
}

/// Like [`next_weekday`], for dates typed by a user: fails instead of
/// leaving chrono's calendar.
pub fn checked_next_weekday(weekday: Weekday, from: NaiveDate) -> Result<NaiveDate> {
    from.checked_add_days(Days::new(days_between(from.weekday(), weekday)))
        .filter(|&date| week_fits(date))
        .ok_or_else(|| PedibusError::DateOutOfRange(date_key(from)))
}

/// Move `date` by whole weeks (negative goes back).
pub fn shift_weeks(date: NaiveDate, delta_weeks: i64) -> Result<NaiveDate> {
    let out_of_range = || {
        PedibusError::DateOutOfRange(format!("{} shifted by {delta_weeks} weeks", date_key(date)))
    };
    let days = delta_weeks
        .unsigned_abs()
        .checked_mul(7)
        .map(Days::new)
        .ok_or_else(out_of_range)?;
    let shifted = if delta_weeks < 0 {
        date.checked_sub_days(days)
    } else {
        date.checked_add_days(days)
    };
    shifted.filter(|&date| week_fits(date)).ok_or_else(out_of_range)
}

/// The six days on either side of `date` are representable, so the duty
/// days of its week can be computed without leaving the calendar.
fn week_fits(date: NaiveDate) -> bool {
    date.checked_sub_days(Days::new(6)).is_some() && date.checked_add_days(Days::new(6)).is_some()
}

/// Days to walk forward from `from` to reach `to`, in `0..7`.
fn days_between(from: Weekday, to: Weekday) -> u64 {
    let from = u64::from(from.num_days_from_monday());
    let to = u64::from(to.num_days_from_monday());
    (to + 7 - from) % 7
}

pub fn is_duty_day(date: NaiveDate) -> bool {
    DUTY_DAYS.contains(&date.weekday())
}

/// Storage key: zero-padded `yyyy/mm/dd`, which sorts chronologically.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Short display form `dd/mm`.
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parse a `yyyy/mm/dd` date typed by a user.
pub fn parse_date_key(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date = NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT)
        .map_err(|_| PedibusError::InvalidDate(input.to_string()))?;
    // Reject non-padded input such as 2024/3/5: it would not match stored keys.
    if date_key(date) != trimmed {
        return Err(PedibusError::InvalidDate(input.to_string()));
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn previous_weekday_stays_within_a_week() {
        let weekdays = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        let mut day = ymd(2023, 12, 20);
        while day < ymd(2024, 1, 20) {
            for w in weekdays {
                let found = previous_weekday(w, day);
                assert_eq!(found.weekday(), w);
                assert!(found <= day);
                assert!((day - found).num_days() <= 6);
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn previous_weekday_includes_reference() {
        let friday = ymd(2024, 3, 15);
        assert_eq!(previous_weekday(Weekday::Fri, friday), friday);
        assert_eq!(previous_weekday(Weekday::Mon, friday), ymd(2024, 3, 11));
        assert_eq!(previous_weekday(Weekday::Sat, friday), ymd(2024, 3, 9));
    }

    #[test]
    fn previous_weekday_across_year_boundary() {
        // Friday 2021/01/01: its Monday is in the previous year.
        let friday = ymd(2021, 1, 1);
        assert_eq!(previous_weekday(Weekday::Mon, friday), ymd(2020, 12, 28));
        assert_eq!(previous_weekday(Weekday::Thu, friday), ymd(2020, 12, 31));
    }

    #[test]
    fn next_weekday_includes_start() {
        assert_eq!(next_weekday(Weekday::Fri, ymd(2024, 3, 15)), ymd(2024, 3, 15));
        assert_eq!(next_weekday(Weekday::Fri, ymd(2024, 3, 16)), ymd(2024, 3, 22));
        assert_eq!(next_weekday(Weekday::Fri, ymd(2024, 3, 11)), ymd(2024, 3, 15));
    }

    #[test]
    fn shift_weeks_both_directions() {
        let friday = ymd(2024, 3, 15);
        assert_eq!(shift_weeks(friday, -1).unwrap(), ymd(2024, 3, 8));
        assert_eq!(shift_weeks(friday, 1).unwrap(), ymd(2024, 3, 22));
        assert_eq!(shift_weeks(friday, 0).unwrap(), friday);
        assert_eq!(shift_weeks(ymd(2024, 12, 27), 1).unwrap(), ymd(2025, 1, 3));
    }

    #[test]
    fn shift_weeks_out_of_range_is_an_error() {
        let friday = ymd(2024, 3, 15);
        for delta in [20_000_000, -20_000_000, i64::MAX, i64::MIN] {
            assert!(matches!(
                shift_weeks(friday, delta),
                Err(PedibusError::DateOutOfRange(_))
            ));
        }
        assert!(shift_weeks(NaiveDate::MAX, 0).is_err());
    }

    #[test]
    fn checked_next_weekday_at_calendar_edge() {
        assert_eq!(
            checked_next_weekday(Weekday::Fri, ymd(2024, 3, 11)).unwrap(),
            ymd(2024, 3, 15)
        );
        assert!(matches!(
            checked_next_weekday(Weekday::Fri, NaiveDate::MAX),
            Err(PedibusError::DateOutOfRange(_))
        ));
    }

    #[test]
    fn formats() {
        let d = ymd(2024, 3, 5);
        assert_eq!(date_key(d), "2024/03/05");
        assert_eq!(display_date(d), "05/03");
    }

    #[test]
    fn parse_date_key_is_strict() {
        assert_eq!(parse_date_key("2024/03/15").unwrap(), ymd(2024, 3, 15));
        assert_eq!(parse_date_key(" 2024/03/15 ").unwrap(), ymd(2024, 3, 15));
        assert!(parse_date_key("2024-03-15").is_err());
        assert!(parse_date_key("2024/3/5").is_err());
        assert!(parse_date_key("2024/02/30").is_err());
    }

    #[test]
    fn duty_days_skip_wednesday_and_weekend() {
        assert!(is_duty_day(ymd(2024, 3, 11)));
        assert!(is_duty_day(ymd(2024, 3, 12)));
        assert!(!is_duty_day(ymd(2024, 3, 13)));
        assert!(is_duty_day(ymd(2024, 3, 14)));
        assert!(is_duty_day(ymd(2024, 3, 15)));
        assert!(!is_duty_day(ymd(2024, 3, 16)));
        assert!(!is_duty_day(ymd(2024, 3, 17)));
    }
}
