//! Local-era (ROC / 民國) date conversion.
//!
//! Source files write transaction dates as `YYY/M/D` where `YYY` counts years
//! from 1912. `101/11/19` is 2012-11-19.

use chrono::NaiveDate;

/// Years between the local era and the standard calendar.
pub const ROC_EPOCH_OFFSET: i32 = 1911;

/// Convert a `YYY/M/D` local-era date into a calendar date.
///
/// Returns `None` for anything that is not exactly three integer segments
/// forming a valid date.
pub fn convert(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('/');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year.checked_add(ROC_EPOCH_OFFSET)?, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn converts_era_year() {
        assert_eq!(convert("101/11/19"), Some(ymd(2012, 11, 19)));
        assert_eq!(convert("114/1/5"), Some(ymd(2025, 1, 5)));
        assert_eq!(convert("99/02/28"), Some(ymd(2010, 2, 28)));
    }

    #[test]
    fn year_is_always_offset_by_1911() {
        for era_year in [1, 50, 101, 113] {
            let date = convert(&format!("{era_year}/6/15")).unwrap();
            assert_eq!(chrono::Datelike::year(&date), era_year + 1911);
        }
    }

    #[test]
    fn wrong_segment_count_is_missing() {
        assert_eq!(convert("101/11"), None);
        assert_eq!(convert("101/11/19/1"), None);
        assert_eq!(convert(""), None);
        assert_eq!(convert("1011119"), None);
    }

    #[test]
    fn non_integer_segment_is_missing() {
        assert_eq!(convert("101/ab/19"), None);
        assert_eq!(convert("101/11/19.5"), None);
        assert_eq!(convert("2012-11-19"), None);
    }

    #[test]
    fn invalid_calendar_date_is_missing() {
        assert_eq!(convert("101/13/01"), None);
        assert_eq!(convert("13/13/40"), None);
        assert_eq!(convert("102/02/29"), None);
        assert_eq!(convert("101/00/10"), None);
    }

    #[test]
    fn leap_day_in_leap_year() {
        // 2012 is a leap year.
        assert_eq!(convert("101/2/29"), Some(ymd(2012, 2, 29)));
    }
}
