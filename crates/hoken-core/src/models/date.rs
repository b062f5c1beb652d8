//! Calendar dates with Japanese era support.

use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Sentinel day meaning "last day of the month".
///
/// Participates only in lexicographic comparison of canonical strings, never
/// in calendar arithmetic.
pub const LAST_DAY: u32 = 99;

/// Japanese era systems plus direct Gregorian years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Era {
    Meiji,
    Taisho,
    Showa,
    Heisei,
    Reiwa,
    Western,
}

impl Era {
    /// Offset added to an era year to obtain the Gregorian year.
    pub fn offset(self) -> i32 {
        match self {
            Era::Meiji => 1867,
            Era::Taisho => 1911,
            Era::Showa => 1925,
            Era::Heisei => 1988,
            Era::Reiwa => 2018,
            Era::Western => 0,
        }
    }

    /// Valid era-year range. Values outside are OCR nonsense and rejected.
    pub fn year_range(self) -> RangeInclusive<u32> {
        match self {
            Era::Meiji => 1..=45,
            Era::Taisho => 1..=15,
            Era::Showa => 1..=64,
            Era::Heisei => 1..=49,
            Era::Reiwa => 1..=99,
            Era::Western => 1900..=2999,
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Era::Meiji => "meiji",
            Era::Taisho => "taisho",
            Era::Showa => "showa",
            Era::Heisei => "heisei",
            Era::Reiwa => "reiwa",
            Era::Western => "western",
        };
        f.write_str(tag)
    }
}

/// A date extracted from an insurance card.
///
/// Comparison and equality use the canonical 8-digit form, so two dates
/// recognized through different eras but naming the same day are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
    era: Era,
    /// Era-relative year as written on the card; `None` for Western dates.
    era_year: Option<u32>,
}

impl CalendarDate {
    /// Build a date from an era-relative year, validating ranges.
    ///
    /// `era_year` is the Gregorian year itself for [`Era::Western`]. Returns
    /// `None` for out-of-range years, bad months/days, and non-sentinel dates
    /// that do not exist on the calendar.
    pub fn new(era: Era, era_year: u32, month: u32, day: u32) -> Option<Self> {
        if !era.year_range().contains(&era_year) {
            return None;
        }
        if !(1..=12).contains(&month) {
            return None;
        }
        if !(1..=31).contains(&day) && day != LAST_DAY {
            return None;
        }
        let year = era_year as i32 + era.offset();
        if day != LAST_DAY && chrono::NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            era,
            era_year: (era != Era::Western).then_some(era_year),
        })
    }

    /// Parse an 8-digit canonical `YYYYMMDD` string as a Western date.
    pub fn parse_canonical(s: &str) -> Option<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: u32 = s[0..4].parse().ok()?;
        let month: u32 = s[4..6].parse().ok()?;
        let day: u32 = s[6..8].parse().ok()?;
        Self::new(Era::Western, year, month, day)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn era(&self) -> Era {
        self.era
    }

    /// Whether the day is the last-day sentinel.
    pub fn is_last_day(&self) -> bool {
        self.day == LAST_DAY
    }

    /// Canonical 8-digit `YYYYMMDD` form.
    pub fn canonical(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }

    /// 6-digit era-relative `YYMMDD` form (MyNumber PIN style): the era year
    /// for Japanese dates, the last two Gregorian digits otherwise.
    pub fn era_form(&self) -> String {
        match self.era_year {
            Some(y) => format!("{:02}{:02}{:02}", y, self.month, self.day),
            None => format!("{:02}{:02}{:02}", self.year % 100, self.month, self.day),
        }
    }
}

impl PartialEq for CalendarDate {
    fn eq(&self, other: &Self) -> bool {
        (self.year, self.month, self.day) == (other.year, other.month, other.day)
    }
}

impl Eq for CalendarDate {}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month, self.day).cmp(&(other.year, other.month, other.day))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_western_canonical() {
        let d = CalendarDate::new(Era::Western, 2021, 1, 22).unwrap();
        assert_eq!(d.canonical(), "20210122");
        assert_eq!(d.era_form(), "210122");
    }

    #[test]
    fn test_era_offsets() {
        let d = CalendarDate::new(Era::Heisei, 3, 2, 22).unwrap();
        assert_eq!(d.canonical(), "19910222");
        assert_eq!(d.era_form(), "030222");

        let d = CalendarDate::new(Era::Showa, 62, 3, 10).unwrap();
        assert_eq!(d.canonical(), "19870310");

        let d = CalendarDate::new(Era::Reiwa, 1, 1, 2).unwrap();
        assert_eq!(d.canonical(), "20190102");
    }

    #[test]
    fn test_year_range_rejected() {
        assert!(CalendarDate::new(Era::Showa, 65, 1, 1).is_none());
        assert!(CalendarDate::new(Era::Taisho, 16, 1, 1).is_none());
        assert!(CalendarDate::new(Era::Western, 1899, 1, 1).is_none());
    }

    #[test]
    fn test_impossible_date_rejected() {
        assert!(CalendarDate::new(Era::Western, 2021, 2, 30).is_none());
        assert!(CalendarDate::new(Era::Western, 2021, 13, 1).is_none());
    }

    #[test]
    fn test_last_day_sentinel() {
        let d = CalendarDate::new(Era::Western, 2021, 2, LAST_DAY).unwrap();
        assert_eq!(d.canonical(), "20210299");
        assert!(d.is_last_day());

        // Lexicographic, not calendar, ordering.
        let feb28 = CalendarDate::new(Era::Western, 2021, 2, 28).unwrap();
        assert!(d > feb28);
        assert!(d.canonical() > feb28.canonical());
    }

    #[test]
    fn test_equality_across_eras() {
        let a = CalendarDate::new(Era::Heisei, 1, 2, 3).unwrap();
        let b = CalendarDate::new(Era::Western, 1989, 2, 3).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.era_form(), b.era_form());
    }

    #[test]
    fn test_canonical_round_trip() {
        for (era, y, m, d) in [
            (Era::Meiji, 40, 12, 31),
            (Era::Showa, 1, 1, 1),
            (Era::Reiwa, 5, 6, 15),
            (Era::Western, 1999, 11, 30),
        ] {
            let date = CalendarDate::new(era, y, m, d).unwrap();
            let reparsed = CalendarDate::parse_canonical(&date.canonical()).unwrap();
            assert_eq!(reparsed.canonical(), date.canonical());
        }
    }
}
