use std::{fmt::Display, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::tracker::error::TrackerError;

/// This is the standard way of converting a day to a log file name in habitgrid.
pub fn date_to_log_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Inverse of [date_to_log_name]. Used when walking the records directory.
pub fn parse_log_name(name: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(name, "%Y-%m-%d").ok()
}

/// Strict ISO date parsing for external input. Anything that doesn't parse is
/// an error, there is no silent fallback to today.
pub fn parse_day(value: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| TrackerError::InvalidDate {
        input: value.to_string(),
        source,
    })
}

/// A calendar month. Validates itself on parsing, so a cli argument or a
/// `YYYY-MM` prefix that reaches the store is already a real month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new_opt(year: i32, month: u32) -> Option<Self> {
        if (1000..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("months are validated on construction")
    }

    /// Days of the month in order, with the real month length.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = vec![];
        let mut current = self.first_day();
        while current.year() == self.year && current.month() == self.month {
            days.push(current);
            current = current.succ_opt().expect("End of time should never happen");
        }
        days
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrackerError::InvalidYearMonth(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        YearMonth::new_opt(year, month).ok_or_else(invalid)
    }
}

/// A 4 digit calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Year(i32);

impl Year {
    pub fn new_opt(year: i32) -> Option<Self> {
        (1000..=9999).contains(&year).then_some(Self(year))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.year())
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 1, 1).expect("years are validated on construction")
    }

    /// Every day of the year in order. Includes Dec 31 of a leap year even
    /// though the heatmap later cuts the view at 365 entries.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = vec![];
        let mut current = self.first_day();
        while current.year() == self.0 {
            days.push(current);
            current = current.succ_opt().expect("End of time should never happen");
        }
        days
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for Year {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrackerError::InvalidYear(s.to_string());
        if s.len() != 4 {
            return Err(invalid());
        }
        let year = s.parse::<i32>().map_err(|_| invalid())?;
        Year::new_opt(year).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{parse_day, parse_log_name, Year, YearMonth};

    #[test]
    fn test_parse_day_strict() {
        assert_eq!(
            parse_day("2024-02-27").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 27).unwrap()
        );
        assert!(parse_day("2024-2-27").is_err());
        assert!(parse_day("27/02/2024").is_err());
        assert!(parse_day("2024-02-30").is_err());
        assert!(parse_day("tomorrow").is_err());
    }

    #[test]
    fn test_log_name_round_trip() {
        let day = NaiveDate::from_ymd_opt(2025, 8, 7).unwrap();
        assert_eq!(parse_log_name(&super::date_to_log_name(day)), Some(day));
        assert_eq!(parse_log_name("logs"), None);
    }

    #[test]
    fn test_year_month_parsing() {
        let month = "2024-02".parse::<YearMonth>().unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(month.to_string(), "2024-02");

        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024-00".parse::<YearMonth>().is_err());
        assert!("2024-2".parse::<YearMonth>().is_err());
        assert!("24-02".parse::<YearMonth>().is_err());
        assert!("202402".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_days_respect_length() {
        assert_eq!("2024-02".parse::<YearMonth>().unwrap().days().len(), 29);
        assert_eq!("2023-02".parse::<YearMonth>().unwrap().days().len(), 28);
        assert_eq!("2024-01".parse::<YearMonth>().unwrap().days().len(), 31);
    }

    #[test]
    fn test_year_parsing() {
        let year = "2024".parse::<Year>().unwrap();
        assert_eq!(year.first_day(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(year.days().len(), 366);
        assert_eq!("2023".parse::<Year>().unwrap().days().len(), 365);

        assert!("24".parse::<Year>().is_err());
        assert!("20244".parse::<Year>().is_err());
        assert!("year".parse::<Year>().is_err());
    }
}
