//! Display formatting for bill dates and statuses.

use chrono::{DateTime, Datelike, NaiveDate};
use thiserror::Error;

use crate::bill::BillStatus;

/// French abbreviated months, capitalised and cut to three characters.
const MONTHS_FR: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid date '{raw}': {reason}")]
    InvalidDate { raw: String, reason: String },
}

/// Parse a record date. Accepts `YYYY-MM-DD` and full RFC 3339 timestamps.
pub fn parse_bill_date(raw: &str) -> Result<NaiveDate, FormatError> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|e| FormatError::InvalidDate {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Short French date: "2004-04-04" -> "4 Avr. 04"
pub fn format_date(raw: &str) -> Result<String, FormatError> {
    let date = parse_bill_date(raw)?;
    let month = MONTHS_FR[date.month0() as usize];
    Ok(format!(
        "{} {}. {:02}",
        date.day(),
        month,
        date.year().rem_euclid(100)
    ))
}

pub fn format_status(status: BillStatus) -> &'static str {
    status.label()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fixture_dates() {
        assert_eq!(format_date("2004-04-04").unwrap(), "4 Avr. 04");
        assert_eq!(format_date("2003-03-03").unwrap(), "3 Mar. 03");
        assert_eq!(format_date("2002-02-02").unwrap(), "2 Fév. 02");
        assert_eq!(format_date("2001-01-01").unwrap(), "1 Jan. 01");
    }

    #[test]
    fn test_format_two_digit_day_and_year() {
        assert_eq!(format_date("2022-12-25").unwrap(), "25 Déc. 22");
        assert_eq!(format_date("2020-08-10").unwrap(), "10 Aoû. 20");
    }

    #[test]
    fn test_format_rfc3339() {
        assert_eq!(format_date("2021-07-14T10:00:00+00:00").unwrap(), "14 Jui. 21");
    }

    #[test]
    fn test_format_invalid_date() {
        let err = format_date("not-a-date").unwrap_err();
        assert!(matches!(err, FormatError::InvalidDate { ref raw, .. } if raw == "not-a-date"));
        assert!(format_date("2004-13-40").is_err());
        assert!(format_date("").is_err());
    }

    #[test]
    fn test_format_status() {
        assert_eq!(format_status(BillStatus::Pending), "En attente");
        assert_eq!(format_status(BillStatus::Refused), "Refused");
    }
}
