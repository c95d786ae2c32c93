//! Pre-flight form validation
//!
//! Mirrors the checks the catalog's forms run before submitting: required
//! fields must be non-empty after trimming, dates must parse as YYYY-MM-DD
//! and must not lie in the future. Validation failures never reach the
//! network.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::Error;

/// Trim a required text field, rejecting empty input.
pub fn require(field: &'static str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Required { field });
    }
    Ok(trimmed.to_string())
}

/// Parse a `YYYY-MM-DD` date that must not be in the future.
///
/// The backend stores full timestamps, so the date is widened to midnight
/// UTC, the same normalization the web forms apply.
pub fn past_date(field: &'static str, value: &str) -> Result<DateTime<Utc>, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Required { field });
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        field,
        value: trimmed.to_string(),
    })?;

    if date > Utc::now().date_naive() {
        return Err(Error::FutureDate {
            field,
            value: trimmed.to_string(),
        });
    }

    let midnight = date.and_time(NaiveTime::MIN);
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_trims_and_accepts() {
        assert_eq!(require("nombre", "  Gabriel  ").unwrap(), "Gabriel");
    }

    #[test]
    fn require_rejects_empty_and_whitespace() {
        assert!(matches!(
            require("nombre", ""),
            Err(Error::Required { field: "nombre" })
        ));
        assert!(matches!(require("apellido", "   "), Err(Error::Required { .. })));
    }

    #[test]
    fn past_date_parses_and_widens_to_midnight_utc() {
        let date = past_date("fechaNacimiento", "1927-03-06").unwrap();
        assert_eq!(date.to_rfc3339(), "1927-03-06T00:00:00+00:00");
    }

    #[test]
    fn past_date_accepts_today() {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert!(past_date("fechaPublicacion", &today).is_ok());
    }

    #[test]
    fn unparsable_date_is_rejected() {
        let err = past_date("fechaNacimiento", "06/03/1927").unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }), "got {err:?}");
        assert!(matches!(
            past_date("fechaNacimiento", "not-a-date"),
            Err(Error::InvalidDate { .. })
        ));
    }

    #[test]
    fn future_date_is_rejected() {
        let next_year = (Utc::now().date_naive() + chrono::Days::new(365))
            .format("%Y-%m-%d")
            .to_string();
        let err = past_date("fechaNacimiento", &next_year).unwrap_err();
        assert!(matches!(err, Error::FutureDate { .. }), "got {err:?}");
    }

    #[test]
    fn empty_date_is_required_error() {
        assert!(matches!(
            past_date("fechaNacimiento", "  "),
            Err(Error::Required { .. })
        ));
    }
}
