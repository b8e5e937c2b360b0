//! Whole-year age policy.
//!
//! # Invariants
//! - The reference instant is normalized into the birth instant's offset
//!   before any calendar field is compared.
//! - Anniversaries compare (month, day, time-of-day), never day-of-year, so a
//!   Feb-29 birth ages on Mar-1 in non-leap years.
//! - Ages never go negative.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, TimeZone};

/// Returns the number of whole years elapsed between `birth` and `as_of`.
///
/// `as_of` may carry any time zone; it is converted into the zone of `birth`
/// first. A reference earlier than the birth instant yields `0`.
pub fn age_in_years<B, R>(birth: &DateTime<B>, as_of: &DateTime<R>) -> u32
where
    B: TimeZone,
    R: TimeZone,
{
    let birth_local = birth.naive_local();
    let as_of_local = as_of.with_timezone(&birth.timezone()).naive_local();

    let mut years = as_of_local.year() - birth_local.year();
    if anniversary_key(&as_of_local) < anniversary_key(&birth_local) {
        years -= 1;
    }

    u32::try_from(years).unwrap_or(0)
}

fn anniversary_key(value: &NaiveDateTime) -> (u32, u32, NaiveTime) {
    (value.month(), value.day(), value.time())
}

#[cfg(test)]
mod tests {
    use super::age_in_years;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn at(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    #[test]
    fn reference_before_birth_is_zero() {
        let birth = at("2000-06-01T00:00:00Z");
        assert_eq!(age_in_years(&birth, &at("1999-06-01T00:00:00Z")), 0);
        assert_eq!(age_in_years(&birth, &at("2000-05-31T23:59:59Z")), 0);
    }

    #[test]
    fn sub_second_shortfall_on_anniversary_decrements() {
        let birth = at("2000-01-01T12:00:00.500Z");
        assert_eq!(age_in_years(&birth, &at("2010-01-01T12:00:00.499Z")), 9);
        assert_eq!(age_in_years(&birth, &at("2010-01-01T12:00:00.500Z")), 10);
    }

    #[test]
    fn accepts_reference_in_a_different_zone_type() {
        let birth = at("1990-07-15T08:30:00+02:00");
        let as_of = Utc.with_ymd_and_hms(2020, 7, 15, 6, 30, 0).unwrap();
        assert_eq!(age_in_years(&birth, &as_of), 30);

        let one_second_short = Utc.with_ymd_and_hms(2020, 7, 15, 6, 29, 59).unwrap();
        assert_eq!(age_in_years(&birth, &one_second_short), 29);
    }

    #[test]
    fn reference_crossing_midnight_after_normalization() {
        // 2001-01-01T02:00+09:00 is still 2000-12-31 in UTC.
        let birth = at("2000-01-01T00:00:00Z");
        assert_eq!(age_in_years(&birth, &at("2001-01-01T02:00:00+09:00")), 0);
        assert_eq!(age_in_years(&birth, &at("2001-01-01T09:00:00+09:00")), 1);
    }
}
