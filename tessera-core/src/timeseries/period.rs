use chrono::{DateTime, Duration, Months, Utc};
use tessera_types::TesseraError;

/// Convert a period string into inclusive `(start, end)` bounds.
///
/// The period must be a positive integer immediately followed by a single
/// unit designator: `S` seconds, `M` minutes, `H` hours, `d` days, `w`
/// weeks, `m` months, `y` years. The start is obtained by subtracting the
/// offset from `as_of` (or the current UTC time when `as_of` is `None`);
/// months and years use calendar-aware arithmetic.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tessera_core::period_bounds;
///
/// let as_of = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
/// let (start, end) = period_bounds("1m", Some(as_of)).unwrap();
/// assert_eq!(end, as_of);
/// // Calendar-aware: 2024-02-31 does not exist, so the start clamps to 02-29.
/// assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
/// ```
///
/// # Errors
/// Returns [`TesseraError::InvalidArg`] for a malformed period, an unknown
/// unit, a zero value, or a value outside the representable range.
pub fn period_bounds(
    period: &str,
    as_of: Option<DateTime<Utc>>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), TesseraError> {
    let end = as_of.unwrap_or_else(Utc::now);

    let split = period
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(period.len());
    let (digits, unit) = period.split_at(split);

    let invalid = || {
        TesseraError::InvalidArg(format!(
            "invalid period '{period}' (expected '<int><unit>' with unit in {{S, M, H, d, w, m, y}})"
        ))
    };

    if digits.is_empty() || unit.chars().count() != 1 {
        return Err(invalid());
    }
    let value: u32 = digits.parse().map_err(|_| invalid())?;
    if value == 0 {
        return Err(invalid());
    }

    let start = match unit {
        "S" => end.checked_sub_signed(Duration::seconds(i64::from(value))),
        "M" => end.checked_sub_signed(Duration::minutes(i64::from(value))),
        "H" => end.checked_sub_signed(Duration::hours(i64::from(value))),
        "d" => end.checked_sub_signed(Duration::days(i64::from(value))),
        "w" => end.checked_sub_signed(Duration::weeks(i64::from(value))),
        "m" => end.checked_sub_months(Months::new(value)),
        "y" => value
            .checked_mul(12)
            .and_then(|months| end.checked_sub_months(Months::new(months))),
        _ => return Err(invalid()),
    };

    let start = start.ok_or_else(|| {
        TesseraError::InvalidArg(format!("period '{period}' is out of range"))
    })?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn fixed_units() {
        let (start, end) = period_bounds("90S", Some(as_of())).unwrap();
        assert_eq!(end - start, Duration::seconds(90));

        let (start, _) = period_bounds("15M", Some(as_of())).unwrap();
        assert_eq!(as_of() - start, Duration::minutes(15));

        let (start, _) = period_bounds("6H", Some(as_of())).unwrap();
        assert_eq!(as_of() - start, Duration::hours(6));

        let (start, _) = period_bounds("30d", Some(as_of())).unwrap();
        assert_eq!(as_of() - start, Duration::days(30));

        let (start, _) = period_bounds("2w", Some(as_of())).unwrap();
        assert_eq!(as_of() - start, Duration::days(14));
    }

    #[test]
    fn calendar_units() {
        let (start, _) = period_bounds("3m", Some(as_of())).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap());

        let (start, _) = period_bounds("2y", Some(as_of())).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2022, 6, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn malformed_periods_are_rejected() {
        for bad in ["", "d", "10", "10x", "1.5d", "-3d", "0d", "10dd"] {
            assert!(period_bounds(bad, Some(as_of())).is_err(), "{bad}");
        }
    }

    #[test]
    fn default_as_of_is_now() {
        let before = Utc::now();
        let (_, end) = period_bounds("1d", None).unwrap();
        assert!(end >= before);
    }
}
