use chrono::{DateTime, Datelike, TimeDelta, Utc, Weekday};
use tessera_types::Frequency;

/// Estimate a representative step (in seconds) from positive adjacent
/// timestamp deltas in the input sequence.
///
/// Prefer the mode (most frequent positive delta); if there is no unique
/// mode, return the lower median.
///
/// Examples
///
/// Unique mode (60s):
///
/// ```
/// use tessera_core::estimate_step_seconds;
/// use chrono::{DateTime, Utc};
///
/// fn t(sec: i64) -> DateTime<Utc> { DateTime::from_timestamp(sec, 0).unwrap() }
///
/// // Adjacent deltas: 60,60,60,120,180  => unique mode is 60
/// let ts = vec![t(0), t(60), t(120), t(180), t(300), t(480)];
/// assert_eq!(estimate_step_seconds(&ts), Some(60));
/// ```
///
/// No unique mode: fall back to lower median (60s):
///
/// ```
/// use tessera_core::estimate_step_seconds;
/// use chrono::{DateTime, Utc};
///
/// fn t(sec: i64) -> DateTime<Utc> { DateTime::from_timestamp(sec, 0).unwrap() }
///
/// // Adjacent deltas: 60,60,120,120  => lower median is 60
/// let ts = vec![t(0), t(60), t(120), t(240), t(360)];
/// assert_eq!(estimate_step_seconds(&ts), Some(60));
/// ```
///
/// The input order does not matter; duplicates are ignored. Returns `None`
/// if fewer than two distinct timestamps are present.
#[must_use]
pub fn estimate_step_seconds(timestamps: &[DateTime<Utc>]) -> Option<i64> {
    if timestamps.len() < 2 {
        return None;
    }
    let mut ts: Vec<DateTime<Utc>> = timestamps.to_vec();
    ts.sort_unstable();

    let mut deltas: Vec<i64> = Vec::with_capacity(ts.len().saturating_sub(1));
    let mut last = ts[0];
    for &cur in ts.iter().skip(1) {
        let dt: TimeDelta = cur - last;
        if dt > TimeDelta::zero() {
            deltas.push(dt.num_seconds());
            last = cur;
        }
    }
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    // Prefer the mode (most frequent positive delta). If there is no unique mode,
    // return the lower median to ensure we pick an actually observed cadence.
    let mut best_delta: i64 = deltas[0];
    let mut best_count: usize = 0;
    let mut num_best_candidates: usize = 0;

    let mut cur_delta: i64 = deltas[0];
    let mut cur_count: usize = 1;
    for &d in deltas.iter().skip(1) {
        if d == cur_delta {
            cur_count += 1;
            continue;
        }
        if cur_count > best_count {
            best_count = cur_count;
            best_delta = cur_delta;
            num_best_candidates = 1;
        } else if cur_count == best_count {
            num_best_candidates = num_best_candidates.saturating_add(1);
        }
        cur_delta = d;
        cur_count = 1;
    }
    // Finalize last run
    if cur_count > best_count {
        best_delta = cur_delta;
        num_best_candidates = 1;
    } else if cur_count == best_count {
        num_best_candidates = num_best_candidates.saturating_add(1);
    }

    if num_best_candidates == 1 {
        return Some(best_delta);
    }

    // Lower median
    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 1 {
        Some(deltas[mid])
    } else {
        Some(deltas[mid - 1])
    }
}

/// Infer a canonical [`Frequency`] from a timestamp sequence.
///
/// The representative step from [`estimate_step_seconds`] is mapped onto the
/// frequency vocabulary. A one-day step is classified as business-day rather
/// than calendar-daily when every timestamp falls on a weekday and at least
/// one weekend-sized (three-day) gap is present; a run of consecutive
/// weekdays with no weekend in range stays calendar-daily.
///
/// Returns `None` when no canonical cadence matches — callers are expected
/// to fall back to a documented default and warn.
///
/// ```
/// use tessera_core::infer_frequency;
/// use tessera_types::Frequency;
/// use chrono::{DateTime, Utc};
///
/// fn t(sec: i64) -> DateTime<Utc> { DateTime::from_timestamp(sec, 0).unwrap() }
///
/// let hourly: Vec<_> = (0..24).map(|i| t(i * 3_600)).collect();
/// assert_eq!(infer_frequency(&hourly), Some(Frequency::Hourly));
///
/// // 2024-01-01 is a Monday; Mon..Fri + next Mon spans a weekend gap.
/// let base = 1_704_067_200; // 2024-01-01T00:00:00Z
/// let days = [0, 1, 2, 3, 4, 7];
/// let business: Vec<_> = days.iter().map(|d| t(base + d * 86_400)).collect();
/// assert_eq!(infer_frequency(&business), Some(Frequency::BusinessDaily));
/// ```
#[must_use]
pub fn infer_frequency(timestamps: &[DateTime<Utc>]) -> Option<Frequency> {
    const DAY: i64 = 86_400;
    const WEEK: i64 = 604_800;

    let step = estimate_step_seconds(timestamps)?;
    match step {
        3_600 => Some(Frequency::Hourly),
        s if s >= 60 && s < DAY && s % 60 == 0 => {
            Some(Frequency::Minutes(u32::try_from(s / 60).ok()?))
        }
        DAY => {
            if is_business_daily(timestamps) {
                Some(Frequency::BusinessDaily)
            } else {
                Some(Frequency::Daily)
            }
        }
        WEEK => Some(Frequency::Weekly),
        _ => None,
    }
}

/// Business-day evidence: every timestamp is a weekday and at least one
/// adjacent gap spans a weekend (three days).
fn is_business_daily(timestamps: &[DateTime<Utc>]) -> bool {
    const DAY: i64 = 86_400;

    if timestamps
        .iter()
        .any(|ts| matches!(ts.weekday(), Weekday::Sat | Weekday::Sun))
    {
        return false;
    }

    let mut ts: Vec<DateTime<Utc>> = timestamps.to_vec();
    ts.sort_unstable();
    ts.windows(2)
        .any(|w| (w[1] - w[0]).num_seconds() == 3 * DAY)
}
