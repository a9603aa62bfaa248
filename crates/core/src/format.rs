//! Human-readable formatting for sizes and timestamps shown on the
//! dashboard.

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Utc,
};

use crate::error::CoreError;

/// Binary (1024-based) size units, smallest first.
const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

const KIB: f64 = 1024.0;

/// Date-time layouts without an offset. These are read as wall-clock time
/// in the target timezone.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%-m/%-d/%Y";
const TIME_FORMAT: &str = "%-I:%M:%S %p";

/// Format a byte count with the largest unit that keeps the value at or
/// above one, using at most two decimals with trailing zeros dropped.
///
/// ```
/// use restore_core::format::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut unit = 0;
    while scaled >= KIB && unit < SIZE_UNITS.len() - 1 {
        scaled /= KIB;
        unit += 1;
    }

    format!("{} {}", trim_decimals(scaled), SIZE_UNITS[unit])
}

/// Round to two decimals, then drop trailing zeros and a dangling point.
fn trim_decimals(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format a timestamp string as `"<date> <time>"` in the local timezone.
///
/// See [`format_date_in`] for the accepted inputs.
pub fn format_date(input: &str) -> Result<String, CoreError> {
    format_date_in(input, &Local)
}

/// Format a timestamp string as `"<date> <time>"` in `tz`.
///
/// Accepts RFC 3339, RFC 2822 (Flask's JSON date encoding), ISO date-times
/// without an offset (read as wall-clock time in `tz`) and bare
/// `YYYY-MM-DD` dates (read as UTC midnight).
pub fn format_date_in<Tz>(input: &str, tz: &Tz) -> Result<String, CoreError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let parsed = parse_date_in(input, tz)?;
    Ok(format!(
        "{} {}",
        parsed.format(DATE_FORMAT),
        parsed.format(TIME_FORMAT)
    ))
}

/// Parse a timestamp string into `tz`.
pub fn parse_date_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Tz>, CoreError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Ok(dt.with_timezone(tz));
    }

    for layout in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, layout) {
            return resolve_local(&naive, tz).ok_or_else(|| {
                CoreError::Validation(format!("{input} is out of range"))
            });
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = date.and_time(NaiveTime::MIN);
        return Ok(Utc.from_utc_datetime(&midnight).with_timezone(tz));
    }

    Err(CoreError::Validation(format!("Unrecognised date: {input:?}")))
}

/// Place a wall-clock time in `tz`.
///
/// An ambiguous time (clocks turned back) takes the earlier instant. A
/// time inside a gap (clocks turned forward) is read with the offset in
/// force before the gap, which moves it forward by the gap's length:
/// 02:30 in a 02:00 to 03:00 gap becomes 03:30.
fn resolve_local<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let before = naive.checked_sub_signed(Duration::days(1))?;
            let offset = tz.offset_from_local_datetime(&before).earliest()?.fix();
            let utc = naive.checked_sub_signed(Duration::seconds(i64::from(
                offset.local_minus_utc(),
            )))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn zero_bytes() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    fn sizes_below_one_kib_stay_in_bytes() {
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
    }

    #[test]
    fn whole_units_drop_decimals() {
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_073_741_824), "1 GB");
        assert_eq!(format_file_size(1_099_511_627_776), "1 TB");
    }

    #[test]
    fn fractional_units_trim_trailing_zeros() {
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1280), "1.25 KB");
        assert_eq!(format_file_size(1_572_864), "1.5 MB");
    }

    #[test]
    fn rounds_to_two_decimals() {
        // 1100 / 1024 = 1.07421875
        assert_eq!(format_file_size(1100), "1.07 KB");
        // Just below 1 MiB rounds up to 1024 KB rather than switching unit.
        assert_eq!(format_file_size(1_048_575), "1024 KB");
    }

    #[test]
    fn sizes_beyond_terabytes_stay_in_terabytes() {
        assert_eq!(format_file_size(1024 * 1_099_511_627_776), "1024 TB");
    }

    #[test]
    fn rfc3339_timestamp() {
        let formatted = format_date_in("2024-01-15T10:30:00Z", &Utc).unwrap();
        assert_eq!(formatted, "1/15/2024 10:30:00 AM");
    }

    #[test]
    fn offset_is_converted_to_target_timezone() {
        let formatted = format_date_in("2024-01-15T22:05:09+02:00", &Utc).unwrap();
        assert_eq!(formatted, "1/15/2024 8:05:09 PM");

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let formatted = format_date_in("2024-01-15T22:05:09Z", &tokyo).unwrap();
        assert_eq!(formatted, "1/16/2024 7:05:09 AM");
    }

    #[test]
    fn rfc2822_timestamp() {
        let formatted = format_date_in("Mon, 15 Jan 2024 10:30:00 GMT", &Utc).unwrap();
        assert_eq!(formatted, "1/15/2024 10:30:00 AM");
    }

    #[test]
    fn naive_timestamp_is_wall_clock_time() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let formatted = format_date_in("2024-03-01 00:00:00.123456", &plus_two).unwrap();
        assert_eq!(formatted, "3/1/2024 12:00:00 AM");

        let formatted = format_date_in("2024-03-01T13:45", &plus_two).unwrap();
        assert_eq!(formatted, "3/1/2024 1:45:00 PM");
    }

    #[test]
    fn bare_date_is_utc_midnight() {
        let formatted = format_date_in("2024-01-15", &Utc).unwrap();
        assert_eq!(formatted, "1/15/2024 12:00:00 AM");

        let behind = FixedOffset::west_opt(5 * 3600).unwrap();
        let formatted = format_date_in("2024-01-15", &behind).unwrap();
        assert_eq!(formatted, "1/14/2024 7:00:00 PM");
    }

    #[test]
    fn local_format_has_date_and_time_separated_by_one_space() {
        let formatted = format_date("2024-01-15T10:30:00Z").unwrap();
        let (date, time) = formatted.split_once(' ').unwrap();

        assert_eq!(date.matches('/').count(), 2);
        assert!(!date.is_empty() && !date.contains(' '));
        assert_eq!(time.matches(':').count(), 2);
        assert!(!time.starts_with(' '));
    }

    /// +01:00 until 2024-03-31T01:00Z, +02:00 after: local 02:00 to 03:00
    /// on that day does not exist.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn switch() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 31)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap()
        }

        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let winter_ok = *local - Duration::hours(1) < Self::switch();
            let summer_ok = *local - Duration::hours(2) >= Self::switch();
            match (winter_ok, summer_ok) {
                (true, false) => LocalResult::Single(Self::winter()),
                (false, true) => LocalResult::Single(Self::summer()),
                (true, true) => LocalResult::Ambiguous(Self::winter(), Self::summer()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn wall_clock_time_in_a_dst_gap_moves_forward() {
        let formatted = format_date_in("2024-03-31T02:30:00", &SpringForward).unwrap();
        assert_eq!(formatted, "3/31/2024 3:30:00 AM");

        let formatted = format_date_in("2024-03-31T01:59:00", &SpringForward).unwrap();
        assert_eq!(formatted, "3/31/2024 1:59:00 AM");

        let formatted = format_date_in("2024-03-31 03:00", &SpringForward).unwrap();
        assert_eq!(formatted, "3/31/2024 3:00:00 AM");
    }

    #[test]
    fn garbage_is_a_validation_error() {
        let err = format_date("not a date").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
