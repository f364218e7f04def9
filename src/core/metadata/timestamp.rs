//! Capture timestamp value type and shared date parsing.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDateTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Earliest year accepted as a real capture date.
///
/// Anything older is a zeroed or censored field (QuickTime files with a
/// zero creation time decode to 1904, cameras with a dead clock to 1970).
pub const MIN_CAPTURE_YEAR: i32 = 1990;

/// Longest local-time gap searched past. Samoa skipped a whole day in 2011.
const MAX_GAP_HOURS: i64 = 25;

/// EXIF `YYYY:MM:DD HH:MM:SS`
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// When a photo or video was captured, as recorded by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureTimestamp {
    /// Wall-clock time with no zone information (EXIF style)
    Naive(NaiveDateTime),
    /// Time with a known UTC offset
    Zoned(DateTime<FixedOffset>),
}

impl CaptureTimestamp {
    /// Calendar year as recorded
    pub fn year(&self) -> i32 {
        match self {
            CaptureTimestamp::Naive(dt) => dt.year(),
            CaptureTimestamp::Zoned(dt) => dt.year(),
        }
    }

    /// Whether this value is recent enough to be a real capture date
    pub fn is_plausible(&self) -> bool {
        self.year() >= MIN_CAPTURE_YEAR
    }

    /// Seconds since the Unix epoch.
    ///
    /// Naive values are read as local time. On a DST fold the earlier
    /// instant is used. Inside a DST gap the offset in force before the
    /// transition applies, so 02:30 in a spring-forward gap lands on the
    /// same instant as 03:30.
    pub fn unix_timestamp(&self) -> i64 {
        match self {
            CaptureTimestamp::Zoned(dt) => dt.timestamp(),
            CaptureTimestamp::Naive(naive) => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.timestamp())
                .unwrap_or_else(|| pre_transition_timestamp(naive)),
        }
    }

    /// Build from a Unix timestamp, rendered in the local timezone
    pub fn from_unix_local(secs: i64) -> Option<Self> {
        let utc = DateTime::from_timestamp(secs, 0)?;
        Some(CaptureTimestamp::Zoned(
            utc.with_timezone(&Local).fixed_offset(),
        ))
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureTimestamp::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CaptureTimestamp::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S %:z")),
        }
    }
}

/// Resolve a local time that does not exist with the offset in force just
/// before it
fn pre_transition_timestamp(naive: &NaiveDateTime) -> i64 {
    let as_utc = naive.and_utc().timestamp();

    (1..=MAX_GAP_HOURS)
        .find_map(|hours| {
            Local
                .from_local_datetime(&(*naive - TimeDelta::hours(hours)))
                .earliest()
        })
        .map(|before| as_utc - i64::from(before.offset().local_minus_utc()))
        .unwrap_or(as_utc)
}

/// Parse an EXIF-style date, tolerating NUL padding and surrounding spaces
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let cleaned = raw.replace('\0', "");
    NaiveDateTime::parse_from_str(cleaned.trim(), EXIF_DATETIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_exif_datetime() {
        assert_eq!(
            parse_exif_datetime("2020:01:02 03:04:05"),
            Some(naive(2020, 1, 2, 3, 4, 5))
        );
    }

    #[test]
    fn exif_parse_strips_nul_padding() {
        assert_eq!(
            parse_exif_datetime("2020:01:02 03:04:05\0\0"),
            Some(naive(2020, 1, 2, 3, 4, 5))
        );
    }

    #[test]
    fn exif_parse_rejects_garbage() {
        assert_eq!(parse_exif_datetime("not a date"), None);
        assert_eq!(parse_exif_datetime("0000:00:00 00:00:00"), None);
    }

    #[test]
    fn plausibility_threshold_is_1990() {
        assert!(CaptureTimestamp::Naive(naive(1990, 1, 1, 0, 0, 0)).is_plausible());
        assert!(!CaptureTimestamp::Naive(naive(1989, 12, 31, 23, 59, 59)).is_plausible());
    }

    #[test]
    fn zoned_unix_timestamp_is_exact() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let dt = offset.with_ymd_and_hms(2021, 5, 6, 10, 8, 9).unwrap();
        let ts = CaptureTimestamp::Zoned(dt);
        assert_eq!(ts.unix_timestamp(), 1_620_284_889);
    }

    #[test]
    fn from_unix_local_round_trips_instant() {
        let ts = CaptureTimestamp::from_unix_local(1_000_000_000).unwrap();
        assert_eq!(ts.unix_timestamp(), 1_000_000_000);
    }

    #[test]
    fn display_includes_offset_for_zoned() {
        let offset = FixedOffset::east_opt(-5 * 3600).unwrap();
        let dt = offset.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            CaptureTimestamp::Zoned(dt).to_string(),
            "2022-03-04 05:06:07 -05:00"
        );
        assert_eq!(
            CaptureTimestamp::Naive(naive(2022, 3, 4, 5, 6, 7)).to_string(),
            "2022-03-04 05:06:07"
        );
    }
}
