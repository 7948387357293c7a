//! Korean-locale timestamps as the board displays them.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Wall clock in Korea Standard Time (UTC+9, no daylight saving).
fn kst(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
}

/// `2024. 3. 7.`
pub fn short_date(at: DateTime<Utc>) -> String {
    let local = kst(at);
    format!("{}. {}. {}.", local.year(), local.month(), local.day())
}

/// `2024. 3. 7. 오후 3:04:05`
pub fn date_time(at: DateTime<Utc>) -> String {
    let local = kst(at);
    let (is_pm, hour) = local.hour12();
    let meridiem = if is_pm { "오후" } else { "오전" };
    format!(
        "{} {} {}:{:02}:{:02}",
        short_date(at),
        meridiem,
        hour,
        local.minute(),
        local.second()
    )
}

/// Coarse "how long ago" label. Anything a week or older falls back to
/// the short date.
pub fn relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        return "방금 전".to_string();
    }
    if minutes < 60 {
        return format!("{}분 전", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}시간 전", hours);
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{}일 전", days);
    }
    short_date(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 6, 0, 0).unwrap()
    }

    #[test]
    fn relative_buckets() {
        let now = now();
        assert_eq!(relative(now - Duration::seconds(30), now), "방금 전");
        assert_eq!(relative(now - Duration::minutes(1), now), "1분 전");
        assert_eq!(relative(now - Duration::minutes(59), now), "59분 전");
        assert_eq!(relative(now - Duration::minutes(60), now), "1시간 전");
        assert_eq!(relative(now - Duration::hours(23), now), "23시간 전");
        assert_eq!(relative(now - Duration::hours(24), now), "1일 전");
        assert_eq!(relative(now - Duration::days(6), now), "6일 전");
    }

    #[test]
    fn relative_falls_back_to_kst_date_after_a_week() {
        let now = now();
        // 2024-03-12 20:00 UTC is already the 13th in Seoul.
        let at = Utc.with_ymd_and_hms(2024, 3, 12, 20, 0, 0).unwrap();
        assert_eq!(relative(at, now), "2024. 3. 13.");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = now();
        assert_eq!(relative(now + Duration::minutes(5), now), "방금 전");
    }

    #[test]
    fn date_time_uses_twelve_hour_clock() {
        let afternoon = Utc.with_ymd_and_hms(2024, 3, 7, 6, 4, 5).unwrap();
        assert_eq!(date_time(afternoon), "2024. 3. 7. 오후 3:04:05");

        let midnight = Utc.with_ymd_and_hms(2024, 3, 6, 15, 0, 9).unwrap();
        assert_eq!(date_time(midnight), "2024. 3. 7. 오전 12:00:09");
    }

    #[test]
    fn kst_carries_the_plus_nine_offset() {
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 15, 30, 0).unwrap();
        let local = kst(at);
        assert_eq!(local.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(local.to_rfc3339(), "2025-01-01T00:30:00+09:00");
    }
}
