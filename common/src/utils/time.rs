use chrono::DateTime;

/// Renders an epoch-seconds timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
///
/// The remote service frequently omits timestamps on freshly created
/// resources, and clock fields can carry out-of-range values; both cases
/// render as `"Unknown"` rather than failing the listing.
pub fn format_timestamp(seconds: Option<i64>) -> String {
    match seconds.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_seconds_render_as_date_time() {
        // 2024-01-15 12:30:45 UTC
        assert_eq!(format_timestamp(Some(1_705_321_845)), "2024-01-15 12:30:45");
    }

    #[test]
    fn epoch_renders_as_date_time() {
        assert_eq!(format_timestamp(Some(0)), "1970-01-01 00:00:00");
    }

    #[test]
    fn missing_timestamp_renders_unknown() {
        assert_eq!(format_timestamp(None), "Unknown");
    }

    #[test]
    fn out_of_range_timestamp_renders_unknown() {
        assert_eq!(format_timestamp(Some(i64::MAX)), "Unknown");
    }
}
