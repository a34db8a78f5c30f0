//! Timestamp dedup gate.
//!
//! Sensor logs repeat rows when the instrument resamples. A repeated
//! timestamp is still evaluated for alerts but is not re-broadcast.

/// Whether a record stamped `timestamp` should be published, given the
/// timestamp of the last published record.
///
/// Equality only; ordering is not checked. `NaN` never equals anything, so
/// NaN-stamped records are always published.
#[allow(clippy::float_cmp)]
pub fn should_publish(timestamp: f64, last_timestamp: Option<f64>) -> bool {
    last_timestamp.map_or(true, |last| timestamp != last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_always_publishes() {
        assert!(should_publish(0.0, None));
    }

    #[test]
    fn test_repeated_timestamp_is_suppressed() {
        assert!(!should_publish(5.0, Some(5.0)));
    }

    #[test]
    fn test_any_change_publishes() {
        assert!(should_publish(6.0, Some(5.0)));
        // Going backwards is not rejected; only equality matters.
        assert!(should_publish(4.0, Some(5.0)));
    }

    #[test]
    fn test_nan_timestamps_always_publish() {
        assert!(should_publish(f64::NAN, Some(f64::NAN)));
    }
}
