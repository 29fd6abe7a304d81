//! Time text formatting and parsing.
//!
//! Durations are shown as `M:SS`, switching to `H:MM:SS` from one hour up.
//! Parsing accepts `SS`, `M:SS` or `H:MM:SS` and never fails: a component
//! that is not a number counts as zero, fractions are floored and negative
//! values clamp to zero.

const SECS_PER_HOUR: u64 = 3600;

/// Render whole seconds as `M:SS` or `H:MM:SS`.
pub fn format_secs(secs: u64) -> String {
    let hours = secs / SECS_PER_HOUR;
    let minutes = (secs % SECS_PER_HOUR) / 60;
    let seconds = secs % 60;
    if secs >= SECS_PER_HOUR {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Parse `SS`, `M:SS` or `H:MM:SS` into whole seconds.
///
/// Input with more than three components is treated as malformed and
/// yields `0`.
pub fn parse_secs(text: &str) -> u64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let parts: Vec<u64> = text.split(':').map(parse_component).collect();
    match parts.as_slice() {
        [s] => *s,
        [m, s] => m.saturating_mul(60).saturating_add(*s),
        [h, m, s] => h
            .saturating_mul(SECS_PER_HOUR)
            .saturating_add(m.saturating_mul(60))
            .saturating_add(*s),
        _ => 0,
    }
}

fn parse_component(part: &str) -> u64 {
    match part.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.floor() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_below_an_hour() {
        assert_eq!(format_secs(0), "0:00");
        assert_eq!(format_secs(59), "0:59");
        assert_eq!(format_secs(180), "3:00");
        assert_eq!(format_secs(3599), "59:59");
    }

    #[test]
    fn formats_hours_from_3600() {
        assert_eq!(format_secs(3600), "1:00:00");
        assert_eq!(format_secs(3661), "1:01:01");
        assert_eq!(format_secs(36_000 + 5), "10:00:05");
    }

    #[test]
    fn parses_all_three_shapes() {
        assert_eq!(parse_secs("45"), 45);
        assert_eq!(parse_secs("3:00"), 180);
        assert_eq!(parse_secs("1:02:03"), 3723);
        assert_eq!(parse_secs(" 2:30 "), 150);
    }

    #[test]
    fn seconds_component_may_overflow_a_minute() {
        assert_eq!(parse_secs("90"), 90);
        assert_eq!(parse_secs("1:75"), 135);
    }

    #[test]
    fn malformed_components_count_as_zero() {
        assert_eq!(parse_secs("abc"), 0);
        assert_eq!(parse_secs("x:30"), 30);
        assert_eq!(parse_secs("2:zz"), 120);
        assert_eq!(parse_secs(""), 0);
        assert_eq!(parse_secs("1:2:3:4"), 0);
    }

    #[test]
    fn fractions_floor_and_negatives_clamp() {
        assert_eq!(parse_secs("12.9"), 12);
        assert_eq!(parse_secs("-5"), 0);
        assert_eq!(parse_secs("1:-5"), 60);
    }

    #[test]
    fn parse_reads_back_formatted_values() {
        for secs in [0, 7, 61, 599, 3600, 3725, 86_399] {
            assert_eq!(parse_secs(&format_secs(secs)), secs);
        }
    }
}
