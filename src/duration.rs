/// Convert a gap or elapsed-time string into whole seconds.
///
/// Lenient: empty input, "same time", and anything that is not `M:SS` or
/// `H:MM:SS` (after an optional leading `+`) all come back as 0.
pub fn to_seconds(text: &str) -> u64 {
    let text = text.trim();
    if text.is_empty() || text.to_lowercase().contains("same") {
        return 0;
    }

    let text = text.strip_prefix('+').unwrap_or(text).trim();
    let parts: Option<Vec<u64>> = text.split(':').map(|p| p.trim().parse().ok()).collect();

    let total = match parts.as_deref() {
        Some(&[m, s]) => m.checked_mul(60).and_then(|v| v.checked_add(s)),
        Some(&[h, m, s]) => h
            .checked_mul(3600)
            .and_then(|v| v.checked_add(m.checked_mul(60)?))
            .and_then(|v| v.checked_add(s)),
        _ => None,
    };
    total.unwrap_or(0)
}

/// Format seconds as zero-padded `HH:MM:SS`.
pub fn to_hms(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_and_three_part_durations() {
        assert_eq!(to_seconds("1:23"), 83);
        assert_eq!(to_seconds("+1:23"), 83);
        assert_eq!(to_seconds("+1:02:03"), 3723);
        assert_eq!(to_seconds("10:00:00"), 36000);
        assert_eq!(to_seconds(" + 0:05 "), 5);
    }

    #[test]
    fn unmeasurable_gaps_are_zero() {
        assert_eq!(to_seconds(""), 0);
        assert_eq!(to_seconds("-"), 0);
        assert_eq!(to_seconds("same time"), 0);
        assert_eq!(to_seconds(",,"), 0);
        assert_eq!(to_seconds("Same Time"), 0);
        assert_eq!(to_seconds("12"), 0);
        assert_eq!(to_seconds("1:2:3:4"), 0);
        assert_eq!(to_seconds("1:xx"), 0);
        assert_eq!(to_seconds("-1:00"), 0);
    }

    #[test]
    fn overflowing_parts_are_zero() {
        assert_eq!(to_seconds("+307445734561825861:00"), 0);
        assert_eq!(to_seconds("18446744073709551615:1"), 0);
        assert_eq!(to_seconds("5124095576030432:00:00"), 0);
        assert_eq!(to_seconds("1:18446744073709551615"), 0);
    }

    #[test]
    fn hms_is_zero_padded() {
        assert_eq!(to_hms(0), "00:00:00");
        assert_eq!(to_hms(62), "00:01:02");
        assert_eq!(to_hms(36005), "10:00:05");
        assert_eq!(to_hms(to_seconds("1:2")), "00:01:02");
        assert_eq!(to_hms(to_seconds("+1:02:03")), "01:02:03");
    }
}
