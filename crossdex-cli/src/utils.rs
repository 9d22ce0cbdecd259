use std::time::Duration;

/// Renders a duration with its two most significant units. Indexing runs
/// span anything from milliseconds (empty selection) to hours (full LLVM).
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1_000 {
        return format!("{ms}ms");
    }
    let secs = ms / 1_000;
    if secs < 60 {
        return format!("{secs}sec {}ms", ms % 1_000);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}min {}sec", secs % 60);
    }
    let hours = mins / 60;
    format!("{hours}h {}min", mins % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_is_millis_only() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn seconds_carry_millis_remainder() {
        assert_eq!(format_duration(Duration::from_millis(1_000)), "1sec 0ms");
        assert_eq!(format_duration(Duration::from_millis(59_999)), "59sec 999ms");
    }

    #[test]
    fn minutes_carry_seconds_remainder() {
        assert_eq!(format_duration(Duration::from_secs(60)), "1min 0sec");
        assert_eq!(format_duration(Duration::from_secs(3_599)), "59min 59sec");
    }

    #[test]
    fn hours_carry_minutes_remainder() {
        assert_eq!(format_duration(Duration::from_secs(3_600)), "1h 0min");
        assert_eq!(format_duration(Duration::from_secs(7_260)), "2h 1min");
    }
}
