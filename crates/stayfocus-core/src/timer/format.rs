/// Render whole seconds as `MM:SS`. Minutes are not wrapped at an hour.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_both_fields() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(1500), "25:00");
    }

    #[test]
    fn minutes_exceed_sixty() {
        assert_eq!(format_time(3600), "60:00");
        assert_eq!(format_time(6001), "100:01");
    }
}
