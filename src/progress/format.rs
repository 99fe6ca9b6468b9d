//! Fixed-width field formatting for the progress line.

use std::time::Duration;

const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Formats a byte count with binary units.
///
/// Below 10 bytes the raw count is shown. Otherwise the value is scaled to
/// the largest unit it reaches, rounded to one decimal, and printed with a
/// decimal only when it is below 10.
///
/// # Examples
///
/// ```
/// use torkit::progress::format_bytes;
///
/// assert_eq!(format_bytes(9), "9 B");
/// assert_eq!(format_bytes(1536), "1.5 KiB");
/// assert_eq!(format_bytes(10 * 1024 * 1024), "10 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 10 {
        return format!("{} B", bytes);
    }

    let mut exp = 0;
    let mut scale = 1u64;
    while exp + 1 < UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        exp += 1;
    }

    let value = (bytes as f64 / scale as f64 * 10.0 + 0.5).floor() / 10.0;
    if value < 10.0 {
        format!("{:.1} {}", value, UNITS[exp])
    } else {
        format!("{:.0} {}", value, UNITS[exp])
    }
}

/// Formats an elapsed duration as `HH:MM:SS`. Hours keep counting past 99.
pub fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Truncating percentage of `done` in `total`, clamped to 100.
///
/// An empty total counts as complete.
pub fn percent(done: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    (done as u128 * 100 / total as u128).min(100) as u64
}

/// Number of filled cells out of `width` for `done` in `total`.
pub(crate) fn filled(done: u64, total: u64, width: usize) -> usize {
    if total == 0 {
        return width;
    }
    (done as u128 * width as u128 / total as u128).min(width as u128) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_small() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(9), "9 B");
        assert_eq!(format_bytes(10), "10 B");
        assert_eq!(format_bytes(1023), "1023 B");
    }

    #[test]
    fn test_format_bytes_units() {
        assert_eq!(format_bytes(1024), "1.0 KiB");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(1000 * 1024), "1000 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 512 * 1024), "5.5 MiB");
        assert_eq!(format_bytes(100_000_000), "95 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
        assert_eq!(format_bytes(u64::MAX), "16 EiB");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::ZERO), "00:00:00");
        assert_eq!(format_clock(Duration::from_millis(59_999)), "00:00:59");
        assert_eq!(format_clock(Duration::from_secs(3_725)), "01:02:05");
        assert_eq!(format_clock(Duration::from_secs(100 * 3600)), "100:00:00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 1000), 0);
        assert_eq!(percent(999, 1000), 99);
        assert_eq!(percent(1000, 1000), 100);
        assert_eq!(percent(2000, 1000), 100);
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn test_filled() {
        assert_eq!(filled(0, 100, 40), 0);
        assert_eq!(filled(51, 100, 40), 20);
        assert_eq!(filled(100, 100, 40), 40);
        assert_eq!(filled(150, 100, 40), 40);
        assert_eq!(filled(0, 0, 40), 40);
        assert_eq!(filled(50, 100, 0), 0);
    }
}
