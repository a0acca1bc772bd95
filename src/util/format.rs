// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use chrono::DateTime;

/// Formats a duration in seconds into a human-readable `MM:SS` string.
///
/// This is used for track lengths and the total running time of a vinyl.
///
/// # Arguments
///
/// * `total_seconds` - The duration to format, represented as a 64-bit integer.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_time(65), "01:05");
/// assert_eq!(format_time(3600), "60:00");
/// ```
pub(crate) fn format_time(total_seconds: u64) -> String {
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Formats a probed duration, rounding to the nearest second.
pub(crate) fn format_duration(seconds: f64) -> String {
    format_time(seconds.max(0.0).round() as u64)
}

/// Formats a `played_at` timestamp, or "never" for zero.
pub(crate) fn format_played_at(epoch_seconds: i64) -> String {
    if epoch_seconds == 0 {
        return "never".to_string();
    }

    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| epoch_seconds.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3600), "60:00");
        assert_eq!(format_duration(180.5), "03:01");
        assert_eq!(format_duration(195.25), "03:15");
    }

    #[test]
    fn formats_played_at() {
        assert_eq!(format_played_at(0), "never");
        assert_eq!(format_played_at(86_400), "1970-01-02 00:00");
    }
}
