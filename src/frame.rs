//! Line Formatter - turns a fetch outcome into four LCD rows
//!
//! Pure string work: no I/O, same input always yields the same frame.

use crate::sensor::SensorReading;
use chrono::{DateTime, Local};

/// Timestamp layout on a data frame, `MM/DD/YY HH:MM`
const DATA_TIME_FORMAT: &str = "%m/%d/%y %H:%M";
/// Timestamp layout on an error frame, `MM/DD/YYYY HH:MM:SS`
const ERROR_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Four formatted text lines ready for a 20-column character display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    lines: [String; 4],
}

impl DisplayFrame {
    /// Frame for a valid reading. The reading's own capture time is shown,
    /// converted to local time; pressure arrives in pascals and is shown in
    /// hectopascals.
    pub fn data(reading: &SensorReading) -> Self {
        // Range-checked by the fetcher; epoch is a visible-enough fallback
        let captured = DateTime::from_timestamp(reading.time, 0)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .with_timezone(&Local);

        Self {
            lines: [
                captured.format(DATA_TIME_FORMAT).to_string(),
                format!("Temp. \u{00b0}C: {:.2}\u{00b0}C", reading.temp),
                format!("Humidity: {:.2}%", reading.humi),
                format!("Pressure: {:.2}hPa", reading.pres / 100.0),
            ],
        }
    }

    /// Frame for a failed fetch. The station is unreachable, so the wall
    /// clock stands in for the capture time.
    pub fn error(sensor_url: &str, now: DateTime<Local>) -> Self {
        Self {
            lines: [
                now.format(ERROR_TIME_FORMAT).to_string(),
                "Error get sensordata".to_string(),
                format!("at {}", endpoint_host(sensor_url)),
                "retry in 1 minute".to_string(),
            ],
        }
    }

    pub fn lines(&self) -> &[String; 4] {
        &self.lines
    }
}

/// Host component of the configured endpoint, for the error frame. Falls
/// back to the raw string if the URL does not parse.
fn endpoint_host(sensor_url: &str) -> String {
    reqwest::Url::parse(sensor_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| sensor_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn reading() -> SensorReading {
        SensorReading {
            time: 1700000000,
            temp: 21.34,
            humi: 55.678,
            pres: 101325.0,
        }
    }

    #[test]
    fn test_data_frame_lines() {
        let frame = DisplayFrame::data(&reading());
        let lines = frame.lines();

        assert_eq!(lines[1], "Temp. °C: 21.34°C");
        assert_eq!(lines[2], "Humidity: 55.68%");
        assert_eq!(lines[3], "Pressure: 1013.25hPa");
    }

    #[test]
    fn test_data_frame_timestamp_shape() {
        let frame = DisplayFrame::data(&reading());
        let line1 = &frame.lines()[0];

        // MM/DD/YY HH:MM regardless of the host timezone
        assert!(NaiveDateTime::parse_from_str(line1, "%m/%d/%y %H:%M").is_ok());
        assert_eq!(line1.len(), 14);
    }

    #[test]
    fn test_data_frame_zero_temperature_keeps_decimals() {
        let mut r = reading();
        r.temp = 0.0;
        let frame = DisplayFrame::data(&r);
        assert_eq!(frame.lines()[1], "Temp. °C: 0.00°C");
    }

    #[test]
    fn test_data_frame_rounds_pressure() {
        let mut r = reading();
        r.pres = 99702.678;
        let frame = DisplayFrame::data(&r);
        assert_eq!(frame.lines()[3], "Pressure: 997.03hPa");
    }

    #[test]
    fn test_data_frame_idempotent() {
        let r = reading();
        assert_eq!(DisplayFrame::data(&r), DisplayFrame::data(&r));
    }

    #[test]
    fn test_error_frame_lines() {
        let now = Local::now();
        let frame = DisplayFrame::error("http://weatherpi/getsensor.json", now);
        let lines = frame.lines();

        assert_eq!(lines[1], "Error get sensordata");
        assert_eq!(lines[2], "at weatherpi");
        assert_eq!(lines[3], "retry in 1 minute");
    }

    #[test]
    fn test_error_frame_timestamp_is_fresh() {
        let frame = DisplayFrame::error("http://weatherpi/getsensor.json", Local::now());
        let line1 = &frame.lines()[0];

        let parsed = NaiveDateTime::parse_from_str(line1, "%m/%d/%Y %H:%M:%S").unwrap();
        let parsed = parsed.and_local_timezone(Local).earliest().unwrap();
        let age = Local::now().signed_duration_since(parsed);
        assert!(age.num_seconds().abs() < 5, "stale error timestamp: {}", line1);
    }

    #[test]
    fn test_error_frame_with_unparseable_url() {
        let frame = DisplayFrame::error("weatherpi", Local::now());
        assert_eq!(frame.lines()[2], "at weatherpi");
    }
}
