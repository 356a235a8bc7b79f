//! Downstream consumer of the opaque per-day hourly payload.
//!
//! The core pipeline carries each day's `hour` array as a verbatim JSON
//! blob; this is where it finally gets decoded for display.

use anyhow::{Context, Result};
use serde::Deserialize;

/// One entry of a day's `hour` array.
#[derive(Debug, Deserialize)]
pub struct HourEntry {
    pub time: String,
    pub temp_c: f64,
    pub condition: HourCondition,
}

#[derive(Debug, Deserialize)]
pub struct HourCondition {
    pub text: String,
}

pub fn decode_hours(payload: &str) -> Result<Vec<HourEntry>> {
    serde_json::from_str(payload).context("Failed to decode hourly forecast payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hour_entries_in_order() {
        let payload = r#"[
            {"time": "2024-01-01 00:00", "temp_c": 2.5, "condition": {"text": "Clear"}},
            {"time": "2024-01-01 01:00", "temp_c": 2.0, "condition": {"text": "Cloudy"}}
        ]"#;

        let hours = decode_hours(payload).unwrap();
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].time, "2024-01-01 00:00");
        assert_eq!(hours[0].condition.text, "Clear");
        assert_eq!(hours[1].temp_c, 2.0);
    }

    #[test]
    fn empty_array_decodes_to_no_hours() {
        assert!(decode_hours("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = decode_hours("{\"not\": \"an array\"}").unwrap_err();
        assert!(err.to_string().contains("hourly forecast payload"));
    }
}
