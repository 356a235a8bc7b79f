use serde::{Deserialize, Serialize};

/// One normalized forecast entry, either a single day or the current moment.
///
/// All fields are kept as API-native text: timestamps are not reparsed and
/// temperatures stay decimal strings, so the presentation layer decides how
/// to format them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Place name as returned by the API.
    pub city: String,
    /// Forecast date for daily records, last-updated time for the current one.
    pub timestamp: String,
    pub condition: String,
    /// Empty for daily records. Non-empty marks this as the current-conditions
    /// record, whose max/min are borrowed from today's daily aggregate.
    pub current_temp: String,
    pub max_temp: String,
    pub min_temp: String,
    /// Protocol-relative URL fragment, e.g. starting with `//`.
    pub icon_url: String,
    /// Verbatim serialized JSON `hour` array, opaque at this layer and
    /// decoded by the hourly view downstream.
    pub hours_payload: String,
}

impl WeatherRecord {
    /// Whether this record describes the current moment rather than a day.
    pub fn is_current(&self) -> bool {
        !self.current_temp.is_empty()
    }

    /// Temperature line for display: the instantaneous reading for a current
    /// record, the day's max/min range otherwise.
    pub fn display_temp(&self) -> String {
        if self.is_current() {
            format!("{}°C", self.current_temp)
        } else {
            format!("{}°C / {}°C", self.max_temp, self.min_temp)
        }
    }

    /// Fetchable form of the protocol-relative icon URL.
    pub fn icon_https_url(&self) -> String {
        format!("https:{}", self.icon_url)
    }
}

/// Everything one successful fetch produces. Built fresh per fetch and
/// published as a single unit, so observers never see a day list without its
/// matching current record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    /// Current conditions, with max/min/hours cross-referenced from `days[0]`.
    pub current: WeatherRecord,
    /// One record per day, in API response order; day 0 is today.
    pub days: Vec<WeatherRecord>,
}
