//! Sensor Fetcher - one HTTP GET against the weather station endpoint
//!
//! The station publishes the current reading as a small JSON document,
//! e.g. `{ "time": 1649061666, "temp": 10.94, "humi": 85.91, "pres": 101957.88 }`.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One environmental reading as reported by the station
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorReading {
    /// Capture time, seconds since epoch
    pub time: i64,
    /// Degrees Celsius
    pub temp: f64,
    /// Percent relative humidity
    pub humi: f64,
    /// Pascals (the display shows hectopascals)
    pub pres: f64,
}

/// Why no valid reading could be obtained.
///
/// Every failure path ends up here - transport, bad status, undecodable
/// body, missing field. The agent renders the same error frame for all of
/// them instead of crashing on a bad remote response.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("sensor endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not parse sensor payload: {0}")]
    Parse(String),
}

/// A source of sensor readings; the agent only ever asks for one.
pub trait FetchSensor {
    fn fetch(&self) -> Result<SensorReading, FetchError>;
}

/// Fetches the reading over HTTP with one blocking GET
pub struct HttpFetcher {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            url: url.into(),
            client,
        }
    }
}

impl FetchSensor for HttpFetcher {
    fn fetch(&self) -> Result<SensorReading, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| FetchError::Transport {
                url: self.url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().map_err(|e| FetchError::Transport {
            url: self.url.clone(),
            source: e,
        })?;

        parse_reading(&body)
    }
}

/// Decode the JSON body into a reading. Partial payloads are a fetch
/// failure, not a partially valid reading.
pub fn parse_reading(body: &str) -> Result<SensorReading, FetchError> {
    let reading: SensorReading =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    if chrono::DateTime::from_timestamp(reading.time, 0).is_none() {
        return Err(FetchError::Parse(format!(
            "timestamp {} out of range",
            reading.time
        )));
    }

    Ok(reading)
}
