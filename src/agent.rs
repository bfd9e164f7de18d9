//! The fetch-and-render cycle, one per process invocation

use crate::config::Config;
use crate::display::{self, DisplaySink};
use crate::frame::DisplayFrame;
use crate::light::LightSensor;
use crate::sensor::FetchSensor;
use anyhow::Result;
use chrono::Local;

/// Run one complete cycle: optional light pre-check, fetch, format, render.
///
/// A failed fetch is handled content rather than a failure of the cycle:
/// the error frame is rendered and the process still exits 0. Only display
/// writes and the lux reader can fail the cycle itself.
pub fn run_cycle(
    fetcher: &dyn FetchSensor,
    sink: &mut dyn DisplaySink,
    light: Option<&dyn LightSensor>,
    config: &Config,
) -> Result<()> {
    if let Some(light) = light {
        let lux = light.read_lux()?;
        if lux < config.light.threshold {
            tracing::info!(
                "ambient light {} lux below threshold {}, switching backlight off",
                lux,
                config.light.threshold
            );
            return sink.set_backlight(false);
        }
        tracing::debug!("ambient light {} lux, rendering", lux);
    }

    let frame = match fetcher.fetch() {
        Ok(reading) => {
            tracing::info!(
                "sensor reading: time={} temp={:.2} humi={:.2} pres={:.2}",
                reading.time,
                reading.temp,
                reading.humi,
                reading.pres
            );
            DisplayFrame::data(&reading)
        }
        Err(e) => {
            tracing::warn!("fetch failed: {}", e);
            DisplayFrame::error(&config.sensor_url, Local::now())
        }
    };

    display::render(sink, &frame)
}
