pub mod errors;
mod models;

use std::time::Duration;
use chrono::NaiveDateTime;
use log::info;
use reqwest::blocking::Client;
use crate::manager_weather::errors::WeatherError;
use crate::manager_weather::models::{PvgisResponse, TmyHour};

pub use crate::manager_weather::models::TmySeries;

pub const PVGIS_BASE_URL: &str = "https://re.jrc.ec.europa.eu";

const TIME_FORMAT: &str = "%Y%m%d:%H%M";

/// Weather manager fetching typical meteorological year data from PVGIS
///
pub struct Weather {
    client: Client,
    base_url: String,
}

impl Weather {

    /// Returns a new instance of Weather
    ///
    /// # Arguments
    ///
    /// * 'base_url' - scheme and host of the PVGIS service
    pub fn new(base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, base_url: base_url.to_string() })
    }

    /// Returns the TMY hourly series for the given coordinates
    ///
    /// # Arguments
    ///
    /// * 'latitude' - latitude in degrees
    /// * 'longitude' - longitude in degrees
    pub fn get_tmy(&self, latitude: f64, longitude: f64) -> Result<TmySeries, WeatherError> {
        let url = format!("{}/api/v5_2/tmy", self.base_url);

        info!("fetching TMY weather for ({}, {})", latitude, longitude);

        let req = self.client.get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("outputformat", "json".to_string()),
            ])
            .send()?;

        let status = req.status();
        if !status.is_success() {
            return Err(WeatherError(format!("{:?}", status)));
        }

        let json = req.text()?;
        let pvgis_res: PvgisResponse = serde_json::from_str(&json)?;

        let series = transform_tmy(pvgis_res.outputs.tmy_hourly)?;
        info!("fetched {} hourly weather records", series.len());

        Ok(series)
    }
}

/// Transforms the PVGIS hourly records into parallel columns with parsed
/// UTC timestamps
///
/// # Arguments
///
/// * 'hours' - the hourly records to transform
fn transform_tmy(hours: Vec<TmyHour>) -> Result<TmySeries, WeatherError> {
    let mut series = TmySeries {
        timestamps: Vec::with_capacity(hours.len()),
        dni: Vec::with_capacity(hours.len()),
        dhi: Vec::with_capacity(hours.len()),
        ghi: Vec::with_capacity(hours.len()),
        temp_air: Vec::with_capacity(hours.len()),
        wind_speed: Vec::with_capacity(hours.len()),
    };

    for hour in hours.into_iter() {
        let timestamp = NaiveDateTime::parse_from_str(&hour.time, TIME_FORMAT)?.and_utc();

        series.timestamps.push(timestamp);
        series.dni.push(hour.dni);
        series.dhi.push(hour.dhi);
        series.ghi.push(hour.ghi);
        series.temp_air.push(hour.temp_air);
        series.wind_speed.push(hour.wind_speed);
    }

    Ok(series)
}
