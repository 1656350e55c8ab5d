use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct PvgisResponse {
    pub outputs: PvgisOutputs,
}

#[derive(Deserialize)]
pub struct PvgisOutputs {
    pub tmy_hourly: Vec<TmyHour>,
}

/// One hourly record of the PVGIS TMY payload
#[derive(Deserialize)]
pub struct TmyHour {
    #[serde(rename = "time(UTC)")]
    pub time: String,
    #[serde(rename = "T2m")]
    pub temp_air: f64,
    #[serde(rename = "G(h)")]
    pub ghi: f64,
    #[serde(rename = "Gb(n)")]
    pub dni: f64,
    #[serde(rename = "Gd(h)")]
    pub dhi: f64,
    #[serde(rename = "WS10m")]
    pub wind_speed: f64,
}

/// A typical meteorological year as parallel hourly columns.
///
/// Timestamps are the UTC instants from the PVGIS payload; the irradiance
/// columns are W/m2, temperature C, wind speed m/s.
#[derive(Clone)]
pub struct TmySeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub dni: Vec<f64>,
    pub dhi: Vec<f64>,
    pub ghi: Vec<f64>,
    pub temp_air: Vec<f64>,
    pub wind_speed: Vec<f64>,
}

impl TmySeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Returns a copy with every irradiance component scaled by the given
    /// factor. Temperature and wind are left untouched.
    pub fn derated(&self, factor: f64) -> Self {
        let scale = |v: &Vec<f64>| v.iter().map(|x| x * factor).collect();

        Self {
            timestamps: self.timestamps.clone(),
            dni: scale(&self.dni),
            dhi: scale(&self.dhi),
            ghi: scale(&self.ghi),
            temp_air: self.temp_air.clone(),
            wind_speed: self.wind_speed.clone(),
        }
    }
}
