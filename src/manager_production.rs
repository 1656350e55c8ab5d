use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;
use chrono::Datelike;
use chrono_tz::Tz;
use log::info;
use crate::manager_weather::errors::WeatherError;
use crate::manager_weather::{TmySeries, Weather, PVGIS_BASE_URL};
use crate::model_chain::{
    self, ArraySpec, InverterParams, Location, ModelError, ModuleParams, SystemLosses,
};
use crate::models::{Address, Production};
use crate::timezone::resolve_timezone;

// Temperature coefficient of power, typical for crystalline silicon. [1/C]
const GAMMA_PDC: f64 = -0.004;

const WH_PER_KWH: f64 = 1000.0;

/// Estimates the energy production of a rooftop installation by translating
/// an address into model chain inputs and aggregating the modeled AC output.
///
/// Every call resolves the timezone and fetches a fresh TMY dataset for the
/// address coordinates; nothing is cached between calls.
pub struct SolarSystemProductionService {
    weather: Weather,
}

impl SolarSystemProductionService {

    /// Returns a new instance backed by the public PVGIS service
    pub fn new() -> Result<Self, ProdError> {
        Self::with_base_url(PVGIS_BASE_URL)
    }

    /// Returns a new instance backed by the given weather service host
    ///
    /// # Arguments
    ///
    /// * 'base_url' - scheme and host of the PVGIS compatible service
    pub fn with_base_url(base_url: &str) -> Result<Self, ProdError> {
        Ok(Self { weather: Weather::new(base_url)? })
    }

    /// Returns the estimated annual AC energy in kWh for the given address
    ///
    /// # Arguments
    ///
    /// * 'address' - the installation to estimate
    pub fn get_annual_production(&self, address: &Address) -> Result<f64, ProdError> {
        Ok(self.get_production(address)?.annual_production)
    }

    /// Returns the estimated annual and per month AC energy in kWh for the
    /// given address
    ///
    /// # Arguments
    ///
    /// * 'address' - the installation to estimate
    pub fn get_production(&self, address: &Address) -> Result<Production, ProdError> {
        let timezone = resolve_timezone(address.latitude, address.longitude)?;
        let weather = self.weather.get_tmy(address.latitude, address.longitude)?;

        production_from_weather(address, timezone, &weather)
    }
}

/// Runs the model chain for the address over the given weather year and
/// aggregates the hourly AC output into monthly and annual energy
///
/// # Arguments
///
/// * 'address' - the installation to estimate
/// * 'timezone' - local timezone used to bucket hours into calendar months
/// * 'weather' - unshaded TMY series for the address coordinates
fn production_from_weather(
    address: &Address,
    timezone: Tz,
    weather: &TmySeries,
) -> Result<Production, ProdError> {
    let mut arrays: Vec<ArraySpec> = Vec::with_capacity(address.surfaces.len());
    let mut datasets: Vec<TmySeries> = Vec::with_capacity(address.surfaces.len());

    for surface in &address.surfaces {
        arrays.push(ArraySpec {
            surface_tilt: surface.tilt,
            surface_azimuth: surface.azimuth,
            modules_per_string: surface.max_panels,
            module: ModuleParams {
                pdc0: address.solar_module.capacity,
                gamma_pdc: GAMMA_PDC,
            },
        });

        let shading_coeff = (100.0 - surface.shading) / 100.0;
        datasets.push(weather.derated(shading_coeff));
    }

    let location = Location {
        latitude: address.latitude,
        longitude: address.longitude,
        elevation: 0.0,
    };
    let inverter = InverterParams {
        pdc0: address.inverter.capacity,
        nominal_efficiency: address.inverter.efficiency,
    };

    let ac = model_chain::run_model(
        &location,
        &arrays,
        &datasets,
        &inverter,
        &SystemLosses::default(),
    )?;

    // Hourly series, so one watt sample is one watt hour
    let mut monthly: BTreeMap<u32, f64> = (1..=12).map(|month| (month, 0.0)).collect();
    for (timestamp, watts) in weather.timestamps.iter().zip(ac.iter()) {
        let month = timestamp.with_timezone(&timezone).month();
        if let Some(energy) = monthly.get_mut(&month) {
            *energy += watts / WH_PER_KWH;
        }
    }

    let annual: f64 = monthly.values().sum();
    info!("estimated {:.1} kWh annual production over {} surfaces",
        annual, address.surfaces.len());

    Ok(Production { annual_production: annual, monthly_production: monthly })
}

#[derive(Debug)]
pub struct ProdError(pub String);
impl fmt::Display for ProdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ProdError: {}", self.0)
    }
}
impl From<WeatherError> for ProdError {
    fn from(e: WeatherError) -> Self { ProdError(e.to_string()) }
}
impl From<ModelError> for ProdError {
    fn from(e: ModelError) -> Self { ProdError(e.to_string()) }
}
