use std::collections::BTreeMap;
use serde::Serialize;

/// One physically distinct roof plane.
///
/// Azimuth follows the weather convention: degrees from north, clockwise,
/// so 180 faces south. Shading is the percentage of obstruction applied to
/// the irradiance reaching this plane.
pub struct Surface {
    pub shading: f64,
    pub tilt: f64,
    pub azimuth: f64,
    pub max_panels: u32,
}

impl Surface {
    pub fn new(shading: f64, tilt: f64, azimuth: f64, max_panels: u32) -> Self {
        Self { shading, tilt, azimuth, max_panels }
    }
}

/// Solar module spec shared by all surfaces of an address.
pub struct SolarModule {
    /// Nameplate DC capacity at STC, watts per panel
    pub capacity: f64,
}

impl SolarModule {
    pub fn new(capacity: f64) -> Self {
        Self { capacity }
    }
}

/// Inverter spec shared by the whole installation.
pub struct Inverter {
    /// Rated DC input capacity, watts
    pub capacity: f64,
    /// Nominal DC to AC conversion efficiency, 0..1
    pub efficiency: f64,
}

impl Inverter {
    pub fn new(capacity: f64, efficiency: f64) -> Self {
        Self { capacity, efficiency }
    }
}

/// A rooftop installation site: coordinates, roof surfaces and the
/// module/inverter hardware. Immutable once built.
pub struct Address {
    pub latitude: f64,
    pub longitude: f64,
    pub surfaces: Vec<Surface>,
    pub solar_module: SolarModule,
    pub inverter: Inverter,
}

impl Address {
    pub fn new(
        latitude: f64,
        longitude: f64,
        surfaces: Vec<Surface>,
        solar_module: SolarModule,
        inverter: Inverter,
    ) -> Self {
        Self { latitude, longitude, surfaces, solar_module, inverter }
    }
}

/// Estimated production for one address over a typical meteorological year.
#[derive(Serialize)]
pub struct Production {
    /// Annual AC energy, kWh
    pub annual_production: f64,
    /// AC energy per calendar month (1-12), kWh
    pub monthly_production: BTreeMap<u32, f64>,
}
