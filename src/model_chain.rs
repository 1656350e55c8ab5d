use std::fmt;
use std::fmt::Formatter;
use chrono::Datelike;
use solar_positioning::spa;
use solar_positioning::time::DeltaT;
use solar_positioning::types::RefractionCorrection;
use crate::manager_weather::TmySeries;

// SAPM cell temperature coefficients, open rack glass/glass mounting
const SAPM_A: f64 = -3.47;
const SAPM_B: f64 = -0.0594;
const SAPM_DELTA_T: f64 = 3.0;

// Ground reflectance, typical grass/soil
const ALBEDO: f64 = 0.2;

// Reference conditions for the PVWatts DC model
const STC_IRRADIANCE: f64 = 1000.0;
const STC_CELL_TEMPERATURE: f64 = 25.0;

/// Geographic position of the modeled system
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation above sea level in meters
    pub elevation: f64,
}

/// Electrical parameters of one module under the PVWatts DC model
pub struct ModuleParams {
    /// Nameplate DC power at STC, watts
    pub pdc0: f64,
    /// Temperature coefficient of power, 1/C
    pub gamma_pdc: f64,
}

/// One fixed-mount sub-array: a set of identical modules sharing a
/// tilt/azimuth orientation
pub struct ArraySpec {
    /// Tilt from horizontal, degrees
    pub surface_tilt: f64,
    /// Azimuth from north, clockwise, degrees
    pub surface_azimuth: f64,
    pub modules_per_string: u32,
    pub module: ModuleParams,
}

/// Inverter shared by all sub-arrays
pub struct InverterParams {
    /// Rated DC input power, watts
    pub pdc0: f64,
    /// Nominal DC to AC conversion efficiency, 0..1
    pub nominal_efficiency: f64,
}

impl InverterParams {
    /// DC to AC conversion with clipping at the rated DC input.
    /// Zero power in gives zero power out.
    fn ac_power(&self, dc: f64) -> f64 {
        dc.min(self.pdc0).max(0.0) * self.nominal_efficiency
    }
}

/// Fixed system loss percentages composed multiplicatively on the DC side
pub struct SystemLosses {
    pub soiling: f64,
    pub shading: f64,
    pub snow: f64,
    pub mismatch: f64,
    pub wiring: f64,
    pub connections: f64,
    pub lid: f64,
    pub nameplate_rating: f64,
    pub age: f64,
    pub availability: f64,
}

impl Default for SystemLosses {
    /// The PVWatts default loss table
    fn default() -> Self {
        Self {
            soiling: 2.0,
            shading: 3.0,
            snow: 0.0,
            mismatch: 2.0,
            wiring: 2.0,
            connections: 0.5,
            lid: 1.5,
            nameplate_rating: 1.0,
            age: 0.0,
            availability: 3.0,
        }
    }
}

impl SystemLosses {
    /// Fraction of DC power surviving all losses
    pub fn dc_derate(&self) -> f64 {
        [
            self.soiling,
            self.shading,
            self.snow,
            self.mismatch,
            self.wiring,
            self.connections,
            self.lid,
            self.nameplate_rating,
            self.age,
            self.availability,
        ]
        .iter()
        .map(|loss| 1.0 - loss / 100.0)
        .product()
    }
}

#[derive(Debug)]
pub struct ModelError(pub String);
impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ModelError: {}", self.0)
    }
}
impl From<solar_positioning::Error> for ModelError {
    fn from(e: solar_positioning::Error) -> Self { ModelError(e.to_string()) }
}

/// Runs the model chain over the weather series and returns the AC power
/// in watts per timestamp.
///
/// Every sub-array gets its own weather series (the caller may have derated
/// them individually) but all series must share the timestamp grid of the
/// first one. All sub-arrays feed the one shared inverter.
///
/// # Arguments
///
/// * 'location' - geographic position of the system
/// * 'arrays' - one spec per sub-array
/// * 'weather' - one weather series per sub-array, parallel to 'arrays'
/// * 'inverter' - shared inverter parameters
/// * 'losses' - fixed DC loss percentages
pub fn run_model(
    location: &Location,
    arrays: &[ArraySpec],
    weather: &[TmySeries],
    inverter: &InverterParams,
    losses: &SystemLosses,
) -> Result<Vec<f64>, ModelError> {
    assert_eq!(arrays.len(), weather.len(), "arrays must match weather series count");
    if arrays.is_empty() || weather[0].is_empty() {
        return Ok(Vec::new());
    }

    let steps = weather[0].len();
    for series in weather {
        assert_eq!(series.len(), steps, "weather series must share one timestamp grid");
    }

    let derate = losses.dc_derate();
    let mut ac = Vec::with_capacity(steps);

    for step in 0..steps {
        let timestamp = weather[0].timestamps[step];
        let delta_t = DeltaT::estimate_from_date(timestamp.year(), timestamp.month())?;
        let position = spa::solar_position(
            timestamp,
            location.latitude,
            location.longitude,
            location.elevation,
            delta_t,
            Some(RefractionCorrection::standard()),
        )?;

        let sun_elevation = position.elevation_angle();
        let sun_azimuth = position.azimuth();

        let mut dc_total = 0.0;
        for (array, series) in arrays.iter().zip(weather.iter()) {
            let poa = plane_of_array(
                series.dni[step],
                series.dhi[step],
                series.ghi[step],
                sun_elevation,
                sun_azimuth,
                array.surface_tilt,
                array.surface_azimuth,
            );

            let cell_temp = sapm_cell_temperature(
                poa,
                series.temp_air[step],
                series.wind_speed[step],
            );

            dc_total += pvwatts_dc(poa, cell_temp, &array.module)
                * array.modules_per_string as f64;
        }

        ac.push(inverter.ac_power(dc_total * derate));
    }

    Ok(ac)
}

/// Sun-panel angle of incidence in degrees, spherical cosine formula
///
/// # Arguments
///
/// * 'sun_elevation' - sun elevation, degrees above horizon
/// * 'sun_azimuth' - sun azimuth, degrees from north clockwise
/// * 'surface_tilt' - panel tilt from horizontal, degrees
/// * 'surface_azimuth' - panel azimuth, degrees from north clockwise
fn angle_of_incidence(
    sun_elevation: f64,
    sun_azimuth: f64,
    surface_tilt: f64,
    surface_azimuth: f64,
) -> f64 {
    let sun_zenith = (90.0 - sun_elevation).to_radians();
    let sun_az = sun_azimuth.to_radians();
    let tilt = surface_tilt.to_radians();
    let panel_az = surface_azimuth.to_radians();

    let cos_aoi = sun_zenith.cos() * tilt.cos()
        + sun_zenith.sin() * tilt.sin() * (sun_az - panel_az).cos();

    cos_aoi.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Irradiance on the tilted plane of array in W/m2.
///
/// Beam projected by the angle of incidence and weighted by the Schlick
/// incidence angle modifier, isotropic sky diffuse, ground reflected by a
/// fixed albedo.
fn plane_of_array(
    dni: f64,
    dhi: f64,
    ghi: f64,
    sun_elevation: f64,
    sun_azimuth: f64,
    surface_tilt: f64,
    surface_azimuth: f64,
) -> f64 {
    let aoi = angle_of_incidence(sun_elevation, sun_azimuth, surface_tilt, surface_azimuth);

    let cos_aoi = aoi.to_radians().cos();
    let beam = if cos_aoi > 0.0 && sun_elevation > 0.0 {
        dni * cos_aoi * schlick_iam(aoi, None)
    } else {
        0.0
    };

    let tilt_cos = surface_tilt.to_radians().cos();
    let sky_diffuse = dhi * (1.0 + tilt_cos) / 2.0;
    let ground_reflected = ghi * ALBEDO * (1.0 - tilt_cos) / 2.0;

    beam + sky_diffuse + ground_reflected
}

/// The Schlick Incidence Angle Modifier algorithm
///
/// # Arguments
///
/// * 'theta_deg' - Sun-panel incidence angle
/// * 'factor' - level of flatness, 1 gives cosine flatness, higher values gives more flatness
pub fn schlick_iam(theta_deg: f64, factor: Option<f64>) -> f64 {
    // Handle NaN/inf robustly.
    if !theta_deg.is_finite() {
        return 0.0;
    }

    // Model is symmetric in angle; anything beyond 90° contributes zero.
    let theta = theta_deg.abs();
    if theta >= 90.0 {
        return 0.0;
    }

    let factor = factor.unwrap_or(5.0);

    // The Schlick IAM formula
    1.0 - (1.0 - theta.to_radians().cos()).powf(factor)
}

/// SAPM cell temperature in C from plane-of-array irradiance, ambient
/// temperature and wind speed
fn sapm_cell_temperature(poa: f64, temp_air: f64, wind_speed: f64) -> f64 {
    let module_temp = poa * (SAPM_A + SAPM_B * wind_speed).exp() + temp_air;

    module_temp + poa / STC_IRRADIANCE * SAPM_DELTA_T
}

/// PVWatts DC power of one module in watts
fn pvwatts_dc(poa: f64, cell_temperature: f64, module: &ModuleParams) -> f64 {
    module.pdc0
        * (poa / STC_IRRADIANCE)
        * (1.0 + module.gamma_pdc * (cell_temperature - STC_CELL_TEMPERATURE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn test_location() -> Location {
        Location { latitude: 37.2228043, longitude: -121.8778126, elevation: 0.0 }
    }

    fn test_array(modules: u32) -> ArraySpec {
        ArraySpec {
            surface_tilt: 20.0,
            surface_azimuth: 180.0,
            modules_per_string: modules,
            module: ModuleParams { pdc0: 380.0, gamma_pdc: -0.004 },
        }
    }

    fn test_inverter() -> InverterParams {
        InverterParams { pdc0: 380.0 * 64.0, nominal_efficiency: 0.96 }
    }

    /// A short noon-centered summer series with the given irradiance scale
    fn test_weather(scale: f64) -> TmySeries {
        let hours = [18u32, 19, 20, 21, 22];
        TmySeries {
            timestamps: hours
                .iter()
                .map(|&h| Utc.with_ymd_and_hms(2007, 6, 15, h, 0, 0).unwrap())
                .collect(),
            dni: vec![700.0 * scale, 820.0 * scale, 860.0 * scale, 830.0 * scale, 720.0 * scale],
            dhi: vec![90.0 * scale, 105.0 * scale, 115.0 * scale, 110.0 * scale, 95.0 * scale],
            ghi: vec![620.0 * scale, 790.0 * scale, 870.0 * scale, 820.0 * scale, 650.0 * scale],
            temp_air: vec![21.0, 23.0, 25.0, 26.0, 26.0],
            wind_speed: vec![2.0, 2.5, 3.0, 3.0, 2.5],
        }
    }

    #[test]
    fn schlick_iam_is_unity_at_normal_incidence() {
        assert!((schlick_iam(0.0, None) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn schlick_iam_is_zero_at_grazing_angles() {
        assert_eq!(schlick_iam(90.0, None), 0.0);
        assert_eq!(schlick_iam(120.0, None), 0.0);
        assert_eq!(schlick_iam(f64::NAN, None), 0.0);
    }

    #[test]
    fn schlick_iam_decreases_with_angle() {
        let mut previous = schlick_iam(0.0, None);
        for theta in [15.0, 30.0, 45.0, 60.0, 75.0, 89.0] {
            let iam = schlick_iam(theta, None);
            assert!(iam < previous, "IAM must fall as the angle grows");
            previous = iam;
        }
    }

    #[test]
    fn default_losses_compose_multiplicatively() {
        let derate = SystemLosses::default().dc_derate();

        // 0.98 * 0.97 * 0.98 * 0.98 * 0.995 * 0.985 * 0.99 * 0.97
        assert!((derate - 0.8592433931173553).abs() < 1e-9);
        assert!(derate < 1.0);
    }

    #[test]
    fn zero_irradiance_gives_zero_ac() {
        let weather = vec![test_weather(0.0)];
        let arrays = vec![test_array(32)];

        let ac = run_model(
            &test_location(),
            &arrays,
            &weather,
            &test_inverter(),
            &SystemLosses::default(),
        )
        .unwrap();

        assert!(ac.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn midsummer_noon_produces_power() {
        let weather = vec![test_weather(1.0)];
        let arrays = vec![test_array(32)];

        let ac = run_model(
            &test_location(),
            &arrays,
            &weather,
            &test_inverter(),
            &SystemLosses::default(),
        )
        .unwrap();

        assert_eq!(ac.len(), 5);
        // 32 panels of 380 W under strong summer irradiance
        assert!(ac.iter().all(|&p| p > 0.0));
        assert!(ac.iter().cloned().fold(0.0, f64::max) > 5_000.0);
    }

    #[test]
    fn more_panels_never_produce_less() {
        let weather = vec![test_weather(1.0)];
        let inverter = test_inverter();
        let losses = SystemLosses::default();

        let small = run_model(
            &test_location(),
            &[test_array(16)],
            &weather,
            &inverter,
            &losses,
        )
        .unwrap();
        let large = run_model(
            &test_location(),
            &[test_array(32)],
            &weather,
            &inverter,
            &losses,
        )
        .unwrap();

        for (s, l) in small.iter().zip(large.iter()) {
            assert!(l >= s);
        }
    }

    #[test]
    fn inverter_clips_at_rated_dc_input() {
        let inverter = InverterParams { pdc0: 1000.0, nominal_efficiency: 0.96 };

        assert_eq!(inverter.ac_power(0.0), 0.0);
        assert_eq!(inverter.ac_power(500.0), 480.0);
        assert_eq!(inverter.ac_power(2000.0), 960.0);
    }

    #[test]
    fn empty_weather_gives_empty_output() {
        let mut weather = test_weather(1.0);
        weather.timestamps.clear();
        weather.dni.clear();
        weather.dhi.clear();
        weather.ghi.clear();
        weather.temp_air.clear();
        weather.wind_speed.clear();

        let ac = run_model(
            &test_location(),
            &[test_array(32)],
            &[weather],
            &test_inverter(),
            &SystemLosses::default(),
        )
        .unwrap();

        assert!(ac.is_empty());
    }

    #[test]
    fn south_facing_outproduces_north_facing() {
        let weather = vec![test_weather(1.0)];
        let inverter = test_inverter();
        let losses = SystemLosses::default();

        let mut north = test_array(32);
        north.surface_azimuth = 0.0;
        north.surface_tilt = 40.0;
        let mut south = test_array(32);
        south.surface_azimuth = 180.0;
        south.surface_tilt = 40.0;

        let ac_north: f64 = run_model(&test_location(), &[north], &weather, &inverter, &losses)
            .unwrap()
            .iter()
            .sum();
        let ac_south: f64 = run_model(&test_location(), &[south], &weather, &inverter, &losses)
            .unwrap()
            .iter()
            .sum();

        assert!(ac_south > ac_north);
    }
}
