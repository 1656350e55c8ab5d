use std::sync::OnceLock;
use chrono_tz::Tz;
use tzf_rs::DefaultFinder;
use crate::manager_production::ProdError;

// tzf-rs DefaultFinder is pre-compiled and cheap to query, expensive to build
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

/// Resolves the IANA timezone for a coordinate pair.
///
/// # Arguments
///
/// * 'latitude' - latitude in degrees
/// * 'longitude' - longitude in degrees
pub fn resolve_timezone(latitude: f64, longitude: f64) -> Result<Tz, ProdError> {
    let finder = TZF_FINDER.get_or_init(DefaultFinder::new);

    let tzid = finder.get_tz_name(longitude, latitude);
    if tzid.is_empty() {
        return Err(ProdError(format!("no timezone at ({}, {})", latitude, longitude)));
    }

    tzid.parse::<Tz>()
        .map_err(|e| ProdError(format!("unknown timezone '{}': {}", tzid, e)))
}
