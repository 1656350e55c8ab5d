mod errors;
mod logging;
mod manager_production;
mod manager_weather;
mod model_chain;
mod models;
mod timezone;

use log::info;
use crate::errors::UnrecoverableError;
use crate::manager_production::SolarSystemProductionService;
use crate::models::{Address, Inverter, SolarModule, Surface};

fn main() -> Result<(), UnrecoverableError> {
    logging::setup_logging();

    let module_capacity = 380.0;
    let panels: u32 = 32;
    let inverter_capacity = module_capacity * panels as f64;

    let address1 = Address::new(
        37.2228043,
        -121.8778126,
        vec![Surface::new(1.0, 1.0, 41.0, panels)],
        SolarModule::new(module_capacity),
        Inverter::new(inverter_capacity, 0.96),
    );
    let address2 = Address::new(
        37.2228043,
        -121.8778126,
        vec![Surface::new(20.0, 1.0, 41.0, panels)],
        SolarModule::new(module_capacity),
        Inverter::new(inverter_capacity, 0.96),
    );

    let service = SolarSystemProductionService::new()?;

    info!("estimating production for address 1");
    let annual = service.get_annual_production(&address1)?;
    println!("address 1: {:.1} kWh/year", annual);

    info!("estimating production for address 2");
    let production = service.get_production(&address2)?;
    println!("address 2: {:.1} kWh/year", production.annual_production);
    println!("{}", serde_json::to_string(&production)?);

    Ok(())
}
