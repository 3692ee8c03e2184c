// demos/waveguide_modes.rs

use std::path::PathBuf;
use waveguide_engine::{
    load_params, ConfiguratorParams, HttpSimulationService, ServiceSession, SimulationConfigurator,
};

/// Builds the default waveguide run and prints the request that would be sent.
/// Solves remotely only when `SIMCLOUD_APIKEY` is set and `run` is enabled.
#[actix_rt::main]
async fn main() {
    env_logger::init();

    let params = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => match load_params(&path) {
            Ok(params) => params,
            Err(e) => {
                println!("Error loading {}: {}", path.display(), e);
                return;
            }
        },
        None => ConfiguratorParams::default(),
    };

    let session = match ServiceSession::from_env() {
        Ok(session) => session,
        Err(e) => {
            println!("{}; building offline only.", e);
            match ServiceSession::with_endpoint("offline", waveguide_engine::service::DEFAULT_API_URL) {
                Ok(session) => session,
                Err(e) => {
                    println!("Error: {}", e);
                    return;
                }
            }
        }
    };
    let online = std::env::var(waveguide_engine::service::API_KEY_ENV).is_ok();

    let mut configurator = match SimulationConfigurator::new(session.clone(), params) {
        Ok(configurator) => configurator,
        Err(e) => {
            println!("Error configuring simulation: {}", e);
            return;
        }
    };

    println!("Configured waveguide simulation");
    println!("  - Domain extents: {:?}", configurator.extents());
    println!("  - freq0: {:.6e} Hz, fwidth: {:.6e} Hz", configurator.freq0(), configurator.fwidth());
    match configurator.build_mode_solver().to_json() {
        Ok(json) => println!("  - Mode solver request: {}", json),
        Err(e) => println!("Error serializing request: {}", e),
    }

    if !(online && configurator.params().run) {
        println!("Skipping remote solve.");
        return;
    }

    let service = match HttpSimulationService::new(session) {
        Ok(service) => service,
        Err(e) => {
            println!("Error creating client: {}", e);
            return;
        }
    };
    match configurator.solve(&service).await {
        Ok(data) => println!("Mode data: {}", serde_json::to_string_pretty(&data).unwrap_or_default()),
        Err(e) => println!("Mode solve failed: {}", e),
    }
}
