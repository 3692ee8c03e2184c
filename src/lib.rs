pub mod config;
pub mod model;
pub mod provenance;
pub mod service;
pub mod units;

// Re-exporting the types most callers need.
pub use config::{load_params, ConfiguratorParams};
pub use model::{ModeData, ModeSolverRequest, Simulation, Structure};
pub use service::{HttpSimulationService, OfflineService, ServiceSession, SimulationService};

use model::{Box3, BoundaryEdge, BoundarySpec, GridSpec, ModeSpec};
use provenance::{ProvenanceChain, ProvenanceEvent};

// --- Errors ---

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("A different API key is already configured for this process")]
    CredentialConflict,

    #[error("Remote service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote service returned {status}: {body}")]
    RemoteService { status: u16, body: String },

    #[error("Mode data has already been solved for this configurator")]
    AlreadySolved,

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Provenance failed: {0}")]
    Provenance(String),
}

impl EngineError {
    /// True for failures reported by, or on the way to, the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(self, EngineError::Transport(_) | EngineError::RemoteService { .. })
    }
}

// --- Configurator ---

/// Size of the cross-sectional plane the modes are solved on. It does not
/// follow `sim_size`; see [`SimulationConfigurator::plane_exceeds_domain`].
pub const MODE_PLANE_SIZE: [f64; 3] = [4.0, 3.5, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfiguratorState {
    Configured,
    Solved,
}

/// Turns a handful of scalar parameters into a simulation domain and a
/// mode-solver request for a straight dielectric waveguide.
#[derive(Debug)]
pub struct SimulationConfigurator {
    session: ServiceSession,
    params: ConfiguratorParams,
    lx: f64,
    ly: f64,
    lz: f64,
    lambda0: f64,
    freq0: f64,
    fwidth: f64,
    waveguide: Structure,
    simulation: Simulation,
    mode_data: ModeData,
    state: ConfiguratorState,
    provenance: ProvenanceChain,
}

impl SimulationConfigurator {
    /// Builds the domain offline. Never contacts the service.
    pub fn new(session: ServiceSession, params: ConfiguratorParams) -> Result<Self, EngineError> {
        params.validate()?;

        let lambda0 = params.lambda0;
        let freq0 = units::wavelength_to_freq(lambda0);
        let fwidth = freq0 * params.source_width;
        let waveguide = Structure::waveguide(params.wg_width, params.wg_height, params.wg_permittivity)?;

        let simulation = Self::assemble_simulation(&params, &waveguide);

        let mut configurator = SimulationConfigurator {
            session,
            lx: params.sim_size,
            ly: params.sim_size,
            lz: params.sim_size,
            lambda0,
            freq0,
            fwidth,
            waveguide,
            simulation,
            params,
            mode_data: ModeData::Empty,
            state: ConfiguratorState::Configured,
            provenance: ProvenanceChain::new(),
        };

        if configurator.plane_exceeds_domain() {
            log::warn!(
                "Mode plane {:?} is larger than the {} um domain",
                &MODE_PLANE_SIZE[..2],
                configurator.lx
            );
        }

        let sim_json = configurator.simulation.to_json()?;
        configurator.provenance.add_record(
            ProvenanceEvent::SimulationBuilt,
            sim_json.as_bytes(),
            serde_json::json!({"sim_size": configurator.lx, "lambda0": lambda0}),
        )?;
        log::info!(
            "Configured waveguide simulation: domain {} um, freq0 {:.4e} Hz, fwidth {:.4e} Hz",
            configurator.lx,
            freq0,
            fwidth
        );

        Ok(configurator)
    }

    /// Validates `key`, then builds as [`SimulationConfigurator::new`].
    pub fn with_credential(key: &str, params: ConfiguratorParams) -> Result<Self, EngineError> {
        let session = ServiceSession::initialize(key)?;
        Self::new(session, params)
    }

    /// Builds the configurator and, when `params.run` is set, solves right away.
    pub async fn launch(
        session: ServiceSession,
        params: ConfiguratorParams,
        service: &dyn SimulationService,
    ) -> Result<Self, EngineError> {
        let run = params.run;
        let mut configurator = Self::new(session, params)?;
        if run {
            configurator.solve(service).await?;
        }
        Ok(configurator)
    }

    /// The simulation domain for the stored parameters.
    pub fn build_simulation(&self) -> Simulation {
        Self::assemble_simulation(&self.params, &self.waveguide)
    }

    fn assemble_simulation(params: &ConfiguratorParams, waveguide: &Structure) -> Simulation {
        Simulation {
            center: [0.0; 3],
            size: [params.sim_size; 3],
            grid_spec: GridSpec::auto(f64::from(params.resolution), params.lambda0),
            structures: vec![waveguide.clone()],
            run_time: params.runtime,
            boundary_spec: BoundarySpec::all_sides(BoundaryEdge::Periodic),
        }
    }

    /// The mode-solver request on the fixed cross-sectional plane.
    pub fn build_mode_solver(&self) -> ModeSolverRequest {
        ModeSolverRequest {
            simulation: self.simulation.clone(),
            plane: Box3::centered(MODE_PLANE_SIZE),
            mode_spec: ModeSpec {
                num_modes: self.params.num_modes,
            },
            freqs: self.frequencies(),
        }
    }

    /// Ascending sample frequencies over `[freq0 - fwidth/2, freq0 + fwidth/2]`.
    pub fn frequencies(&self) -> Vec<f64> {
        units::linspace(
            self.freq0 - self.fwidth / 2.0,
            self.freq0 + self.fwidth / 2.0,
            self.params.freq_count,
        )
        .to_vec()
    }

    /// Sends the mode-solver request to `service` and keeps the result.
    ///
    /// Failures are returned as the service produced them and leave the
    /// configurator unsolved. A service that answers with [`ModeData::Empty`]
    /// (a dry run) also leaves it `Configured`, so a real solve can follow.
    pub async fn solve(&mut self, service: &dyn SimulationService) -> Result<&ModeData, EngineError> {
        if self.state == ConfiguratorState::Solved {
            return Err(EngineError::AlreadySolved);
        }

        let request = self.build_mode_solver();
        let request_json = request.to_json()?;
        self.provenance.add_record(
            ProvenanceEvent::ModeSolverBuilt,
            request_json.as_bytes(),
            serde_json::json!({"num_modes": request.mode_spec.num_modes, "freq_count": request.freqs.len()}),
        )?;

        log::info!(
            "Solving {} modes at {} frequencies via {} service",
            request.mode_spec.num_modes,
            request.freqs.len(),
            service.name()
        );
        let mode_data = service.solve_modes(&request).await?;

        let result_json =
            serde_json::to_string(&mode_data).map_err(|e| EngineError::Serialization(e.to_string()))?;
        self.provenance.add_record(
            ProvenanceEvent::ModeSolve,
            result_json.as_bytes(),
            serde_json::json!({"service": service.name()}),
        )?;

        if !mode_data.is_empty() {
            self.state = ConfiguratorState::Solved;
        }
        self.mode_data = mode_data;
        Ok(&self.mode_data)
    }

    /// True when the mode plane does not fit inside the transverse extent of the domain.
    pub fn plane_exceeds_domain(&self) -> bool {
        MODE_PLANE_SIZE[0] > self.lx || MODE_PLANE_SIZE[1] > self.ly
    }

    pub fn extents(&self) -> [f64; 3] {
        [self.lx, self.ly, self.lz]
    }

    pub fn lambda0(&self) -> f64 {
        self.lambda0
    }

    pub fn freq0(&self) -> f64 {
        self.freq0
    }

    pub fn fwidth(&self) -> f64 {
        self.fwidth
    }

    pub fn waveguide(&self) -> &Structure {
        &self.waveguide
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn mode_data(&self) -> &ModeData {
        &self.mode_data
    }

    pub fn state(&self) -> ConfiguratorState {
        self.state
    }

    pub fn params(&self) -> &ConfiguratorParams {
        &self.params
    }

    pub fn session(&self) -> &ServiceSession {
        &self.session
    }

    pub fn provenance(&self) -> &ProvenanceChain {
        &self.provenance
    }
}
