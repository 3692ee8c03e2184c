// src/service/mod.rs

//! Boundary to the remote simulation service: credentials and the mode-solving call.

pub mod http;

use crate::model::{ModeData, ModeSolverRequest};
use crate::EngineError;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::fmt;
use std::sync::OnceLock;

pub use http::HttpSimulationService;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "SIMCLOUD_APIKEY";
/// Environment variable overriding the service endpoint.
pub const API_URL_ENV: &str = "SIMCLOUD_API_URL";
pub const DEFAULT_API_URL: &str = "https://tidy3d-api.simulation.cloud";

/// A non-empty API key. Never printed in full.
///
/// Surrounding whitespace is stripped, so a key read from a file or an
/// environment variable with a trailing newline is sent without it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: &str) -> Result<Self, EngineError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(EngineError::Configuration("No API key was provided".to_string()));
        }
        Ok(Credential(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tail: String = self.0.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        write!(f, "Credential(****{})", tail)
    }
}

/// An authenticated handle to the service.
///
/// `initialize` only validates and packages the key against the default
/// endpoint. It reads no environment or global state, so equal keys always
/// give equal sessions. [`ServiceSession::from_env`] is the environment-aware
/// constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSession {
    credential: Credential,
    base_url: String,
}

impl ServiceSession {
    pub fn initialize(key: &str) -> Result<Self, EngineError> {
        Self::with_endpoint(key, DEFAULT_API_URL)
    }

    pub fn with_endpoint(key: &str, base_url: &str) -> Result<Self, EngineError> {
        let credential = Credential::new(key)?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(EngineError::Configuration("Service endpoint is empty".to_string()));
        }
        Ok(ServiceSession { credential, base_url })
    }

    /// Reads the key from `SIMCLOUD_APIKEY` and the endpoint from
    /// `SIMCLOUD_API_URL`, falling back to [`DEFAULT_API_URL`].
    pub fn from_env() -> Result<Self, EngineError> {
        let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        match std::env::var(API_KEY_ENV) {
            Ok(key) => Self::with_endpoint(&key, &base_url),
            Err(_) => Err(EngineError::Configuration(format!(
                "No API key was provided ({} is not set)",
                API_KEY_ENV
            ))),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

static PROCESS_SESSION: OnceLock<ServiceSession> = OnceLock::new();

/// Installs the process-wide session on first call.
///
/// Later calls with the same key return the installed session; a different
/// key is refused rather than replacing it.
pub fn configure(key: &str) -> Result<&'static ServiceSession, EngineError> {
    let candidate = ServiceSession::initialize(key)?;
    let installed = PROCESS_SESSION.get_or_init(|| candidate.clone());
    if installed.credential != candidate.credential {
        return Err(EngineError::CredentialConflict);
    }
    Ok(installed)
}

/// The process-wide session, if [`configure`] has run.
pub fn configured_session() -> Option<&'static ServiceSession> {
    PROCESS_SESSION.get()
}

/// A backend able to solve for waveguide modes.
pub trait SimulationService {
    fn name(&self) -> &str;

    /// Performs one solve. Errors come back exactly as the backend reported them.
    fn solve_modes<'a>(&'a self, request: &'a ModeSolverRequest) -> BoxFuture<'a, Result<ModeData, EngineError>>;
}

/// Backend for dry runs: never leaves the process and never returns modes.
pub struct OfflineService;

impl SimulationService for OfflineService {
    fn name(&self) -> &str {
        "offline"
    }

    fn solve_modes<'a>(&'a self, request: &'a ModeSolverRequest) -> BoxFuture<'a, Result<ModeData, EngineError>> {
        log::debug!(
            "Offline service skipping solve of {} frequencies",
            request.freqs.len()
        );
        async { Ok(ModeData::Empty) }.boxed()
    }
}
