// src/model/mod.rs

//! Typed payloads understood by the remote simulation service.
//!
//! Every object serialises to JSON with a `"type"` discriminator, the same
//! shape the service accepts on upload. Unbounded extents travel as the
//! string `"Infinity"`.

pub mod extent;

use crate::units::INF;
use crate::EngineError;
use serde::{Deserialize, Serialize};

/// An axis-aligned box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Box")]
pub struct Box3 {
    #[serde(with = "extent")]
    pub center: [f64; 3],
    #[serde(with = "extent")]
    pub size: [f64; 3],
}

impl Box3 {
    pub fn new(center: [f64; 3], size: [f64; 3]) -> Self {
        Box3 { center, size }
    }

    /// A box of the given size centred at the origin.
    pub fn centered(size: [f64; 3]) -> Self {
        Box3::new([0.0; 3], size)
    }

    /// Number of axes with zero extent (a plane has exactly one).
    pub fn flat_axes(&self) -> usize {
        self.size.iter().filter(|s| **s == 0.0).count()
    }
}

/// Non-dispersive medium with a scalar relative permittivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Medium")]
pub struct Medium {
    pub permittivity: f64,
}

impl Medium {
    pub fn new(permittivity: f64) -> Result<Self, EngineError> {
        if !(permittivity >= 1.0) {
            return Err(EngineError::Configuration(format!(
                "Permittivity must be >= 1, got {}",
                permittivity
            )));
        }
        Ok(Medium { permittivity })
    }
}

/// A geometry filled with a medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Structure")]
pub struct Structure {
    pub geometry: Box3,
    pub medium: Medium,
}

impl Structure {
    /// A straight waveguide along z with a `height × width` cross-section.
    pub fn waveguide(width: f64, height: f64, permittivity: f64) -> Result<Self, EngineError> {
        if !(width > 0.0) || !(height > 0.0) {
            return Err(EngineError::Configuration(format!(
                "Waveguide cross-section must be positive, got {} x {}",
                height, width
            )));
        }
        Ok(Structure {
            geometry: Box3::centered([height, width, INF]),
            medium: Medium::new(permittivity)?,
        })
    }
}

/// Automatic non-uniform grid along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "AutoGrid")]
pub struct AutoGrid {
    pub min_steps_per_wvl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "GridSpec")]
pub struct GridSpec {
    pub grid_x: AutoGrid,
    pub grid_y: AutoGrid,
    pub grid_z: AutoGrid,
    pub wavelength: Option<f64>,
}

impl GridSpec {
    /// Auto grid on every axis, resolved against `wavelength`.
    pub fn auto(min_steps_per_wvl: f64, wavelength: f64) -> Self {
        let grid = AutoGrid { min_steps_per_wvl };
        GridSpec {
            grid_x: grid.clone(),
            grid_y: grid.clone(),
            grid_z: grid,
            wavelength: Some(wavelength),
        }
    }
}

/// Condition applied on one face of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryEdge {
    Periodic,
}

/// The pair of faces normal to one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Boundary")]
pub struct Boundary {
    pub plus: BoundaryEdge,
    pub minus: BoundaryEdge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "BoundarySpec")]
pub struct BoundarySpec {
    pub x: Boundary,
    pub y: Boundary,
    pub z: Boundary,
}

impl BoundarySpec {
    pub fn all_sides(edge: BoundaryEdge) -> Self {
        let boundary = Boundary { plus: edge, minus: edge };
        BoundarySpec {
            x: boundary.clone(),
            y: boundary.clone(),
            z: boundary,
        }
    }

    /// Edges in the order -x, +x, -y, +y, -z, +z.
    pub fn faces(&self) -> [BoundaryEdge; 6] {
        [
            self.x.minus,
            self.x.plus,
            self.y.minus,
            self.y.plus,
            self.z.minus,
            self.z.plus,
        ]
    }
}

/// The simulation domain uploaded to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Simulation")]
pub struct Simulation {
    #[serde(with = "extent")]
    pub center: [f64; 3],
    #[serde(with = "extent")]
    pub size: [f64; 3],
    pub grid_spec: GridSpec,
    pub structures: Vec<Structure>,
    pub run_time: f64,
    pub boundary_spec: BoundarySpec,
}

impl Simulation {
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "ModeSpec")]
pub struct ModeSpec {
    pub num_modes: usize,
}

/// Everything the service needs to solve for modes on a plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "ModeSolver")]
pub struct ModeSolverRequest {
    pub simulation: Simulation,
    pub plane: Box3,
    pub mode_spec: ModeSpec,
    pub freqs: Vec<f64>,
}

impl ModeSolverRequest {
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

/// Result of a mode solve. The solved payload is passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ModeData {
    #[default]
    Empty,
    Solved(serde_json::Value),
}

impl ModeData {
    pub fn is_empty(&self) -> bool {
        matches!(self, ModeData::Empty)
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            ModeData::Empty => None,
            ModeData::Solved(value) => Some(value),
        }
    }
}
