// src/provenance/mod.rs

//! Hash-linked log of the payloads a configurator built and sent.
//!
//! Each record stores the SHA-256 of the JSON payload it describes and the
//! hash of the record before it, so an exported chain can be checked for
//! tampering or for drift between two runs with the same parameters.

use crate::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceEvent {
    SimulationBuilt,
    ModeSolverBuilt,
    ModeSolve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub timestamp: DateTime<Utc>,
    pub event: ProvenanceEvent,
    pub payload_hash: String,
    pub crate_version: String,
    pub previous_record_hash: Option<String>,
    pub metadata: serde_json::Value,
}

impl ProvenanceRecord {
    pub fn new(
        event: ProvenanceEvent,
        payload: &[u8],
        previous_record_hash: Option<String>,
        metadata: serde_json::Value,
    ) -> Self {
        ProvenanceRecord {
            timestamp: Utc::now(),
            event,
            payload_hash: fingerprint(payload),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            previous_record_hash,
            metadata,
        }
    }

    /// Hash of the whole record, used as the link to the next one.
    pub fn record_hash(&self) -> Result<String, EngineError> {
        let serialized = serde_json::to_string(self).map_err(|e| EngineError::Provenance(e.to_string()))?;
        Ok(fingerprint(serialized.as_bytes()))
    }
}

/// Hex SHA-256 of a byte slice.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Default)]
pub struct ProvenanceChain {
    records: Vec<ProvenanceRecord>,
}

impl ProvenanceChain {
    pub fn new() -> Self {
        ProvenanceChain { records: Vec::new() }
    }

    pub fn add_record(
        &mut self,
        event: ProvenanceEvent,
        payload: &[u8],
        metadata: serde_json::Value,
    ) -> Result<&ProvenanceRecord, EngineError> {
        let previous_record_hash = match self.records.last() {
            Some(last) => Some(last.record_hash()?),
            None => None,
        };
        self.records
            .push(ProvenanceRecord::new(event, payload, previous_record_hash, metadata));
        Ok(&self.records[self.records.len() - 1])
    }

    pub fn records(&self) -> &[ProvenanceRecord] {
        &self.records
    }

    /// Returns true when every record points at the hash of its predecessor.
    pub fn verify(&self) -> Result<bool, EngineError> {
        for pair in self.records.windows(2) {
            if pair[1].previous_record_hash.as_deref() != Some(pair[0].record_hash()?.as_str()) {
                return Ok(false);
            }
        }
        Ok(self.records.first().map_or(true, |r| r.previous_record_hash.is_none()))
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(&self.records).map_err(|e| EngineError::Provenance(e.to_string()))
    }

    pub fn from_json(json_str: &str) -> Result<Self, EngineError> {
        let records = serde_json::from_str(json_str).map_err(|e| EngineError::Provenance(e.to_string()))?;
        Ok(ProvenanceChain { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let payload = br#"{"type":"Simulation"}"#;
        let record = ProvenanceRecord::new(
            ProvenanceEvent::SimulationBuilt,
            payload,
            None,
            serde_json::json!({"sim_size": 6.0}),
        );

        assert_eq!(record.event, ProvenanceEvent::SimulationBuilt);
        assert_eq!(record.crate_version, env!("CARGO_PKG_VERSION"));
        assert!(record.previous_record_hash.is_none());
        assert_eq!(record.metadata["sim_size"], 6.0);
        assert_eq!(record.payload_hash, fingerprint(payload));
        assert_eq!(record.payload_hash.len(), 64);
    }

    #[test]
    fn test_chain_linking() {
        let mut chain = ProvenanceChain::new();
        chain
            .add_record(ProvenanceEvent::SimulationBuilt, b"sim", serde_json::json!({}))
            .unwrap();
        let first_hash = chain.records()[0].record_hash().unwrap();

        chain
            .add_record(ProvenanceEvent::ModeSolverBuilt, b"request", serde_json::json!({"num_modes": 5}))
            .unwrap();
        assert_eq!(chain.records()[1].previous_record_hash, Some(first_hash));
        assert!(chain.verify().unwrap());
    }

    #[test]
    fn test_tampering_breaks_verification() {
        let mut chain = ProvenanceChain::new();
        chain
            .add_record(ProvenanceEvent::SimulationBuilt, b"sim", serde_json::json!({}))
            .unwrap();
        chain
            .add_record(ProvenanceEvent::ModeSolve, b"modes", serde_json::json!({}))
            .unwrap();

        chain.records[0].payload_hash = fingerprint(b"something else");
        assert!(!chain.verify().unwrap());
    }

    #[test]
    fn test_chain_json_export() {
        let mut chain = ProvenanceChain::new();
        chain
            .add_record(ProvenanceEvent::SimulationBuilt, b"sim", serde_json::json!({}))
            .unwrap();
        chain
            .add_record(ProvenanceEvent::ModeSolverBuilt, b"request", serde_json::json!({}))
            .unwrap();

        let json = chain.to_json().unwrap();
        assert!(json.contains("\"simulation_built\""));

        let restored = ProvenanceChain::from_json(&json).unwrap();
        assert_eq!(restored.records().len(), 2);
        assert_eq!(restored.records()[1].payload_hash, chain.records()[1].payload_hash);
        assert!(restored.verify().unwrap());
    }
}
