// src/model/extent.rs

//! Serde helpers for coordinate triples that may hold infinite extents.
//! JSON has no infinity literal, so `±inf` is written as `"Infinity"` / `"-Infinity"`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Component {
    Finite(f64),
    Named(String),
}

impl Component {
    fn from_f64(value: f64) -> Self {
        if value == f64::INFINITY {
            Component::Named("Infinity".to_string())
        } else if value == f64::NEG_INFINITY {
            Component::Named("-Infinity".to_string())
        } else {
            Component::Finite(value)
        }
    }

    fn into_f64(self) -> Result<f64, String> {
        match self {
            Component::Finite(v) => Ok(v),
            Component::Named(s) => match s.as_str() {
                "Infinity" | "inf" => Ok(f64::INFINITY),
                "-Infinity" | "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(format!("unrecognised extent '{}'", other)),
            },
        }
    }
}

pub fn serialize<S: Serializer>(triple: &[f64; 3], serializer: S) -> Result<S::Ok, S::Error> {
    let components: Vec<Component> = triple.iter().map(|v| Component::from_f64(*v)).collect();
    components.serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[f64; 3], D::Error> {
    let components = Vec::<Component>::deserialize(deserializer)?;
    if components.len() != 3 {
        return Err(D::Error::invalid_length(components.len(), &"3 components"));
    }
    let mut triple = [0.0; 3];
    for (slot, component) in triple.iter_mut().zip(components) {
        *slot = component.into_f64().map_err(D::Error::custom)?;
    }
    Ok(triple)
}
