//! Conversion utilities for the FFI boundary
//!
//! Everything crosses the boundary as JSON text, so the Python side only
//! needs `json.loads`.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use serde::Serialize;

use crate::config::FacilityConfig;
use crate::orchestrator::SimulationError;

/// Serialize a value to a JSON string
pub fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Serialization failed: {}", e)))
}

/// Parse a facility configuration, raising ValueError on malformed input
pub fn parse_config(config_json: &str) -> PyResult<FacilityConfig> {
    FacilityConfig::from_json_str(config_json)
        .map_err(|e| PyErr::new::<PyValueError, _>(format!("Invalid configuration: {}", e)))
}

/// Map a simulation error onto a Python exception
///
/// Configuration and checkpoint problems raise ValueError; anything else
/// raises RuntimeError.
pub fn simulation_error(context: &str, error: SimulationError) -> PyErr {
    let message = format!("{}: {}", context, error);
    match error {
        SimulationError::InvalidConfig(_)
        | SimulationError::ConfigMismatch { .. }
        | SimulationError::StateValidationError(_)
        | SimulationError::SerializationError(_) => PyErr::new::<PyValueError, _>(message),
        SimulationError::HorizonExhausted { .. } => PyErr::new::<PyRuntimeError, _>(message),
    }
}
