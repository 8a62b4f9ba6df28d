//! PyO3 wrapper for the Orchestrator
//!
//! This module provides the Python interface used by the presentation layer.

use pyo3::prelude::*;

use super::types::{parse_config, simulation_error, to_json};
use crate::orchestrator::Orchestrator;

/// Python wrapper for the hourly flow scheduler
///
/// # Example (from Python)
///
/// ```python
/// import json
/// from cold_storage_simulator_core_rs import Simulator
///
/// sim = Simulator(json.dumps({"horizon_hours": 48}))
/// while not sim.is_finished():
///     hour = json.loads(sim.tick())
/// summaries = json.loads(sim.daily_summaries_json())
/// ```
#[pyclass(name = "Simulator")]
pub struct PySimulator {
    inner: Orchestrator,
}

#[pymethods]
impl PySimulator {
    /// Create a simulator from a JSON configuration
    ///
    /// # Errors
    ///
    /// Raises ValueError if the JSON is malformed or the tunnel layout is invalid.
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        let inner = Orchestrator::new(config)
            .map_err(|e| simulation_error("Failed to create simulator", e))?;
        Ok(PySimulator { inner })
    }

    /// Resume a simulator from `save_state` output
    #[staticmethod]
    fn load_state(config_json: &str, state_json: &str) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        let inner = Orchestrator::load_state(config, state_json)
            .map_err(|e| simulation_error("Failed to restore simulator", e))?;
        Ok(PySimulator { inner })
    }

    /// Simulate one hour and return its stage flows as JSON
    fn tick(&mut self) -> PyResult<String> {
        let result = self
            .inner
            .tick()
            .map_err(|e| simulation_error("Tick execution failed", e))?;
        to_json(&result)
    }

    /// Simulate every remaining hour and return the ledger as JSON
    fn run(&mut self) -> PyResult<String> {
        let ledger = self
            .inner
            .run()
            .map_err(|e| simulation_error("Run failed", e))?;
        to_json(ledger)
    }

    /// Hourly snapshots recorded so far
    fn snapshots_json(&self) -> PyResult<String> {
        to_json(&self.inner.ledger().snapshots())
    }

    /// Daily summary rows recorded so far
    fn daily_summaries_json(&self) -> PyResult<String> {
        to_json(&self.inner.ledger().daily_summaries())
    }

    /// Headline stage rates
    fn flow_summary_json(&self) -> PyResult<String> {
        to_json(self.inner.flow_summary())
    }

    /// Serialize the run for later resumption
    fn save_state(&self) -> PyResult<String> {
        self.inner
            .save_state()
            .map_err(|e| simulation_error("Checkpoint failed", e))
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn current_hour(&self) -> usize {
        self.inner.current_hour()
    }

    fn total_hours(&self) -> usize {
        self.inner.total_hours()
    }

    fn run_id(&self) -> String {
        self.inner.run_id().to_string()
    }
}
