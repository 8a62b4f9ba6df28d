//! Python bindings (feature `pyo3`)

pub mod simulator;
pub mod types;
