//! Modelos del sistema
//!
//! Entradas de repostaje y vehículos tal como llegan del backend, más los
//! resultados derivados del análisis de consumo.

pub mod consumption;
pub mod fuel_entry;
pub mod vehicle;

pub use consumption::*;
pub use fuel_entry::FuelLogEntry;
pub use vehicle::{FuelType, Vehicle};
