//! Análisis de consumo de combustible
//!
//! Normalización, detección de ciclos, agregados y series mensuales.

pub mod aggregates;
pub mod consumption_analyzer;
pub mod cycle_detector;
pub mod monthly;
pub mod normalize;

pub use consumption_analyzer::{analyze, ConsumptionAnalyzer};
