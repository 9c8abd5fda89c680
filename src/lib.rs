//! Fuel consumption analytics
//!
//! Analizador de consumo de combustible por vehículo y el gateway HTTP que
//! lo expone sobre el API REST del fuel tracker.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod clients;
pub mod config;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use analysis::{analyze, ConsumptionAnalyzer};
pub use models::{ConsumptionReport, FuelLogEntry, Vehicle};
pub use utils::errors::{AppError, AppResult};
