//! Configuración del proyecto
//!
//! Este módulo contiene las variables de entorno y los umbrales del
//! analizador de consumo.

pub mod analyzer_config;
pub mod environment;

pub use analyzer_config::AnalyzerConfig;
pub use environment::*;
