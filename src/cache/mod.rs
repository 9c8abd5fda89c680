//! Cache
//!
//! Este módulo contiene el cache en memoria de informes de consumo.

pub mod analysis_cache;

pub use analysis_cache::{AnalysisCache, CacheStats, EntrySetVersion};
