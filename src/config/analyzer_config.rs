//! Configuración del analizador de consumo
//!
//! Umbrales de odómetro que separan un reseteo de un error de medida.

use serde::{Deserialize, Serialize};

pub const DEFAULT_RESET_THRESHOLD_KM: f64 = 50.0;
pub const DEFAULT_FALLBACK_RESET_THRESHOLD_KM: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Entre pares de depósito lleno: una caída `>= reset_threshold_km` es un
    /// reseteo; una caída menor (o cero) es una anomalía y el ciclo se salta.
    pub reset_threshold_km: f64,
    /// Sobre todas las entradas: solo una caída `> fallback_reset_threshold_km`
    /// es un reseteo; el resto de caídas se excluye sin diagnóstico.
    pub fallback_reset_threshold_km: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            reset_threshold_km: DEFAULT_RESET_THRESHOLD_KM,
            fallback_reset_threshold_km: DEFAULT_FALLBACK_RESET_THRESHOLD_KM,
        }
    }
}
