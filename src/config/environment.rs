//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno del gateway de analytics.

use std::env;
use std::str::FromStr;

use crate::config::analyzer_config::AnalyzerConfig;
use crate::utils::errors::{AppError, AppResult};

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    /// URL base del API REST del fuel tracker, p.ej. `http://localhost:8080/api`
    pub fuel_tracker_api_url: String,
    pub upstream_timeout_secs: u64,
    pub analysis_cache_max_entries: usize,
    pub analyzer: AnalyzerConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            fuel_tracker_api_url: "http://localhost:8080/api".to_string(),
            upstream_timeout_secs: 30,
            analysis_cache_max_entries: 1000,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Cargar la configuración desde variables de entorno, con los valores de
    /// `Default` para las que no están definidas
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            fuel_tracker_api_url: env::var("FUEL_TRACKER_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.fuel_tracker_api_url),
            upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs)?,
            analysis_cache_max_entries: parse_var(
                "ANALYSIS_CACHE_MAX_ENTRIES",
                defaults.analysis_cache_max_entries,
            )?,
            analyzer: AnalyzerConfig {
                reset_threshold_km: parse_var(
                    "ODOMETER_RESET_THRESHOLD_KM",
                    defaults.analyzer.reset_threshold_km,
                )?,
                fallback_reset_threshold_km: parse_var(
                    "FALLBACK_RESET_THRESHOLD_KM",
                    defaults.analyzer.fallback_reset_threshold_km,
                )?,
            },
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a valid value, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
