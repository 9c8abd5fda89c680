//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::analysis::ConsumptionAnalyzer;
use crate::clients::{FuelDataSource, FuelTrackerClient};
use crate::config::environment::EnvironmentConfig;
use crate::services::AnalyticsService;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    /// Estado de producción: datos desde el API REST del fuel tracker
    pub fn new(config: EnvironmentConfig) -> AppResult<Self> {
        let client = FuelTrackerClient::new(config.fuel_tracker_api_url.clone(), config.upstream_timeout_secs)?;
        Ok(Self::with_source(config, Arc::new(client)))
    }

    /// Estado con un origen de datos arbitrario (tests, otros backends)
    pub fn with_source(config: EnvironmentConfig, source: Arc<dyn FuelDataSource>) -> Self {
        let analytics = AnalyticsService::new(
            source,
            ConsumptionAnalyzer::new(config.analyzer),
            config.analysis_cache_max_entries,
        );
        Self {
            config,
            analytics: Arc::new(analytics),
        }
    }
}
