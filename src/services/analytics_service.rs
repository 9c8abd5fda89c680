//! Servicio de analytics de consumo
//!
//! Pide vehículo, entradas y ciclos del backend en paralelo, ejecuta el
//! analizador y memoriza el informe por versión del conjunto de entradas.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::ConsumptionAnalyzer;
use crate::cache::{AnalysisCache, CacheStats, EntrySetVersion};
use crate::clients::FuelDataSource;
use crate::models::{ConsumptionCycle, ConsumptionReport, FuelLogEntry, Vehicle};
use crate::utils::errors::AppResult;

pub struct AnalyticsService {
    source: Arc<dyn FuelDataSource>,
    cache: AnalysisCache,
    analyzer: ConsumptionAnalyzer,
}

impl AnalyticsService {
    pub fn new(source: Arc<dyn FuelDataSource>, analyzer: ConsumptionAnalyzer, cache_max_entries: usize) -> Self {
        Self {
            source,
            cache: AnalysisCache::new(cache_max_entries),
            analyzer,
        }
    }

    /// Informe de consumo de un vehículo del backend
    pub async fn vehicle_report(&self, vehicle_id: i64, authorization: Option<&str>) -> AppResult<ConsumptionReport> {
        let (vehicle, entries, backend_cycles) = futures::join!(
            self.source.get_vehicle(vehicle_id, authorization),
            self.source.list_fuel_entries(vehicle_id, authorization),
            self.source.list_consumption_cycles(vehicle_id, authorization),
        );
        let vehicle = vehicle?;
        let entries = entries?;

        let backend_cycles = match backend_cycles {
            Ok(cycles) => Some(cycles),
            Err(e) => {
                warn!("Backend consumption cycles unavailable for vehicle {}: {}", vehicle_id, e);
                None
            }
        };

        let version = EntrySetVersion::with_backend_cycles(&vehicle, &entries, backend_cycles.as_deref());
        self.cache
            .get_or_insert_with(vehicle_id, version, || {
                self.analyzer
                    .analyze_with_backend_cycles(&entries, &vehicle, backend_cycles)
            })
            .await
    }

    /// Análisis directo de datos aportados por el llamante, sin backend ni cache
    pub fn analyze_inline(
        &self,
        vehicle: &Vehicle,
        entries: &[FuelLogEntry],
        backend_cycles: Option<Vec<ConsumptionCycle>>,
    ) -> AppResult<ConsumptionReport> {
        self.analyzer
            .analyze_with_backend_cycles(entries, vehicle, backend_cycles)
    }

    pub async fn invalidate(&self, vehicle_id: i64) -> bool {
        let removed = self.cache.invalidate(vehicle_id).await;
        info!("Invalidación solicitada para vehículo {} (había informe: {})", vehicle_id, removed);
        removed
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
