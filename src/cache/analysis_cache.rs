//! Cache de informes de consumo
//!
//! Memoriza un `ConsumptionReport` por vehículo, indexado por
//! `(vehicle_id, EntrySetVersion)`. La versión es una huella md5 del conjunto
//! de entradas, así que cualquier alta, baja o edición en el backend produce
//! un miss y el informe viejo se sustituye. No hay estado global: el cache
//! vive en `AppState`.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::{ConsumptionCycle, ConsumptionReport, FuelLogEntry, Vehicle};

/// Huella del conjunto de entradas de un vehículo, independiente del orden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntrySetVersion([u8; 16]);

impl EntrySetVersion {
    pub fn of(vehicle: &Vehicle, entries: &[FuelLogEntry]) -> Self {
        Self::with_backend_cycles(vehicle, entries, None)
    }

    /// Incluye en la huella los ciclos del backend, que también alimentan el
    /// informe (serie mensual de respaldo y datos adjuntos)
    pub fn with_backend_cycles(
        vehicle: &Vehicle,
        entries: &[FuelLogEntry],
        backend_cycles: Option<&[ConsumptionCycle]>,
    ) -> Self {
        let mut by_id: Vec<&FuelLogEntry> = entries.iter().collect();
        by_id.sort_by_key(|e| e.id);

        let mut context = md5::Context::new();
        context.consume(vehicle.id.to_le_bytes());
        match vehicle.initial_odometer {
            Some(initial) => context.consume(initial.to_bits().to_le_bytes()),
            None => context.consume([0xffu8]),
        }
        for entry in by_id {
            context.consume(entry.id.to_le_bytes());
            context.consume(entry.vehicle_id.to_le_bytes());
            context.consume(entry.date_time.and_utc().timestamp().to_le_bytes());
            context.consume(entry.date_time.and_utc().timestamp_subsec_nanos().to_le_bytes());
            context.consume(entry.litres.to_bits().to_le_bytes());
            context.consume(entry.odometer.to_bits().to_le_bytes());
            context.consume([entry.full_tank as u8]);
            context.consume(entry.price_per_litre.to_bits().to_le_bytes());
            context.consume(entry.total_price.to_bits().to_le_bytes());
            consume_text(&mut context, entry.location.as_deref());
            consume_text(&mut context, entry.notes.as_deref());
        }
        if let Some(cycles) = backend_cycles {
            context.consume(b"backend");
            for cycle in cycles {
                context.consume(cycle.from_date.and_utc().timestamp().to_le_bytes());
                context.consume(cycle.to_date.and_utc().timestamp().to_le_bytes());
                context.consume(cycle.distance_km.to_bits().to_le_bytes());
                context.consume(cycle.litres.to_bits().to_le_bytes());
                context.consume(cycle.consumption_per_100km.to_bits().to_le_bytes());
            }
        }

        Self(context.compute().0)
    }
}

/// Texto opcional con marca de presencia y longitud, sin ambigüedad entre campos
fn consume_text(context: &mut md5::Context, text: Option<&str>) {
    match text {
        Some(value) => {
            context.consume([1u8]);
            context.consume((value.len() as u64).to_le_bytes());
            context.consume(value.as_bytes());
        }
        None => context.consume([0u8]),
    }
}

impl fmt::Display for EntrySetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct CachedReport {
    version: EntrySetVersion,
    report: ConsumptionReport,
    last_accessed: u64,
}

/// Estadísticas del cache
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries_created: u64,
    /// Entradas sustituidas porque cambió el conjunto de entradas
    pub entries_stale: u64,
    pub entries_invalidated: u64,
    pub entries_evicted: u64,
}

struct Inner {
    reports: HashMap<i64, CachedReport>,
    stats: CacheStats,
    clock: u64,
}

pub struct AnalysisCache {
    inner: RwLock<Inner>,
    max_entries: usize,
}

impl AnalysisCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                reports: HashMap::new(),
                stats: CacheStats::default(),
                clock: 0,
            }),
            max_entries: max_entries.max(1),
        }
    }

    /// Devuelve el informe si la versión coincide. Una versión distinta
    /// descarta el informe guardado.
    pub async fn get(&self, vehicle_id: i64, version: EntrySetVersion) -> Option<ConsumptionReport> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner.clock += 1;
        let now = inner.clock;

        match inner.reports.get_mut(&vehicle_id) {
            Some(cached) if cached.version == version => {
                cached.last_accessed = now;
                inner.stats.hits += 1;
                debug!("Cache hit para vehículo {} (versión {})", vehicle_id, version);
                Some(cached.report.clone())
            }
            Some(_) => {
                inner.reports.remove(&vehicle_id);
                inner.stats.entries_stale += 1;
                inner.stats.misses += 1;
                debug!("Cache miss (obsoleto) para vehículo {}", vehicle_id);
                None
            }
            None => {
                inner.stats.misses += 1;
                debug!("Cache miss para vehículo {}", vehicle_id);
                None
            }
        }
    }

    pub async fn insert(&self, vehicle_id: i64, version: EntrySetVersion, report: ConsumptionReport) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner.clock += 1;

        if !inner.reports.contains_key(&vehicle_id) && inner.reports.len() >= self.max_entries {
            let oldest = inner
                .reports
                .iter()
                .min_by_key(|(_, cached)| cached.last_accessed)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                inner.reports.remove(&id);
                inner.stats.entries_evicted += 1;
                debug!("Entrada LRU eliminada: vehículo {}", id);
            }
        }

        inner.reports.insert(
            vehicle_id,
            CachedReport {
                version,
                report,
                last_accessed: inner.clock,
            },
        );
        inner.stats.entries_created += 1;
    }

    /// Memoriza `compute` para `(vehicle_id, version)`
    pub async fn get_or_insert_with<E, F>(
        &self,
        vehicle_id: i64,
        version: EntrySetVersion,
        compute: F,
    ) -> Result<ConsumptionReport, E>
    where
        F: FnOnce() -> Result<ConsumptionReport, E>,
    {
        if let Some(report) = self.get(vehicle_id, version).await {
            return Ok(report);
        }
        let report = compute()?;
        self.insert(vehicle_id, version, report.clone()).await;
        Ok(report)
    }

    /// Descarta el informe de un vehículo. Devuelve si había algo guardado.
    pub async fn invalidate(&self, vehicle_id: i64) -> bool {
        let mut inner = self.inner.write().await;
        let removed = inner.reports.remove(&vehicle_id).is_some();
        if removed {
            inner.stats.entries_invalidated += 1;
            info!("Cache invalidado para vehículo {}", vehicle_id);
        }
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats.clone()
    }

    pub async fn size(&self) -> usize {
        self.inner.read().await.reports.len()
    }
}
