//! Analizador de consumo
//!
//! Función pura sobre el historial de un vehículo: valida, ordena, detecta
//! ciclos (pares de depósito lleno, o todas las entradas como respaldo),
//! agrega totales y agrupa por mes. No hace I/O ni guarda estado, así que se
//! puede llamar en paralelo para vehículos distintos.

use tracing::debug;

use crate::analysis::aggregates::{cycle_summary, total_stats};
use crate::analysis::cycle_detector::detect_cycles;
use crate::analysis::monthly::bucket_by_month;
use crate::analysis::normalize::sort_chronologically;
use crate::config::AnalyzerConfig;
use crate::models::{
    ConsumptionCycle, ConsumptionReport, Diagnostic, FuelLogEntry, MonthlySource, ReasonCode, Vehicle,
};
use crate::utils::errors::AppResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsumptionAnalyzer {
    config: AnalyzerConfig,
}

impl ConsumptionAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analiza el historial completo de un vehículo
    pub fn analyze(&self, entries: &[FuelLogEntry], vehicle: &Vehicle) -> AppResult<ConsumptionReport> {
        self.analyze_with_backend_cycles(entries, vehicle, None)
    }

    /// Igual que `analyze`, adjuntando los ciclos que calculó el backend.
    /// Esos ciclos no se recalculan: se devuelven tal cual y solo alimentan la
    /// serie mensual cuando el cálculo local no produjo ningún ciclo.
    pub fn analyze_with_backend_cycles(
        &self,
        entries: &[FuelLogEntry],
        vehicle: &Vehicle,
        backend_cycles: Option<Vec<ConsumptionCycle>>,
    ) -> AppResult<ConsumptionReport> {
        for entry in entries {
            entry.check_invariants(vehicle.id)?;
        }

        let sorted = sort_chronologically(entries);
        let detection = detect_cycles(&sorted, &self.config);
        let stats = total_stats(&sorted, vehicle, &detection);

        let (monthly_stats, monthly_source) = match backend_cycles.as_deref() {
            Some(external) if detection.cycles.is_empty() && !external.is_empty() => {
                (bucket_by_month(external, &sorted), MonthlySource::Backend)
            }
            _ => (bucket_by_month(&detection.cycles, &sorted), MonthlySource::Local),
        };

        let mut diagnostics = detection.diagnostics.clone();
        let insufficient_data = if entries.is_empty() {
            diagnostics.push(Diagnostic::new(ReasonCode::NoEntries, "No fuel entries recorded"));
            Some(ReasonCode::NoEntries)
        } else if stats.as_ref().map_or(0.0, |s| s.avg_consumption) > 0.0 {
            None
        } else if detection.has_anomalies() {
            Some(ReasonCode::OdometerAnomaly)
        } else {
            if !diagnostics.iter().any(|d| d.code == ReasonCode::NoFullTankPairs) {
                diagnostics.push(Diagnostic::new(
                    ReasonCode::NoFullTankPairs,
                    "Not enough data to calculate consumption, mark entries as \"Full Tank\"",
                ));
            }
            Some(ReasonCode::NoFullTankPairs)
        };

        debug!(
            "Analyzed vehicle {} ({}): {} entries, {} cycles, {} diagnostics",
            vehicle.id,
            vehicle.display_name(),
            entries.len(),
            detection.cycles.len(),
            diagnostics.len()
        );

        Ok(ConsumptionReport {
            vehicle_id: vehicle.id,
            basis: detection.basis,
            total_stats: stats,
            cycle_summary: cycle_summary(&detection.cycles),
            cycles: detection.cycles,
            monthly_stats,
            monthly_source,
            insufficient_data,
            diagnostics,
            backend_cycles,
        })
    }
}

/// Atajo con los umbrales por defecto
pub fn analyze(entries: &[FuelLogEntry], vehicle: &Vehicle) -> AppResult<ConsumptionReport> {
    ConsumptionAnalyzer::default().analyze(entries, vehicle)
}
