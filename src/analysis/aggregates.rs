//! Estadísticas agregadas
//!
//! Consumo medio ponderado por distancia y totales globales del historial.
//! Todas las divisiones están protegidas: sin datos el resultado es 0.

use crate::analysis::cycle_detector::CycleDetection;
use crate::analysis::normalize::canonical_order;
use crate::models::{ConsumptionCycle, CycleSummary, FuelLogEntry, TotalStats, Vehicle};

/// `fuel / distance * 100`, o 0 si no hay distancia
pub fn consumption_per_100km(fuel: f64, distance: f64) -> f64 {
    if distance > 0.0 {
        fuel / distance * 100.0
    } else {
        0.0
    }
}

/// Mejor, peor y media sin ponderar de los ciclos
pub fn cycle_summary(cycles: &[ConsumptionCycle]) -> Option<CycleSummary> {
    if cycles.is_empty() {
        return None;
    }

    let mut best = f64::INFINITY;
    let mut worst = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for cycle in cycles {
        best = best.min(cycle.consumption_per_100km);
        worst = worst.max(cycle.consumption_per_100km);
        sum += cycle.consumption_per_100km;
    }

    Some(CycleSummary {
        best,
        worst,
        mean: sum / cycles.len() as f64,
    })
}

/// Totales sobre un historial ordenado. `None` si no hay entradas.
pub fn total_stats(
    sorted: &[&FuelLogEntry],
    vehicle: &Vehicle,
    detection: &CycleDetection,
) -> Option<TotalStats> {
    let canonical = canonical_order(sorted);
    let first = *canonical.first()?;
    let last = *canonical.last()?;

    let total_litres: f64 = canonical.iter().map(|e| e.litres).sum();
    let total_cost: f64 = canonical.iter().map(|e| e.total_price).sum();
    let avg_price_per_litre = if total_litres > 0.0 {
        total_cost / total_litres
    } else {
        0.0
    };

    let cycle_distance = detection.total_distance();
    let total_odometer_distance = (last.odometer - first.odometer).max(0.0);
    let total_distance = if cycle_distance > 0.0 {
        cycle_distance
    } else {
        total_odometer_distance
    };
    let cost_per_km = if total_distance > 0.0 {
        total_cost / total_distance
    } else {
        0.0
    };

    Some(TotalStats {
        total_litres,
        total_cost,
        avg_price_per_litre,
        total_distance,
        cycle_distance,
        total_odometer_distance,
        distance_since_initial_odometer: vehicle
            .initial_odometer
            .map(|initial| (last.odometer - initial).max(0.0)),
        entry_count: sorted.len(),
        full_tank_count: detection.full_tank_count,
        cycle_count: detection.cycles.len(),
        avg_consumption: consumption_per_100km(detection.total_fuel(), cycle_distance),
        cost_per_km,
        first_entry_date: first.date_time,
        last_entry_date: last.date_time,
    })
}
