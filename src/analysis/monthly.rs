//! Agregados mensuales
//!
//! Cada ciclo pertenece al mes de su `to_date`. Solo aparecen los meses con
//! al menos un ciclo válido, en todas las series (consumo, coste, litros).

use std::collections::BTreeMap;

use crate::analysis::aggregates::consumption_per_100km;
use crate::analysis::normalize::canonical_order;
use crate::models::{ConsumptionCycle, FuelLogEntry, MonthlyStats, YearMonth};

#[derive(Default)]
struct MonthAccumulator {
    consumptions: Vec<f64>,
    entry_count: usize,
    total_litres: f64,
    total_cost: f64,
}

/// Agrupa ciclos y entradas por mes de calendario, ordenado por mes
pub fn bucket_by_month(cycles: &[ConsumptionCycle], sorted: &[&FuelLogEntry]) -> Vec<MonthlyStats> {
    let mut months: BTreeMap<YearMonth, MonthAccumulator> = BTreeMap::new();

    for cycle in cycles {
        months
            .entry(YearMonth::of(&cycle.to_date))
            .or_default()
            .consumptions
            .push(cycle.consumption_per_100km);
    }

    for entry in canonical_order(sorted) {
        if let Some(month) = months.get_mut(&YearMonth::of(&entry.date_time)) {
            month.entry_count += 1;
            month.total_litres += entry.litres;
            month.total_cost += entry.total_price;
        }
    }

    months
        .into_iter()
        .map(|(month, acc)| {
            let cycle_count = acc.consumptions.len();
            MonthlyStats {
                month,
                cycle_count,
                avg_consumption_per_100km: acc.consumptions.iter().sum::<f64>() / cycle_count as f64,
                entry_count: acc.entry_count,
                total_litres: acc.total_litres,
                total_cost: acc.total_cost,
                avg_price_per_litre: if acc.total_litres > 0.0 {
                    acc.total_cost / acc.total_litres
                } else {
                    0.0
                },
            }
        })
        .collect()
}

/// Consumo ponderado por distancia de un mes concreto, útil para comparar
/// con la media sin ponderar de la serie
pub fn weighted_consumption_for(cycles: &[ConsumptionCycle], month: YearMonth) -> f64 {
    let (fuel, distance) = cycles
        .iter()
        .filter(|c| YearMonth::of(&c.to_date) == month)
        .fold((0.0, 0.0), |(fuel, distance), c| (fuel + c.litres, distance + c.distance_km));
    consumption_per_100km(fuel, distance)
}
