//! Detección de ciclos de consumo
//!
//! Los límites de ciclo son los repostajes de depósito lleno. Con menos de
//! dos depósitos llenos se usan todas las entradas como límites, con un
//! umbral de reseteo más ancho y sin diagnósticos de anomalía.

use tracing::{debug, warn};

use crate::config::AnalyzerConfig;
use crate::models::{CalculationBasis, ConsumptionCycle, CycleKind, Diagnostic, FuelLogEntry, ReasonCode};

/// Resultado de la detección sobre un historial ya ordenado
#[derive(Debug, Clone, PartialEq)]
pub struct CycleDetection {
    pub basis: CalculationBasis,
    pub cycles: Vec<ConsumptionCycle>,
    pub full_tank_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl CycleDetection {
    pub fn total_distance(&self) -> f64 {
        self.cycles.iter().map(|c| c.distance_km).sum()
    }

    pub fn total_fuel(&self) -> f64 {
        self.cycles.iter().map(|c| c.litres).sum()
    }

    pub fn has_anomalies(&self) -> bool {
        self.diagnostics.iter().any(|d| d.code == ReasonCode::OdometerAnomaly)
    }
}

/// Qué hacer con la diferencia de odómetro entre dos límites consecutivos
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Normal(f64),
    Reset(f64),
    Anomaly(f64),
    Excluded,
}

#[derive(Debug, Clone, Copy)]
enum BoundaryRule {
    FullTank { reset_threshold_km: f64 },
    AllEntries { reset_threshold_km: f64 },
}

impl BoundaryRule {
    fn classify(&self, previous_odometer: f64, current_odometer: f64) -> Step {
        let delta = current_odometer - previous_odometer;
        if delta > 0.0 {
            return Step::Normal(delta);
        }
        match *self {
            BoundaryRule::FullTank { reset_threshold_km } => {
                if delta <= -reset_threshold_km {
                    Step::Reset(current_odometer)
                } else {
                    Step::Anomaly(delta)
                }
            }
            BoundaryRule::AllEntries { reset_threshold_km } => {
                if delta < -reset_threshold_km {
                    Step::Reset(current_odometer)
                } else {
                    Step::Excluded
                }
            }
        }
    }
}

/// Detecta los ciclos de un historial ordenado cronológicamente
pub fn detect_cycles(sorted: &[&FuelLogEntry], config: &AnalyzerConfig) -> CycleDetection {
    let full_tanks: Vec<&FuelLogEntry> = sorted.iter().copied().filter(|e| e.full_tank).collect();
    let full_tank_count = full_tanks.len();

    if full_tank_count >= 2 {
        let rule = BoundaryRule::FullTank {
            reset_threshold_km: config.reset_threshold_km,
        };
        let (cycles, diagnostics) = pair_cycles(&full_tanks, rule);
        return CycleDetection {
            basis: CalculationBasis::FullTankPairs,
            cycles,
            full_tank_count,
            diagnostics,
        };
    }

    if sorted.len() < 2 {
        return CycleDetection {
            basis: CalculationBasis::None,
            cycles: Vec::new(),
            full_tank_count,
            diagnostics: Vec::new(),
        };
    }

    debug!(
        "Only {} full tank entries, falling back to all {} entries",
        full_tank_count,
        sorted.len()
    );
    let rule = BoundaryRule::AllEntries {
        reset_threshold_km: config.fallback_reset_threshold_km,
    };
    let (cycles, mut diagnostics) = pair_cycles(sorted, rule);
    diagnostics.insert(
        0,
        Diagnostic::new(
            ReasonCode::NoFullTankPairs,
            format!(
                "Need 2+ full tank entries for accurate calculation (found {}), using all entries",
                full_tank_count
            ),
        ),
    );

    CycleDetection {
        basis: CalculationBasis::AllEntries,
        cycles,
        full_tank_count,
        diagnostics,
    }
}

fn pair_cycles(boundaries: &[&FuelLogEntry], rule: BoundaryRule) -> (Vec<ConsumptionCycle>, Vec<Diagnostic>) {
    let mut cycles = Vec::with_capacity(boundaries.len().saturating_sub(1));
    let mut diagnostics = Vec::new();

    for pair in boundaries.windows(2) {
        let (previous, current) = (pair[0], pair[1]);

        let (distance_km, kind) = match rule.classify(previous.odometer, current.odometer) {
            Step::Normal(distance) => (distance, CycleKind::Normal),
            Step::Reset(distance) if distance > 0.0 => {
                debug!(
                    "Odometer reset between entries {} and {}, using {} km",
                    previous.id, current.id, distance
                );
                (distance, CycleKind::OdometerReset)
            }
            Step::Reset(_) | Step::Excluded => continue,
            Step::Anomaly(delta) => {
                warn!(
                    "Odometer decreased by {}km between entries {} and {}, skipping calculation",
                    delta.abs(),
                    previous.id,
                    current.id
                );
                diagnostics.push(Diagnostic::odometer_anomaly(previous.id, current.id, delta));
                continue;
            }
        };

        cycles.push(ConsumptionCycle {
            from_date: previous.date_time,
            to_date: current.date_time,
            distance_km,
            litres: current.litres,
            consumption_per_100km: current.litres / distance_km * 100.0,
            kind,
        });
    }

    (cycles, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn entries(readings: &[(f64, f64, bool)]) -> Vec<FuelLogEntry> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        readings
            .iter()
            .enumerate()
            .map(|(i, &(odometer, litres, full_tank))| FuelLogEntry {
                id: i as i64 + 1,
                vehicle_id: 1,
                date_time: start + Duration::days(7 * i as i64),
                litres,
                odometer,
                full_tank,
                price_per_litre: 2.0,
                total_price: litres * 2.0,
                location: None,
                notes: None,
            })
            .collect()
    }

    fn detect(readings: &[(f64, f64, bool)]) -> CycleDetection {
        let entries = entries(readings);
        let refs: Vec<&FuelLogEntry> = entries.iter().collect();
        detect_cycles(&refs, &AnalyzerConfig::default())
    }

    #[test]
    fn test_full_tank_pairs() {
        let detection = detect(&[(1000.0, 40.0, true), (1500.0, 38.0, true), (2000.0, 42.0, true)]);
        assert_eq!(detection.basis, CalculationBasis::FullTankPairs);
        assert_eq!(detection.cycles.len(), 2);
        assert_eq!(detection.cycles[0].distance_km, 500.0);
        assert_eq!(detection.cycles[0].litres, 38.0);
        assert_eq!(detection.cycles[1].litres, 42.0);
        assert!(detection.diagnostics.is_empty());
    }

    #[test]
    fn test_partial_fills_are_not_boundaries() {
        let detection = detect(&[(1000.0, 40.0, true), (1300.0, 20.0, false), (1600.0, 45.0, true)]);
        assert_eq!(detection.cycles.len(), 1);
        assert_eq!(detection.cycles[0].distance_km, 600.0);
        assert_eq!(detection.cycles[0].litres, 45.0);
        assert_eq!(detection.full_tank_count, 2);
    }

    #[test]
    fn test_reset_uses_post_reset_odometer() {
        let detection = detect(&[(50000.0, 40.0, true), (120.0, 9.0, true)]);
        assert_eq!(detection.cycles.len(), 1);
        assert_eq!(detection.cycles[0].distance_km, 120.0);
        assert_eq!(detection.cycles[0].kind, CycleKind::OdometerReset);
        assert!(!detection.has_anomalies());
    }

    #[test]
    fn test_small_drop_is_anomaly() {
        let detection = detect(&[(50000.0, 40.0, true), (49970.0, 35.0, true)]);
        assert!(detection.cycles.is_empty());
        assert!(detection.has_anomalies());
        assert_eq!(detection.diagnostics[0].odometer_delta, Some(-30.0));
        assert_eq!(detection.total_distance(), 0.0);
        assert_eq!(detection.total_fuel(), 0.0);
    }

    #[test]
    fn test_reset_threshold_boundaries() {
        // exactamente -50 es reseteo
        let detection = detect(&[(1000.0, 40.0, true), (950.0, 30.0, true)]);
        assert_eq!(detection.cycles[0].kind, CycleKind::OdometerReset);
        assert_eq!(detection.cycles[0].distance_km, 950.0);

        // cero es anomalía
        let detection = detect(&[(1000.0, 40.0, true), (1000.0, 30.0, true)]);
        assert!(detection.cycles.is_empty());
        assert!(detection.has_anomalies());
    }

    #[test]
    fn test_custom_threshold() {
        let entries = entries(&[(1000.0, 40.0, true), (970.0, 30.0, true)]);
        let refs: Vec<&FuelLogEntry> = entries.iter().collect();
        let config = AnalyzerConfig {
            reset_threshold_km: 20.0,
            ..AnalyzerConfig::default()
        };
        let detection = detect_cycles(&refs, &config);
        assert_eq!(detection.cycles[0].kind, CycleKind::OdometerReset);
    }

    #[test]
    fn test_fallback_to_all_entries() {
        let detection = detect(&[(1000.0, 40.0, true), (1400.0, 30.0, false), (1900.0, 35.0, false)]);
        assert_eq!(detection.basis, CalculationBasis::AllEntries);
        assert_eq!(detection.cycles.len(), 2);
        assert_eq!(detection.total_distance(), 900.0);
        assert_eq!(detection.diagnostics[0].code, ReasonCode::NoFullTankPairs);
    }

    #[test]
    fn test_fallback_excludes_drops_silently() {
        // -80 cae dentro de (-100, 0]: se excluye sin anomalía
        let detection = detect(&[(1000.0, 40.0, false), (920.0, 30.0, false), (1420.0, 35.0, false)]);
        assert_eq!(detection.cycles.len(), 1);
        assert_eq!(detection.cycles[0].distance_km, 500.0);
        assert!(!detection.has_anomalies());

        // -100 exacto sigue sin ser reseteo en el modo de todas las entradas
        let detection = detect(&[(1000.0, 40.0, false), (900.0, 30.0, false)]);
        assert!(detection.cycles.is_empty());

        let detection = detect(&[(1000.0, 40.0, false), (300.0, 30.0, false)]);
        assert_eq!(detection.cycles[0].kind, CycleKind::OdometerReset);
        assert_eq!(detection.cycles[0].distance_km, 300.0);
    }

    #[test]
    fn test_single_entry_has_no_basis() {
        let detection = detect(&[(1000.0, 40.0, true)]);
        assert_eq!(detection.basis, CalculationBasis::None);
        assert!(detection.cycles.is_empty());
        assert!(detection.diagnostics.is_empty());
    }
}
