//! Modelos de Analytics de consumo
//!
//! Resultados derivados por el analizador: ciclos de consumo, totales,
//! agregados mensuales y diagnósticos. Nada de esto se persiste.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cómo se delimitó un ciclo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CycleKind {
    #[default]
    Normal,
    /// El odómetro cayó bruscamente; la distancia es la lectura posterior
    OdometerReset,
}

/// Qué entradas se usaron como límites de ciclo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculationBasis {
    FullTankPairs,
    AllEntries,
    /// Menos de dos entradas, no hay pares posibles
    None,
}

/// De dónde salen los ciclos de la serie mensual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthlySource {
    Local,
    Backend,
}

/// Ciclo de consumo entre dos repostajes límite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionCycle {
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
    pub distance_km: f64,
    #[serde(default)]
    pub litres: f64,
    pub consumption_per_100km: f64,
    #[serde(default)]
    pub kind: CycleKind,
}

/// Códigos máquina para "datos insuficientes" y anomalías
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    NoEntries,
    NoFullTankPairs,
    OdometerAnomaly,
}

/// Diagnóstico no fatal que acompaña al informe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: ReasonCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_entry_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_entry_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odometer_delta: Option<f64>,
}

impl Diagnostic {
    pub fn new(code: ReasonCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            from_entry_id: None,
            to_entry_id: None,
            odometer_delta: None,
        }
    }

    pub fn odometer_anomaly(from_entry_id: i64, to_entry_id: i64, delta: f64) -> Self {
        Self {
            code: ReasonCode::OdometerAnomaly,
            message: format!(
                "Odometer decreased by {:.1} km between entries {} and {}, cycle skipped",
                delta.abs(),
                from_entry_id,
                to_entry_id
            ),
            from_entry_id: Some(from_entry_id),
            to_entry_id: Some(to_entry_id),
            odometer_delta: Some(delta),
        }
    }
}

/// Totales globales del historial de un vehículo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStats {
    pub total_litres: f64,
    pub total_cost: f64,
    pub avg_price_per_litre: f64,
    /// Distancia de ciclos, o la del odómetro si la de ciclos es 0
    pub total_distance: f64,
    pub cycle_distance: f64,
    pub total_odometer_distance: f64,
    pub distance_since_initial_odometer: Option<f64>,
    pub entry_count: usize,
    pub full_tank_count: usize,
    pub cycle_count: usize,
    pub avg_consumption: f64,
    pub cost_per_km: f64,
    pub first_entry_date: NaiveDateTime,
    pub last_entry_date: NaiveDateTime,
}

/// Mejor, peor y media sin ponderar de los ciclos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub best: f64,
    pub worst: f64,
    pub mean: f64,
}

/// Año-mes de calendario, serializado como `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date_time: &NaiveDateTime) -> Self {
        Self {
            year: date_time.year(),
            month: date_time.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| format!("invalid year-month '{}'", value))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid year in '{}'", value))?;
        let month: u32 = month.parse().map_err(|_| format!("invalid month in '{}'", value))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", value))
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Agregado mensual; solo existe para meses con al menos un ciclo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub month: YearMonth,
    pub cycle_count: usize,
    pub avg_consumption_per_100km: f64,
    pub entry_count: usize,
    pub total_litres: f64,
    pub total_cost: f64,
    pub avg_price_per_litre: f64,
}

/// Informe completo que recibe la capa de presentación
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionReport {
    pub vehicle_id: i64,
    pub basis: CalculationBasis,
    pub total_stats: Option<TotalStats>,
    pub cycles: Vec<ConsumptionCycle>,
    pub cycle_summary: Option<CycleSummary>,
    pub monthly_stats: Vec<MonthlyStats>,
    pub monthly_source: MonthlySource,
    pub insufficient_data: Option<ReasonCode>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_cycles: Option<Vec<ConsumptionCycle>>,
}

impl ConsumptionReport {
    /// Consumo medio en L/100km, 0 cuando no hay datos suficientes
    pub fn avg_consumption(&self) -> f64 {
        self.total_stats.as_ref().map_or(0.0, |s| s.avg_consumption)
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.code == ReasonCode::OdometerAnomaly)
    }
}
