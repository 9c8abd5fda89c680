//! Modelo de Vehicle
//!
//! Mapea el DTO de vehículo que expone el backend del fuel tracker.
//! Solo `initial_odometer` tiene un papel en el análisis de consumo.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tipo de combustible del vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FuelType {
    Petrol,
    Diesel,
}

impl FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "petrol" | "gasoline" => Ok(FuelType::Petrol),
            "diesel" => Ok(FuelType::Diesel),
            other => Err(format!("unknown fuel type '{}'", other)),
        }
    }
}

impl TryFrom<String> for FuelType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FuelType> for String {
    fn from(value: FuelType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelType::Petrol => write!(f, "Petrol"),
            FuelType::Diesel => write!(f, "Diesel"),
        }
    }
}

/// Vehicle tal como lo devuelve `GET /vehicles/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub fuel_type: FuelType,
    pub manufacturing_year: i32,
    pub license_plate: String,
    /// Lectura base antes de la primera entrada registrada
    #[serde(default)]
    pub initial_odometer: Option<f64>,
    #[serde(default)]
    pub tank_capacity_liters: Option<f64>,
}

impl Vehicle {
    /// Etiqueta corta para logs: "Toyota Corolla (ABC-123)"
    pub fn display_name(&self) -> String {
        format!("{} {} ({})", self.make, self.model, self.license_plate)
    }
}
