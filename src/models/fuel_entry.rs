//! Modelo de FuelLogEntry
//!
//! Una entrada de repostaje tal como la expone el backend
//! (`GET /fuelentries/vehicle/{id}`). Es inmutable una vez creada.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::errors::{invalid_input_error, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FuelLogEntry {
    pub id: i64,
    pub vehicle_id: i64,
    pub date_time: NaiveDateTime,
    pub litres: f64,
    pub odometer: f64,
    pub full_tank: bool,
    pub price_per_litre: f64,
    pub total_price: f64,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub location: Option<String>,

    #[validate(length(max = 1000))]
    #[serde(default)]
    pub notes: Option<String>,
}

impl FuelLogEntry {
    /// Comprueba las invariantes numéricas de la entrada y que pertenece al
    /// vehículo indicado. Las longitudes de texto van por `Validate`.
    pub fn check_invariants(&self, vehicle_id: i64) -> AppResult<()> {
        if self.vehicle_id != vehicle_id {
            return Err(invalid_input_error(format!(
                "fuel entry {} belongs to vehicle {}, not {}",
                self.id, self.vehicle_id, vehicle_id
            )));
        }
        if !(self.litres.is_finite() && self.litres > 0.0) {
            return Err(invalid_input_error(format!(
                "fuel entry {}: litres must be positive, got {}",
                self.id, self.litres
            )));
        }
        if !(self.odometer.is_finite() && self.odometer > 0.0) {
            return Err(invalid_input_error(format!(
                "fuel entry {}: odometer must be positive, got {}",
                self.id, self.odometer
            )));
        }
        if !(self.price_per_litre.is_finite() && self.price_per_litre >= 0.0) {
            return Err(invalid_input_error(format!(
                "fuel entry {}: price per litre must not be negative, got {}",
                self.id, self.price_per_litre
            )));
        }
        if !(self.total_price.is_finite() && self.total_price >= 0.0) {
            return Err(invalid_input_error(format!(
                "fuel entry {}: total price must not be negative, got {}",
                self.id, self.total_price
            )));
        }
        self.validate()?;
        Ok(())
    }
}
