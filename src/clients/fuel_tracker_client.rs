//! Cliente HTTP para el API REST del fuel tracker
//!
//! Capa de acceso a datos: vehículos, entradas de repostaje y los ciclos que
//! calcula el backend. La cabecera `Authorization` del llamante se reenvía
//! tal cual; aquí no se almacenan credenciales ni se reintenta.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::models::{ConsumptionCycle, FuelLogEntry, Vehicle};
use crate::utils::errors::{AppError, AppResult};

/// Origen de los datos de un vehículo
#[async_trait]
pub trait FuelDataSource: Send + Sync {
    async fn get_vehicle(&self, vehicle_id: i64, authorization: Option<&str>) -> AppResult<Vehicle>;

    /// Entradas del vehículo, en cualquier orden
    async fn list_fuel_entries(&self, vehicle_id: i64, authorization: Option<&str>) -> AppResult<Vec<FuelLogEntry>>;

    /// Ciclos calculados por el backend, si los ofrece
    async fn list_consumption_cycles(
        &self,
        vehicle_id: i64,
        authorization: Option<&str>,
    ) -> AppResult<Vec<ConsumptionCycle>>;
}

/// Cliente HTTP contra `{base_url}/vehicles`, `{base_url}/fuelentries`, ...
pub struct FuelTrackerClient {
    client: Client,
    base_url: String,
}

impl FuelTrackerClient {
    /// Crear nuevo cliente HTTP con URL base configurable
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, authorization: Option<&str>) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json");
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(status, &url));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Error parsing JSON from {}: {}", url, e)))
    }
}

/// Traduce un status del backend a nuestro error
pub fn upstream_error(status: StatusCode, url: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized("Authentication failed against fuel tracker API".to_string()),
        StatusCode::FORBIDDEN => AppError::Forbidden("You do not have permission to access this vehicle".to_string()),
        StatusCode::NOT_FOUND => AppError::NotFound(format!("Upstream resource not found: {}", url)),
        other => AppError::ExternalApi(format!("Error HTTP {} from {}", other, url)),
    }
}

#[async_trait]
impl FuelDataSource for FuelTrackerClient {
    async fn get_vehicle(&self, vehicle_id: i64, authorization: Option<&str>) -> AppResult<Vehicle> {
        self.get_json(&format!("/vehicles/{}", vehicle_id), authorization).await
    }

    async fn list_fuel_entries(&self, vehicle_id: i64, authorization: Option<&str>) -> AppResult<Vec<FuelLogEntry>> {
        self.get_json(&format!("/fuelentries/vehicle/{}", vehicle_id), authorization)
            .await
    }

    async fn list_consumption_cycles(
        &self,
        vehicle_id: i64,
        authorization: Option<&str>,
    ) -> AppResult<Vec<ConsumptionCycle>> {
        self.get_json(&format!("/analytics/vehicles/{}/history", vehicle_id), authorization)
            .await
    }
}
