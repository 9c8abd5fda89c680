use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fuel_analytics::api::create_router;
use fuel_analytics::clients::FuelDataSource;
use fuel_analytics::config::EnvironmentConfig;
use fuel_analytics::models::{ConsumptionCycle, FuelLogEntry, FuelType, Vehicle};
use fuel_analytics::state::AppState;
use fuel_analytics::{AppError, AppResult};

const TOKEN: &str = "Bearer test-token";

/// Backend en memoria: un vehículo (id 1) con entradas modificables
struct MockBackend {
    entries: Mutex<Vec<FuelLogEntry>>,
    cycles: Option<Vec<ConsumptionCycle>>,
    entry_fetches: AtomicUsize,
}

impl MockBackend {
    fn new(entries: Vec<FuelLogEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            cycles: None,
            entry_fetches: AtomicUsize::new(0),
        }
    }

    fn check(&self, vehicle_id: i64, authorization: Option<&str>) -> AppResult<()> {
        if authorization != Some(TOKEN) {
            return Err(AppError::Unauthorized("missing or invalid token".to_string()));
        }
        if vehicle_id != 1 {
            return Err(AppError::NotFound(format!("vehicle {}", vehicle_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl FuelDataSource for MockBackend {
    async fn get_vehicle(&self, vehicle_id: i64, authorization: Option<&str>) -> AppResult<Vehicle> {
        self.check(vehicle_id, authorization)?;
        Ok(Vehicle {
            id: 1,
            make: "Renault".to_string(),
            model: "Clio".to_string(),
            fuel_type: FuelType::Diesel,
            manufacturing_year: 2019,
            license_plate: "8841-KLM".to_string(),
            initial_odometer: Some(1000.0),
            tank_capacity_liters: Some(45.0),
        })
    }

    async fn list_fuel_entries(&self, vehicle_id: i64, authorization: Option<&str>) -> AppResult<Vec<FuelLogEntry>> {
        self.check(vehicle_id, authorization)?;
        self.entry_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn list_consumption_cycles(
        &self,
        vehicle_id: i64,
        authorization: Option<&str>,
    ) -> AppResult<Vec<ConsumptionCycle>> {
        self.check(vehicle_id, authorization)?;
        self.cycles
            .clone()
            .ok_or_else(|| AppError::ExternalApi("history endpoint not available".to_string()))
    }
}

fn entry(id: i64, day: i64, odometer: f64, litres: f64) -> FuelLogEntry {
    FuelLogEntry {
        id,
        vehicle_id: 1,
        date_time: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            + Duration::days(day),
        litres,
        odometer,
        full_tank: true,
        price_per_litre: 1.60,
        total_price: litres * 1.60,
        location: Some("Repsol Av. América".to_string()),
        notes: None,
    }
}

fn sample_entries() -> Vec<FuelLogEntry> {
    vec![
        entry(3, 20, 2000.0, 42.0),
        entry(1, 0, 1000.0, 40.0),
        entry(2, 10, 1500.0, 38.0),
    ]
}

fn create_test_app(backend: Arc<MockBackend>) -> Router {
    create_router(AppState::with_source(EnvironmentConfig::default(), backend))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", TOKEN);
    let body = match body {
        Some(value) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(Arc::new(MockBackend::new(vec![])));
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "fuel-analytics");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_report_for_vehicle() {
    let app = create_test_app(Arc::new(MockBackend::new(sample_entries())));
    let (status, body) = get(&app, "/api/analytics/vehicles/1/report").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicleId"], 1);
    assert_eq!(body["basis"], "fullTankPairs");
    assert_eq!(body["totalStats"]["avgConsumption"], 8.0);
    assert_eq!(body["totalStats"]["entryCount"], 3);
    assert_eq!(body["cycles"].as_array().unwrap().len(), 2);
    assert_eq!(body["cycles"][0]["distanceKm"], 500.0);
    assert_eq!(body["insufficientData"], Value::Null);
    assert_eq!(body["monthlySource"], "local");
}

#[tokio::test]
async fn test_consumption_endpoint() {
    let app = create_test_app(Arc::new(MockBackend::new(sample_entries())));
    let (status, body) = get(&app, "/api/analytics/vehicles/1/consumption").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicleId"], 1);
    assert_eq!(body["avgConsumptionPer100km"], 8.0);
}

#[tokio::test]
async fn test_consumption_without_entries_reports_reason() {
    let app = create_test_app(Arc::new(MockBackend::new(vec![])));
    let (status, body) = get(&app, "/api/analytics/vehicles/1/consumption").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avgConsumptionPer100km"], 0.0);
    assert_eq!(body["insufficientData"], "NO_ENTRIES");
}

#[tokio::test]
async fn test_history_and_monthly() {
    let app = create_test_app(Arc::new(MockBackend::new(sample_entries())));

    let (status, history) = get(&app, "/api/analytics/vehicles/1/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[1]["litres"], 42.0);

    let (status, monthly) = get(&app, "/api/analytics/vehicles/1/monthly").await;
    assert_eq!(status, StatusCode::OK);
    let months = monthly.as_array().unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0]["month"], "2024-01");
    assert_eq!(months[0]["cycleCount"], 2);
}

#[tokio::test]
async fn test_single_month_lookup() {
    let app = create_test_app(Arc::new(MockBackend::new(sample_entries())));

    let (status, body) = get(&app, "/api/analytics/vehicles/1/monthly/2024/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month"], "2024-01");
    assert!((body["avgConsumptionPer100km"].as_f64().unwrap() - 8.0).abs() < 1e-9);
    assert_eq!(body["weightedConsumptionPer100km"], 8.0);
    assert_eq!(body["source"], "local");

    let (status, body) = get(&app, "/api/analytics/vehicles/1/monthly/2024/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = get(&app, "/api/analytics/vehicles/1/monthly/2024/13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upstream_errors_are_mapped() {
    let app = create_test_app(Arc::new(MockBackend::new(sample_entries())));

    let (status, body) = get(&app, "/api/analytics/vehicles/7/report").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let request = Request::builder()
        .uri("/api/analytics/vehicles/1/report")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_entries_are_rejected() {
    let mut entries = sample_entries();
    entries[0].litres = -5.0;
    let app = create_test_app(Arc::new(MockBackend::new(entries)));

    let (status, body) = get(&app, "/api/analytics/vehicles/1/report").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_report_is_memoized_until_entries_change() {
    let backend = Arc::new(MockBackend::new(sample_entries()));
    let app = create_test_app(backend.clone());

    let (_, first) = get(&app, "/api/analytics/vehicles/1/report").await;
    let (_, second) = get(&app, "/api/analytics/vehicles/1/report").await;
    assert_eq!(first, second);

    let (_, stats) = get(&app, "/api/analytics/cache/stats").await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);

    backend.entries.lock().unwrap().push(entry(4, 30, 2600.0, 51.0));
    let (_, third) = get(&app, "/api/analytics/vehicles/1/report").await;
    assert_eq!(third["cycles"].as_array().unwrap().len(), 3);
    assert_eq!(third["totalStats"]["entryCount"], 4);

    let (_, stats) = get(&app, "/api/analytics/cache/stats").await;
    assert_eq!(stats["entriesStale"], 1);
    assert_eq!(backend.entry_fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cache_invalidation_endpoint() {
    let app = create_test_app(Arc::new(MockBackend::new(sample_entries())));

    let (status, body) = send(&app, "DELETE", "/api/analytics/vehicles/1/cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invalidated"], false);

    get(&app, "/api/analytics/vehicles/1/report").await;
    let (_, body) = send(&app, "DELETE", "/api/analytics/vehicles/1/cache", None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["invalidated"], true);

    let (_, stats) = get(&app, "/api/analytics/cache/stats").await;
    assert_eq!(stats["entriesInvalidated"], 1);
}

#[tokio::test]
async fn test_backend_cycles_feed_monthly_when_no_local_cycles() {
    let mut backend = MockBackend::new(vec![entry(1, 0, 1000.0, 40.0)]);
    backend.cycles = Some(vec![ConsumptionCycle {
        from_date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        to_date: NaiveDate::from_ymd_opt(2023, 12, 20).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        distance_km: 400.0,
        litres: 30.0,
        consumption_per_100km: 7.5,
        kind: Default::default(),
    }]);
    let app = create_test_app(Arc::new(backend));

    let (status, body) = get(&app, "/api/analytics/vehicles/1/report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cycles"].as_array().unwrap().len(), 0);
    assert_eq!(body["monthlySource"], "backend");
    assert_eq!(body["monthlyStats"][0]["month"], "2023-12");
    assert_eq!(body["monthlyStats"][0]["avgConsumptionPer100km"], 7.5);
}

#[tokio::test]
async fn test_inline_analysis() {
    let app = create_test_app(Arc::new(MockBackend::new(vec![])));
    let request = json!({
        "vehicle": {
            "id": 5,
            "make": "Seat",
            "model": "Ibiza",
            "fuelType": "PETROL",
            "manufacturingYear": 2015,
            "licensePlate": "1234-ABC"
        },
        "entries": [
            { "id": 11, "vehicleId": 5, "dateTime": "2024-03-01T10:00:00", "litres": 30.0, "odometer": 50000.0,
              "fullTank": true, "pricePerLitre": 1.7, "totalPrice": 51.0 },
            { "id": 12, "vehicleId": 5, "dateTime": "2024-03-15T10:00:00", "litres": 9.0, "odometer": 120.0,
              "fullTank": true, "pricePerLitre": 1.7, "totalPrice": 15.3 }
        ]
    });

    let (status, body) = send(&app, "POST", "/api/analytics/analyze", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicleId"], 5);
    assert_eq!(body["cycles"][0]["distanceKm"], 120.0);
    assert_eq!(body["cycles"][0]["kind"], "odometerReset");
}
