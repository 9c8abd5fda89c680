//! Services module
//!
//! Este módulo contiene la lógica de negocio del gateway: orquesta el acceso
//! al backend, el analizador de consumo y el cache de informes.

pub mod analytics_service;

pub use analytics_service::AnalyticsService;
