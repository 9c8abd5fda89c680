use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use dotenvy::dotenv;

use fuel_analytics::api::create_router;
use fuel_analytics::config::EnvironmentConfig;
use fuel_analytics::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fuel_analytics=debug,tower_http=info")),
        )
        .init();

    info!("⛽ Fuel Analytics - consumo por vehículo");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    info!("🔗 Backend del fuel tracker: {}", config.fuel_tracker_api_url);
    info!(
        "📏 Umbrales de reseteo de odómetro: {} km (depósito lleno), {} km (todas las entradas)",
        config.analyzer.reset_threshold_km, config.analyzer.fallback_reset_threshold_km
    );

    let addr: SocketAddr = config.server_url().parse()?;
    let app_state = AppState::new(config)?;
    let app = create_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   GET  /api/analytics/vehicles/:id/report - Informe completo");
    info!("   GET  /api/analytics/vehicles/:id/consumption - Consumo medio");
    info!("   GET  /api/analytics/vehicles/:id/history - Ciclos de consumo");
    info!("   GET  /api/analytics/vehicles/:id/monthly - Serie mensual");
    info!("   GET  /api/analytics/vehicles/:id/monthly/:year/:month - Un mes");
    info!("   DELETE /api/analytics/vehicles/:id/cache - Invalidar informe");
    info!("   GET  /api/analytics/cache/stats - Estadísticas de cache");
    info!("   POST /api/analytics/analyze - Analizar historial enviado");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
