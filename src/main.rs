use anyhow::Result;
use tokio::signal;
use tracing::{error, info};
use dotenvy::dotenv;

use travel_manager::config::EnvironmentConfig;
use travel_manager::{create_app_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🧳 Travel Manager - API de gestión de viajes");
    info!("============================================");
    info!("📁 Directorio de datos: {}", config.data_dir.display());

    // Inicializar almacén JSON
    let app_state = match AppState::from_config(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error preparando el directorio de datos: {}", e);
            return Err(anyhow::anyhow!("Error de almacenamiento: {}", e));
        }
    };

    if config.is_development() && config.cors_origins.is_empty() {
        info!("🛠️  Modo desarrollo: CORS abierto a cualquier origen");
    }
    if app_state.config.admin_api_key.is_none() {
        info!("🔒 ADMIN_API_KEY no configurada: import y purge de feedback deshabilitados");
    }

    let app = create_app_router(app_state);

    let addr = config.server_url();

    info!("🌐 Servidor iniciando en http://{} ({})", addr, config.environment);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    for entity in [
        "customers",
        "destinations",
        "bookings",
        "schedules",
        "payments",
        "vehicles",
        "staff",
        "feedback",
    ] {
        info!(
            "   GET|POST /{0} · GET|PUT|PATCH|DELETE /{0}/:id · POST /{0}/:id/reactivate",
            entity
        );
    }
    info!("👤 Clientes: POST /customers/:id/cascade-delete, GET /customers/:id/bookings");
    info!("📋 Reservas: GET /bookings/stats, GET /bookings/:id/summary, PATCH /bookings/:id/status");
    info!("🗓️  Horarios: GET /schedules/status-summary");
    info!("💳 Pagos: GET /payments/summary, GET /payments/booking/:booking_id");
    info!("   PATCH /payments/:id/status, PATCH /payments/:id/confirm, POST /payments/:id/refund");
    info!("🚐 Vehículos: POST /vehicles/bulk");
    info!("🧑‍✈️ Personal: GET /staff/summary, GET /staff/assigned-to/:destination_id");
    info!("💬 Feedback: GET /feedback/summary, POST /feedback/:id/notes");
    info!("   POST /feedback/import, DELETE /feedback/purge (x-api-key)");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
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
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
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
