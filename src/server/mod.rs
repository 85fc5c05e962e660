pub mod config;
pub mod route_builder;

use crate::{
    auth::jwt::{JwtService, JwtServiceImpl, parse_algorithm},
    config::Config,
    dashboard::DashboardService,
    database::{DatabaseManager, DatabaseManagerImpl},
    error::AppError,
    health::HealthService,
    routes::{
        create_customer_routes, create_dashboard_routes, create_health_routes,
        create_invoice_routes, create_settings_routes, create_user_protected_routes,
        create_user_public_routes,
    },
    server::route_builder::{RouteHelpers, cors_layer, middleware_factories::request_response_logger},
    shutdown::ShutdownCoordinator,
    utils::request_id::request_id_middleware,
};
use axum::{Router, extract::DefaultBodyLimit, middleware};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Maximum request body size (1MB)
const MAX_BODY_SIZE: usize = 1024 * 1024;

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub jwt_service: Arc<dyn JwtService>,
    pub health_service: Arc<HealthService>,
    pub database: Arc<dyn DatabaseManager>,
    pub dashboard: Arc<DashboardService>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let database_impl = Arc::new(DatabaseManagerImpl::new_from_config(&config.database).await?);
        let database: Arc<dyn DatabaseManager> = database_impl.clone();

        let jwt_algorithm = parse_algorithm(&config.jwt.algorithm)?;
        let jwt_service_impl = JwtServiceImpl::new(
            &config.jwt.secret,
            jwt_algorithm,
            config.jwt.expiry_seconds,
        )?;

        let health_service = Arc::new(HealthService::new());
        health_service.register(database_impl).await;
        health_service
            .register(jwt_service_impl.health_checker())
            .await;

        let jwt_service: Arc<dyn JwtService> = Arc::new(jwt_service_impl);
        let dashboard = Arc::new(DashboardService::new(database.clone()));

        Ok(Self {
            config: Arc::new(config),
            jwt_service,
            health_service,
            database,
            dashboard,
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
        })
    }

    pub async fn run(&self) -> Result<(), AppError> {
        if self.config.database.migration_on_startup {
            self.database.migrate().await?;
        }

        let app = self.create_app();

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("Server listening on http://{}", addr);

        let signal_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            signal_coordinator.wait_for_shutdown_signal().await;
        });

        let mut shutdown_rx = self.shutdown_coordinator.subscribe();
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            info!("Graceful shutdown initiated");
        })
        .await;

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(AppError::Internal(format!("Server error: {}", e)));
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Build the application router
    pub fn create_app(&self) -> Router {
        let mut app = Router::new()
            .merge(create_health_routes())
            .merge(RouteHelpers::without_auth(
                "/api/users",
                create_user_public_routes(),
            ))
            .merge(RouteHelpers::with_jwt_auth(
                "/api/users",
                create_user_protected_routes(),
                self,
            ))
            .merge(RouteHelpers::with_jwt_auth(
                "/api/customers",
                create_customer_routes(),
                self,
            ))
            .merge(RouteHelpers::with_jwt_auth(
                "/api/invoices",
                create_invoice_routes(),
                self,
            ))
            .merge(RouteHelpers::with_jwt_auth(
                "/api/settings",
                create_settings_routes(),
                self,
            ))
            .merge(RouteHelpers::with_jwt_auth(
                "/api/dashboard",
                create_dashboard_routes(),
                self,
            ))
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .with_state(self.clone());

        if self.config.logging.log_request {
            app = app.layer(middleware::from_fn(request_response_logger));
        }

        app.layer(middleware::from_fn(request_id_middleware))
            .layer(cors_layer(&self.config.cors))
    }
}
