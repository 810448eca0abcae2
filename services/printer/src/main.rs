//! printer-service 入口

use std::sync::Arc;

use ditto_bootstrap::{AuthInterceptor, Infrastructure, run_server};
use ditto_errors::AppError;
use ditto_service_core::BaseService;
use printer_service::FILE_DESCRIPTOR_SET;
use printer_service::api::PrinterServiceImpl;
use printer_service::application::PrinterHandler;
use printer_service::infrastructure::persistence::{
    MIGRATOR, PostgresPrinterStore, StorePrinterRepository,
};
use printer_service::proto::printer_service_server::PrinterServiceServer;
use tonic_reflection::server::Builder as ReflectionBuilder;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_server("config", |infra: Infrastructure, mut server| async move {
        info!("Initializing printer service...");

        let pool = infra.postgres_pool();
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| AppError::storage(format!("Failed to run migrations: {}", e)))?;
        info!("Migrations applied");

        let store = Arc::new(PostgresPrinterStore::new(pool));
        let base = BaseService::new(store);
        let repository = Arc::new(StorePrinterRepository::new(base.clone()));
        let handler = Arc::new(PrinterHandler::new(base, repository));
        let service = PrinterServiceImpl::new(handler, infra.shutdown().token().clone());
        let interceptor = AuthInterceptor::new(infra.token_service());

        let reflection_service = ReflectionBuilder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .map_err(|e| AppError::internal(format!("Failed to build reflection service: {}", e)))?;

        Ok(server
            .add_service(PrinterServiceServer::with_interceptor(service, interceptor))
            .add_service(reflection_service))
    })
    .await
}
