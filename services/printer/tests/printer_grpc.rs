//! 通过授权拦截器与 gRPC 层的端到端流程

use std::sync::Arc;

use ditto_auth_core::TokenService;
use ditto_bootstrap::auth_interceptor;
use ditto_ports::MemoryResourceStore;
use ditto_service_core::BaseService;
use printer_service::api::PrinterServiceImpl;
use printer_service::application::PrinterHandler;
use printer_service::domain::Printer;
use printer_service::infrastructure::persistence::StorePrinterRepository;
use printer_service::proto::printer_service_server::PrinterService;
use printer_service::proto::*;
use printer_service::proto::Status as PrinterStatus;
use tokio_util::sync::CancellationToken;
use tonic::metadata::MetadataValue;
use tonic::{Code, Request, Status};

const SECRET: &str = "printer-e2e-secret";

struct TestApp {
    tokens: TokenService,
    service: PrinterServiceImpl<MemoryResourceStore<Printer>>,
    shutdown: CancellationToken,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryResourceStore::new());
        let base = BaseService::new(store);
        let repository = Arc::new(StorePrinterRepository::new(base.clone()));
        let handler = Arc::new(PrinterHandler::new(base, repository));
        let shutdown = CancellationToken::new();
        Self {
            tokens: TokenService::new(SECRET, 3600, None),
            service: PrinterServiceImpl::new(handler, shutdown.clone()),
            shutdown,
        }
    }

    fn token_for(&self, user_id: &str) -> String {
        self.tokens.issue(user_id, &format!("{}-name", user_id)).unwrap()
    }

    /// 构造带 token 的请求并让它先经过拦截器
    fn authorized<T>(&self, user_id: &str, message: T) -> Result<Request<T>, Status> {
        let token = self.token_for(user_id);
        self.intercept(with_authorization(message, &format!("Bearer {}", token)))
    }

    fn intercept<T>(&self, request: Request<T>) -> Result<Request<T>, Status> {
        let (metadata, extensions, message) = request.into_parts();
        let intercepted = auth_interceptor(&self.tokens, Request::from_parts(metadata, extensions, ()))?;
        let (metadata, extensions, ()) = intercepted.into_parts();
        Ok(Request::from_parts(metadata, extensions, message))
    }

    async fn create(&self, user_id: &str, name: &str, serial: &str) -> PrinterDto {
        let request = self
            .authorized(
                user_id,
                CreatePrinterRequest {
                    request: Some(PrinterDto {
                        name: name.to_string(),
                        serial_number: serial.to_string(),
                        ..Default::default()
                    }),
                },
            )
            .unwrap();
        self.service
            .create_printer(request)
            .await
            .unwrap()
            .into_inner()
            .response
            .unwrap()
    }

    async fn get(&self, user_id: &str, printer_id: &str) -> Result<PrinterDto, Status> {
        let request = self.authorized(
            user_id,
            GetPrinterByExternalIdRequest {
                printer_id: printer_id.to_string(),
            },
        )?;
        Ok(self
            .service
            .get_printer_by_external_id(request)
            .await?
            .into_inner()
            .response
            .unwrap_or_default())
    }

    async fn list(&self, user_id: &str) -> Vec<PrinterDto> {
        let request = self.authorized(user_id, NoOpRequest {}).unwrap();
        self.service
            .multi_get_printers_for_user(request)
            .await
            .unwrap()
            .into_inner()
            .result
    }

    async fn delete(&self, user_id: &str, printer_id: &str) -> Result<PrinterDto, Status> {
        let request = self.authorized(
            user_id,
            DeletePrinterRequest {
                printer_id: printer_id.to_string(),
            },
        )?;
        Ok(self
            .service
            .delete_printer(request)
            .await?
            .into_inner()
            .response
            .unwrap_or_default())
    }
}

fn with_authorization<T>(message: T, value: &str) -> Request<T> {
    let mut request = Request::new(message);
    request
        .metadata_mut()
        .insert("x-request-id", MetadataValue::from_static("e2e"));
    request
        .metadata_mut()
        .insert("authorization", value.parse().unwrap());
    request
}

#[tokio::test]
async fn test_create_then_get() {
    let app = TestApp::new();
    let created = app.create("u1", "HP-1", "SN100").await;
    assert!(!created.external_id.is_empty());

    let fetched = app.get("u1", &created.external_id).await.unwrap();
    assert_eq!(fetched.name, "HP-1");
    assert_eq!(fetched.serial_number, "SN100");
    assert_eq!(fetched.status, PrinterStatus::Active as i32);
}

#[tokio::test]
async fn test_created_ids_are_distinct() {
    let app = TestApp::new();
    let a = app.create("u1", "HP-1", "SN100").await;
    let b = app.create("u1", "HP-2", "SN101").await;
    assert_ne!(a.external_id, b.external_id);
}

#[tokio::test]
async fn test_update_is_sparse() {
    let app = TestApp::new();
    let created = app.create("u1", "HP-1", "SN100").await;

    let request = app
        .authorized(
            "u1",
            UpdatePrinterRequest {
                printer_id: created.external_id.clone(),
                request: Some(PrinterDto {
                    description: "broken".to_string(),
                    ..Default::default()
                }),
            },
        )
        .unwrap();
    app.service.update_printer(request).await.unwrap();

    let fetched = app.get("u1", &created.external_id).await.unwrap();
    assert_eq!(fetched.name, "HP-1");
    assert_eq!(fetched.description, "broken");
}

#[tokio::test]
async fn test_update_unknown_printer_is_not_found() {
    let app = TestApp::new();
    let request = app
        .authorized(
            "u1",
            UpdatePrinterRequest {
                printer_id: "missing".to_string(),
                request: Some(PrinterDto::default()),
            },
        )
        .unwrap();
    let status = app.service.update_printer(request).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn test_missing_authorization_is_unauthenticated() {
    let app = TestApp::new();
    let mut request = Request::new(NoOpRequest {});
    request
        .metadata_mut()
        .insert("x-request-id", MetadataValue::from_static("e2e"));

    let status = app.intercept(request).unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn test_wrong_signing_key_is_permission_denied() {
    let app = TestApp::new();
    let forged = TokenService::new("someone-else", 3600, None)
        .issue("u1", "mallory")
        .unwrap();

    let status = app
        .intercept(with_authorization(NoOpRequest {}, &forged))
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}

#[tokio::test]
async fn test_delete_is_scoped_to_owner() {
    let app = TestApp::new();
    let created = app.create("u1", "HP-1", "SN100").await;

    let status = app.delete("u2", &created.external_id).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(app.list("u1").await.len(), 1);

    let deleted = app.delete("u1", &created.external_id).await.unwrap();
    assert_eq!(deleted.status, PrinterStatus::Inactive as i32);

    assert!(app.list("u1").await.is_empty());
    let fetched = app.get("u1", &created.external_id).await.unwrap();
    assert_eq!(fetched.status, PrinterStatus::Inactive as i32);
}

#[tokio::test]
async fn test_list_only_returns_callers_printers() {
    let app = TestApp::new();
    app.create("u1", "HP-1", "SN100").await;
    app.create("u2", "HP-2", "SN200").await;

    let listed = app.list("u1").await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "HP-1");
}

#[tokio::test]
async fn test_empty_token_reaches_handler_without_identity() {
    let app = TestApp::new();
    let request = app
        .intercept(with_authorization(NoOpRequest {}, "Bearer "))
        .unwrap();

    let status = app
        .service
        .multi_get_printers_for_user(request)
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}

#[tokio::test]
async fn test_client_supplied_user_id_grants_nothing() {
    let app = TestApp::new();
    app.create("u1", "HP-1", "SN100").await;

    let mut request = with_authorization(NoOpRequest {}, "");
    request
        .metadata_mut()
        .insert("user_id", MetadataValue::from_static("u1"));
    let request = app.intercept(request).unwrap();

    let status = app
        .service
        .multi_get_printers_for_user(request)
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}

#[tokio::test]
async fn test_multi_get_omits_unknown_ids() {
    let app = TestApp::new();
    let a = app.create("u1", "HP-1", "SN100").await;
    let b = app.create("u2", "HP-2", "SN200").await;

    let request = app
        .authorized(
            "u1",
            MultiGetPrintersByExternalIdRequest {
                printer_ids: vec![a.external_id.clone(), "missing".to_string(), b.external_id.clone()],
            },
        )
        .unwrap();
    let result = app
        .service
        .multi_get_printers_by_external_id(request)
        .await
        .unwrap()
        .into_inner()
        .result;
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_create_without_payload_is_invalid_argument() {
    let app = TestApp::new();
    let request = app
        .authorized("u1", CreatePrinterRequest { request: None })
        .unwrap();
    let status = app.service.create_printer(request).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_shutdown_cancels_calls() {
    let app = TestApp::new();
    let created = app.create("u1", "HP-1", "SN100").await;

    app.shutdown.cancel();
    let status = app.get("u1", &created.external_id).await.unwrap_err();
    assert_eq!(status.code(), Code::Cancelled);
}
