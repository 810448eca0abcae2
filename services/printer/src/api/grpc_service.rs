//! gRPC service implementation

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use ditto_bootstrap::request_context;
use ditto_common::{CallerId, RequestContext};
use ditto_domain_core::Transferable;
use ditto_errors::{AppError, AppResult};
use ditto_ports::ResourceStore;
use ditto_telemetry::record_grpc_request;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};
use tracing::{Instrument, info_span, warn};

use crate::application::PrinterHandler;
use crate::domain::Printer;
use crate::proto::printer_service_server::PrinterService;
use crate::proto::*;

const SERVICE_NAME: &str = "ditto.printer.v1.PrinterService";

pub struct PrinterServiceImpl<S> {
    handler: Arc<PrinterHandler<S>>,
    shutdown: CancellationToken,
}

impl<S: ResourceStore<Printer>> PrinterServiceImpl<S> {
    /// `shutdown` 被取消时所有进行中的调用随之取消
    pub fn new(handler: Arc<PrinterHandler<S>>, shutdown: CancellationToken) -> Self {
        Self { handler, shutdown }
    }

    async fn observe<T, F>(&self, method: &'static str, ctx: &RequestContext, call: F) -> Result<Response<T>, Status>
    where
        F: Future<Output = AppResult<T>>,
    {
        let caller = ctx.caller().map(CallerId::as_str).unwrap_or_default();
        let span = info_span!("grpc_request", method, caller);
        let started = Instant::now();

        let result = call.instrument(span.clone()).await;
        let status = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        record_grpc_request(SERVICE_NAME, method, status, started.elapsed());

        result.map(Response::new).map_err(|e| {
            span.in_scope(|| warn!(error = %e, "Request failed"));
            Status::from(e)
        })
    }
}

fn require_payload(dto: Option<PrinterDto>) -> AppResult<PrinterDto> {
    dto.ok_or_else(|| AppError::invalid_argument("printer payload absent"))
}

#[tonic::async_trait]
impl<S: ResourceStore<Printer> + 'static> PrinterService for PrinterServiceImpl<S> {
    async fn create_printer(
        &self,
        request: Request<CreatePrinterRequest>,
    ) -> Result<Response<CreatePrinterResponse>, Status> {
        let ctx = request_context(&request, &self.shutdown);
        let req = request.into_inner();

        self.observe("CreatePrinter", &ctx, async {
            let dto = require_payload(req.request)?;
            let printer = self.handler.create(&ctx, &dto).await?;
            Ok(CreatePrinterResponse {
                response: Some(printer.to_transfer()),
            })
        })
        .await
    }

    async fn update_printer(
        &self,
        request: Request<UpdatePrinterRequest>,
    ) -> Result<Response<UpdatePrinterResponse>, Status> {
        let ctx = request_context(&request, &self.shutdown);
        let req = request.into_inner();

        self.observe("UpdatePrinter", &ctx, async {
            let dto = require_payload(req.request)?;
            let printer = self.handler.update(&ctx, &req.printer_id, &dto).await?;
            Ok(UpdatePrinterResponse {
                response: Some(printer.to_transfer()),
            })
        })
        .await
    }

    async fn get_printer_by_external_id(
        &self,
        request: Request<GetPrinterByExternalIdRequest>,
    ) -> Result<Response<GetPrinterByExternalIdResponse>, Status> {
        let ctx = request_context(&request, &self.shutdown);
        let req = request.into_inner();

        self.observe("GetPrinterByExternalId", &ctx, async {
            let printer = self.handler.get(&ctx, &req.printer_id).await?;
            Ok(GetPrinterByExternalIdResponse {
                response: Some(printer.to_transfer()),
            })
        })
        .await
    }

    async fn multi_get_printers_by_external_id(
        &self,
        request: Request<MultiGetPrintersByExternalIdRequest>,
    ) -> Result<Response<MultiGetPrintersByExternalIdResponse>, Status> {
        let ctx = request_context(&request, &self.shutdown);
        let req = request.into_inner();

        self.observe("MultiGetPrintersByExternalId", &ctx, async {
            let printers = self.handler.multi_get(&ctx, &req.printer_ids).await?;
            Ok(MultiGetPrintersByExternalIdResponse {
                result: printers.iter().map(Printer::to_transfer).collect(),
            })
        })
        .await
    }

    async fn multi_get_printers_for_user(
        &self,
        request: Request<NoOpRequest>,
    ) -> Result<Response<MultiGetPrintersByExternalIdResponse>, Status> {
        let ctx = request_context(&request, &self.shutdown);

        self.observe("MultiGetPrintersForUser", &ctx, async {
            let printers = self.handler.list_for_caller(&ctx).await?;
            Ok(MultiGetPrintersByExternalIdResponse {
                result: printers.iter().map(Printer::to_transfer).collect(),
            })
        })
        .await
    }

    async fn delete_printer(
        &self,
        request: Request<DeletePrinterRequest>,
    ) -> Result<Response<UpdatePrinterResponse>, Status> {
        let ctx = request_context(&request, &self.shutdown);
        let req = request.into_inner();

        self.observe("DeletePrinter", &ctx, async {
            let printer = self.handler.delete_for_caller(&ctx, &req.printer_id).await?;
            Ok(UpdatePrinterResponse {
                response: Some(printer.to_transfer()),
            })
        })
        .await
    }
}
