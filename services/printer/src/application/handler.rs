//! 打印机业务逻辑

use std::sync::Arc;

use ditto_common::RequestContext;
use ditto_domain_core::{Resource, Transferable};
use ditto_errors::AppResult;
use ditto_ports::ResourceStore;
use ditto_service_core::BaseService;
use ditto_telemetry::record_outcome;
use tracing::{info, warn};

use crate::domain::{Printer, PrinterRepository};
use crate::proto::PrinterDto;

/// 打印机服务的六个公开操作
pub struct PrinterHandler<S> {
    base: BaseService<Printer, S>,
    repository: Arc<dyn PrinterRepository>,
}

impl<S: ResourceStore<Printer>> PrinterHandler<S> {
    pub fn new(base: BaseService<Printer, S>, repository: Arc<dyn PrinterRepository>) -> Self {
        Self { base, repository }
    }

    /// 创建打印机，owner 取自上下文中的认证身份
    pub async fn create(&self, ctx: &RequestContext, dto: &PrinterDto) -> AppResult<Printer> {
        let mut printer = Printer::default();
        printer.fill_from_transfer(dto);
        printer.user_id = ctx.caller().map(|c| c.to_string()).unwrap_or_default();

        let result = match printer.validate() {
            Ok(()) => self.base.create(ctx, printer).await,
            Err(e) => Err(e),
        };
        record_outcome("printer_create", result.is_ok());
        match &result {
            Ok(created) => info!(external_id = %created.external_id(), printer = %created, "Printer created"),
            Err(e) => warn!(error = %e, "Printer creation failed"),
        }
        result
    }

    /// 稀疏更新；序列号、产品号与 owner 不会被修改
    pub async fn update(&self, ctx: &RequestContext, external_id: &str, dto: &PrinterDto) -> AppResult<Printer> {
        let mut patch = Printer::default();
        patch.fill_from_transfer(dto);
        patch.validate()?;
        self.base.update(ctx, external_id, patch).await
    }

    pub async fn get(&self, ctx: &RequestContext, external_id: &str) -> AppResult<Printer> {
        self.base.find_by_external_id(ctx, external_id).await
    }

    pub async fn multi_get(&self, ctx: &RequestContext, external_ids: &[String]) -> AppResult<Vec<Printer>> {
        self.base.multi_find_by_external_id(ctx, external_ids).await
    }

    /// 调用方名下的有效打印机
    pub async fn list_for_caller(&self, ctx: &RequestContext) -> AppResult<Vec<Printer>> {
        let caller = ctx.require_caller()?;
        self.repository.list_by_owner(ctx, caller).await
    }

    /// 软删除调用方名下的打印机
    pub async fn delete_for_caller(&self, ctx: &RequestContext, external_id: &str) -> AppResult<Printer> {
        let caller = ctx.require_caller()?;
        let deleted = self.repository.soft_delete(ctx, caller, external_id).await?;
        info!(external_id, user_id = %caller, "Printer soft-deleted");
        Ok(deleted)
    }
}
