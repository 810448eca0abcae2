//! 基于通用资源存储的打印机仓储

use async_trait::async_trait;
use chrono::Utc;
use ditto_common::{CallerId, RequestContext};
use ditto_domain_core::{Filter, ResourceMeta, ResourceStatus};
use ditto_errors::AppResult;
use ditto_ports::ResourceStore;
use ditto_service_core::BaseService;

use crate::domain::{Printer, PrinterRepository};

/// 打印机仓储
///
/// 软删除与普通更新走同一条合并路径，只是补丁只带生命周期字段。
pub struct StorePrinterRepository<S> {
    base: BaseService<Printer, S>,
}

impl<S: ResourceStore<Printer>> StorePrinterRepository<S> {
    pub fn new(base: BaseService<Printer, S>) -> Self {
        Self { base }
    }
}

#[async_trait]
impl<S: ResourceStore<Printer>> PrinterRepository for StorePrinterRepository<S> {
    async fn list_by_owner(&self, ctx: &RequestContext, owner: &CallerId) -> AppResult<Vec<Printer>> {
        let filter = Filter::new()
            .eq("user_id", owner.as_str())
            .eq("status", ResourceStatus::Active)
            .is_null("deleted_at");
        self.base.scan(ctx, &filter).await
    }

    async fn soft_delete(
        &self,
        ctx: &RequestContext,
        owner: &CallerId,
        external_id: &str,
    ) -> AppResult<Printer> {
        let filter = Filter::by_external_id(external_id).eq("user_id", owner.as_str());
        let patch = Printer {
            meta: ResourceMeta::deletion_patch(Utc::now()),
            ..Default::default()
        };
        self.base.update_where(ctx, filter, patch).await
    }
}
