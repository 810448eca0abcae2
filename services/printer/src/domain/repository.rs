//! 打印机仓储 trait 定义

use async_trait::async_trait;
use ditto_common::{CallerId, RequestContext};
use ditto_errors::AppResult;

use super::Printer;

/// 按 owner 限定范围的打印机访问
#[async_trait]
pub trait PrinterRepository: Send + Sync {
    /// owner 名下所有有效（未删除）的打印机，顺序由存储决定
    async fn list_by_owner(&self, ctx: &RequestContext, owner: &CallerId) -> AppResult<Vec<Printer>>;

    /// 软删除 owner 名下的打印机
    ///
    /// external id 与 owner 不匹配时返回 `NotFound`，记录保持不变。
    async fn soft_delete(
        &self,
        ctx: &RequestContext,
        owner: &CallerId,
        external_id: &str,
    ) -> AppResult<Printer>;
}
