//! 资源存储访问器 trait 定义

use async_trait::async_trait;
use ditto_common::RequestContext;
use ditto_domain_core::{Filter, Resource};
use ditto_errors::AppResult;

/// 在锁定的当前记录上执行的修改
pub type Mutation<E> = Box<dyn FnOnce(&mut E) + Send>;

/// 资源存储访问器
///
/// 所有方法都在 `ctx` 的取消信号与截止时间约束下执行。
/// 未找到记录必须以 `AppError::NotFound` 报告，与其他存储失败区分。
#[async_trait]
pub trait ResourceStore<E: Resource>: Send + Sync {
    /// 插入记录，返回带存储分配主键的记录
    async fn insert(&self, ctx: &RequestContext, entity: E) -> AppResult<E>;

    /// 返回第一条满足条件的记录
    async fn find_one(&self, ctx: &RequestContext, filter: &Filter) -> AppResult<Option<E>>;

    /// 返回全部满足条件的记录，顺序由存储决定
    async fn scan(&self, ctx: &RequestContext, filter: &Filter) -> AppResult<Vec<E>>;

    /// 锁定第一条满足条件的记录，执行 `mutate` 后写回
    ///
    /// 同一记录上的并发更新必须串行化，不得丢失更新。
    /// 无匹配记录时返回 `AppError::NotFound`。
    async fn update(
        &self,
        ctx: &RequestContext,
        filter: &Filter,
        mutate: Mutation<E>,
    ) -> AppResult<E>;
}
