use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use ditto_common::RequestContext;
use ditto_domain_core::{Filter, Resource};
use ditto_errors::{AppError, AppResult};
use ditto_ports::ResourceStore;
use tracing::debug;
use uuid::Uuid;

/// 资源型实体的通用服务
///
/// 外部 id 在创建时由服务端生成（UUID v7），此后不可变。
pub struct BaseService<E, S> {
    store: Arc<S>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S> Clone for BaseService<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<E, S> BaseService<E, S>
where
    E: Resource,
    S: ResourceStore<E>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// 分配新的 external id 与时间戳后写入存储
    ///
    /// 客户端提供的 external id 总会被覆盖。
    pub async fn create(&self, ctx: &RequestContext, mut entity: E) -> AppResult<E> {
        let external_id = Uuid::now_v7().to_string();
        entity.meta_mut().initialize(external_id, Utc::now());
        let created = self.store.insert(ctx, entity).await?;
        debug!(resource = E::NAME, external_id = %created.external_id(), "Resource created");
        Ok(created)
    }

    /// 按 external id 对记录做稀疏合并
    pub async fn update(&self, ctx: &RequestContext, external_id: &str, patch: E) -> AppResult<E> {
        self.update_where(ctx, Filter::by_external_id(external_id), patch)
            .await
    }

    /// 对满足条件的第一条记录做稀疏合并并刷新 updated_at
    pub async fn update_where(&self, ctx: &RequestContext, filter: Filter, patch: E) -> AppResult<E> {
        let updated = self
            .store
            .update(
                ctx,
                &filter,
                Box::new(move |current: &mut E| {
                    current.merge(&patch);
                    current.meta_mut().touch(Utc::now());
                }),
            )
            .await?;
        debug!(resource = E::NAME, external_id = %updated.external_id(), "Resource updated");
        Ok(updated)
    }

    /// 按 external id 读取，不区分是否已软删除
    pub async fn find_by_external_id(&self, ctx: &RequestContext, external_id: &str) -> AppResult<E> {
        self.store
            .find_one(ctx, &Filter::by_external_id(external_id))
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("{} `{}` not found", E::NAME, external_id))
            })
    }

    /// 批量读取；不存在的 id 被忽略，结果顺序由存储决定
    pub async fn multi_find_by_external_id(
        &self,
        ctx: &RequestContext,
        external_ids: &[String],
    ) -> AppResult<Vec<E>> {
        if external_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .scan(ctx, &Filter::new().any_of("external_id", external_ids))
            .await
    }

    pub async fn scan(&self, ctx: &RequestContext, filter: &Filter) -> AppResult<Vec<E>> {
        self.store.scan(ctx, filter).await
    }
}
