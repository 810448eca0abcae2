//! 内存实现的资源存储，用于测试

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ditto_common::RequestContext;
use ditto_domain_core::{Filter, Resource};
use ditto_errors::{AppError, AppResult};
use tokio::sync::Mutex;

use crate::{Mutation, ResourceStore};

#[derive(Debug)]
struct Rows<E> {
    rows: Vec<E>,
    next_id: i64,
}

/// 以插入顺序保存记录的内存存储
///
/// 更新在持有锁期间完成，同一记录上的并发更新天然串行化。
/// `set_unavailable(true)` 之后所有调用返回存储错误，用于模拟后端故障。
#[derive(Debug, Clone)]
pub struct MemoryResourceStore<E> {
    inner: Arc<Mutex<Rows<E>>>,
    unavailable: Arc<AtomicBool>,
}

impl<E> Default for MemoryResourceStore<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Rows {
                rows: Vec::new(),
                next_id: 1,
            })),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<E: Resource> MemoryResourceStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 当前全部记录的快照
    pub async fn snapshot(&self) -> Vec<E> {
        self.inner.lock().await.rows.clone()
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("{} store unavailable", E::NAME)));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Resource> ResourceStore<E> for MemoryResourceStore<E> {
    async fn insert(&self, ctx: &RequestContext, mut entity: E) -> AppResult<E> {
        ctx.run(async {
            self.ensure_available()?;
            let mut guard = self.inner.lock().await;
            if guard
                .rows
                .iter()
                .any(|row| row.external_id() == entity.external_id())
            {
                return Err(AppError::storage(format!(
                    "duplicate external_id `{}` in {}",
                    entity.external_id(),
                    E::NAME
                )));
            }
            entity.meta_mut().id = Some(guard.next_id);
            guard.next_id += 1;
            guard.rows.push(entity.clone());
            Ok(entity)
        })
        .await
    }

    async fn find_one(&self, ctx: &RequestContext, filter: &Filter) -> AppResult<Option<E>> {
        ctx.run(async {
            self.ensure_available()?;
            filter.validate::<E>()?;
            let guard = self.inner.lock().await;
            Ok(guard.rows.iter().find(|row| filter.matches(*row)).cloned())
        })
        .await
    }

    async fn scan(&self, ctx: &RequestContext, filter: &Filter) -> AppResult<Vec<E>> {
        ctx.run(async {
            self.ensure_available()?;
            filter.validate::<E>()?;
            let guard = self.inner.lock().await;
            Ok(guard
                .rows
                .iter()
                .filter(|row| filter.matches(*row))
                .cloned()
                .collect())
        })
        .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        filter: &Filter,
        mutate: Mutation<E>,
    ) -> AppResult<E> {
        ctx.run(async {
            self.ensure_available()?;
            filter.validate::<E>()?;
            let mut guard = self.inner.lock().await;
            let row = guard
                .rows
                .iter_mut()
                .find(|row| filter.matches(&**row))
                .ok_or_else(|| AppError::not_found(format!("no matching {}", E::NAME)))?;

            let id = row.meta().id;
            let external_id = row.external_id().to_string();
            let created_at = row.meta().created_at;
            mutate(row);
            // 主键、external id 与创建时间不可被修改
            row.meta_mut().id = id;
            row.meta_mut().external_id = external_id;
            row.meta_mut().created_at = created_at;
            Ok(row.clone())
        })
        .await
    }
}
