//! 基于 PostgreSQL 的资源存储

use std::marker::PhantomData;

use async_trait::async_trait;
use ditto_common::RequestContext;
use ditto_domain_core::{FieldValue, Filter, META_COLUMNS, Predicate};
use ditto_errors::{AppError, AppResult};
use ditto_ports::{Mutation, ResourceStore};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::debug;

use crate::{PgResource, decode_row, map_sqlx_error, select_columns};

/// 通用的 PostgreSQL 资源存储
///
/// 更新在事务内以 `SELECT ... FOR UPDATE` 锁定目标行后写回，
/// 同一行上的并发更新由数据库串行化。
pub struct PgResourceStore<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgResourceStore<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: PgResource> PgResourceStore<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn select(filter: &Filter) -> AppResult<QueryBuilder<'static, Postgres>> {
        filter.validate::<E>()?;
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            select_columns::<E>(),
            E::TABLE
        ));
        push_where(&mut qb, filter);
        Ok(qb)
    }

    /// 可写列：除内部主键外的全部列
    fn writable_columns() -> impl Iterator<Item = &'static str> {
        META_COLUMNS
            .iter()
            .chain(E::FIELDS.iter())
            .copied()
            .filter(|column| *column != "id")
    }

    fn column_value(entity: &E, column: &str) -> AppResult<FieldValue> {
        entity.column(column).ok_or_else(|| {
            AppError::internal(format!("{} has no value for column `{}`", E::NAME, column))
        })
    }
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Text(text) => {
            qb.push_bind(text.clone());
        }
        FieldValue::Int(int) => {
            qb.push_bind(*int);
        }
        FieldValue::Timestamp(ts) => {
            qb.push_bind(*ts);
        }
    }
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, filter: &Filter) {
    for (i, predicate) in filter.predicates().iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::Eq(column, value) => {
                qb.push(*column).push(" = ");
                push_value(qb, value);
            }
            Predicate::In(_, values) if values.is_empty() => {
                qb.push("FALSE");
            }
            Predicate::In(column, values) => {
                qb.push(*column).push(" IN (");
                for (j, value) in values.iter().enumerate() {
                    if j > 0 {
                        qb.push(", ");
                    }
                    push_value(qb, value);
                }
                qb.push(")");
            }
            Predicate::IsNull(column) => {
                qb.push(*column).push(" IS NULL");
            }
        }
    }
}

#[async_trait]
impl<E: PgResource> ResourceStore<E> for PgResourceStore<E> {
    async fn insert(&self, ctx: &RequestContext, mut entity: E) -> AppResult<E> {
        let columns: Vec<&'static str> = Self::writable_columns().collect();
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            E::TABLE,
            columns.join(", ")
        ));
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, &Self::column_value(&entity, column)?);
        }
        qb.push(") RETURNING id");

        let id: i64 = ctx
            .run(async {
                let row = qb
                    .build()
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("insert", e))?;
                row.try_get::<i64, _>(0).map_err(|e| map_sqlx_error("insert", e))
            })
            .await?;

        entity.meta_mut().id = Some(id);
        debug!(table = E::TABLE, id, "Row inserted");
        Ok(entity)
    }

    async fn find_one(&self, ctx: &RequestContext, filter: &Filter) -> AppResult<Option<E>> {
        let mut qb = Self::select(filter)?;
        qb.push(" ORDER BY id LIMIT 1");

        ctx.run(async {
            let row = qb
                .build()
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("find", e))?;
            row.map(|r| decode_row::<E>(&r))
                .transpose()
                .map_err(|e| map_sqlx_error("decode", e))
        })
        .await
    }

    async fn scan(&self, ctx: &RequestContext, filter: &Filter) -> AppResult<Vec<E>> {
        let mut qb = Self::select(filter)?;
        qb.push(" ORDER BY id");

        ctx.run(async {
            let rows = qb
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("scan", e))?;
            rows.iter()
                .map(decode_row::<E>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| map_sqlx_error("decode", e))
        })
        .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        filter: &Filter,
        mutate: Mutation<E>,
    ) -> AppResult<E> {
        let mut select = Self::select(filter)?;
        select.push(" ORDER BY id LIMIT 1 FOR UPDATE");

        // 上下文中止时事务随 future 一同丢弃并回滚
        ctx.run(async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("begin", e))?;

            let row = select
                .build()
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("lock", e))?
                .ok_or_else(|| AppError::not_found(format!("no matching {}", E::NAME)))?;
            let current: E = decode_row(&row).map_err(|e| map_sqlx_error("decode", e))?;

            let mut next = current.clone();
            mutate(&mut next);
            {
                let meta = next.meta_mut();
                meta.id = current.meta().id;
                meta.external_id = current.meta().external_id.clone();
                meta.created_at = current.meta().created_at;
            }
            let id = next
                .meta()
                .id
                .ok_or_else(|| AppError::internal("locked row without id"))?;

            let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", E::TABLE));
            let columns = Self::writable_columns()
                .filter(|column| !matches!(*column, "external_id" | "created_at"));
            for (i, column) in columns.enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(column).push(" = ");
                push_value(&mut qb, &Self::column_value(&next, column)?);
            }
            qb.push(" WHERE id = ").push_bind(id);

            qb.build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update", e))?;
            tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

            debug!(table = E::TABLE, id, "Row updated");
            Ok(next)
        })
        .await
    }
}
