//! 行映射
//!
//! 查询总是按 [`META_COLUMNS`] 后接实体自有列的顺序选取，
//! 映射按位置读取，列数不符时报错。

use ditto_domain_core::{META_COLUMNS, Resource, ResourceMeta, ResourceStatus};
use sqlx::Row;
use sqlx::postgres::PgRow;

/// 可存入 PostgreSQL 的资源
pub trait PgResource: Resource {
    /// 表名，缺省为资源名
    const TABLE: &'static str = Self::NAME;

    /// 从 `offset` 开始按 [`Resource::FIELDS`] 的顺序读取自有列
    fn decode(meta: ResourceMeta, row: &PgRow, offset: usize) -> Result<Self, sqlx::Error>;
}

/// 选取列表：公共列在前，自有列在后
pub fn select_columns<E: Resource>() -> String {
    META_COLUMNS
        .iter()
        .chain(E::FIELDS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// 按位置读取公共列
pub fn decode_meta(row: &PgRow) -> Result<ResourceMeta, sqlx::Error> {
    Ok(ResourceMeta {
        external_id: row.try_get(0)?,
        id: Some(row.try_get(1)?),
        created_at: row.try_get(2)?,
        updated_at: row.try_get(3)?,
        deleted_at: row.try_get(4)?,
        status: ResourceStatus::from(row.try_get::<i32, _>(5)?),
    })
}

/// 将一行映射为实体，列数必须与声明的列完全一致
pub fn decode_row<E: PgResource>(row: &PgRow) -> Result<E, sqlx::Error> {
    let expected = META_COLUMNS.len() + E::FIELDS.len();
    if row.len() != expected {
        return Err(sqlx::Error::ColumnIndexOutOfBounds {
            index: expected,
            len: row.len(),
        });
    }
    let meta = decode_meta(row)?;
    E::decode(meta, row, META_COLUMNS.len())
}
