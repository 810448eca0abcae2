//! 打印机的 PostgreSQL 行映射与迁移

use ditto_adapter_postgres::{PgResource, PgResourceStore};
use ditto_domain_core::ResourceMeta;
use sqlx::Row;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgRow;

use crate::domain::Printer;

/// 内嵌的建表迁移
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub type PostgresPrinterStore = PgResourceStore<Printer>;

impl PgResource for Printer {
    fn decode(meta: ResourceMeta, row: &PgRow, offset: usize) -> Result<Self, sqlx::Error> {
        Ok(Printer {
            meta,
            name: row.try_get(offset)?,
            user_id: row.try_get(offset + 1)?,
            serial_number: row.try_get(offset + 2)?,
            product_number: row.try_get(offset + 3)?,
            from_date: row.try_get(offset + 4)?,
            to_date: row.try_get(offset + 5)?,
            from_index: decode_index(row, offset + 6)?,
            to_index: decode_index(row, offset + 7)?,
            description: row.try_get(offset + 8)?,
        })
    }
}

/// 负数说明行被外部写坏，按解码错误处理
fn decode_index(row: &PgRow, index: usize) -> Result<u64, sqlx::Error> {
    let value: i64 = row.try_get(index)?;
    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(e),
    })
}
