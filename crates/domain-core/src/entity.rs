//! 资源实体 trait

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FieldValue, ResourceStatus, merge_field};

/// 所有资源共有的列，按行映射顺序排列
pub const META_COLUMNS: &[&str] = &[
    "external_id",
    "id",
    "created_at",
    "updated_at",
    "deleted_at",
    "status",
];

/// 资源的公共元数据
///
/// `id` 是存储分配的内部主键，只在存储层使用，不参与序列化，
/// 也不会出现在传输对象中。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceMeta {
    #[serde(skip)]
    pub id: Option<i64>,
    pub external_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub status: ResourceStatus,
}

impl ResourceMeta {
    /// 新建记录时由服务端写入的初始值
    pub fn initialize(&mut self, external_id: String, now: DateTime<Utc>) {
        self.id = None;
        self.external_id = external_id;
        self.created_at = now;
        self.updated_at = now;
        self.deleted_at = None;
        self.status = ResourceStatus::Active;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// 软删除补丁：状态置为 Inactive 并记录删除时间
    pub fn deletion_patch(now: DateTime<Utc>) -> Self {
        Self {
            status: ResourceStatus::Inactive,
            deleted_at: Some(now),
            ..Default::default()
        }
    }

    /// 合并生命周期字段（status、deleted_at）
    ///
    /// external id、内部主键与创建时间不可变，不参与合并。
    pub fn merge_lifecycle(&mut self, patch: &ResourceMeta) {
        merge_field(&mut self.status, &patch.status);
        merge_field(&mut self.deleted_at, &patch.deleted_at);
    }

    /// 是否逻辑删除
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some() || !self.status.is_active()
    }

    pub fn field(&self, column: &str) -> Option<FieldValue> {
        match column {
            "external_id" => Some(FieldValue::Text(self.external_id.clone())),
            "id" => self.id.map(FieldValue::Int),
            "created_at" => Some(FieldValue::Timestamp(Some(self.created_at))),
            "updated_at" => Some(FieldValue::Timestamp(Some(self.updated_at))),
            "deleted_at" => Some(FieldValue::Timestamp(self.deleted_at)),
            "status" => Some(self.status.into()),
            _ => None,
        }
    }
}

/// 资源实体
///
/// 实体对外只暴露 external id；通过 [`Resource::merge`] 做稀疏更新，
/// 通过状态位软删除。
pub trait Resource: Clone + Send + Sync + 'static {
    /// 资源名，同时作为表名
    const NAME: &'static str;

    /// 实体自有列（不含 [`META_COLUMNS`]），按行映射顺序排列
    const FIELDS: &'static [&'static str];

    fn meta(&self) -> &ResourceMeta;

    fn meta_mut(&mut self) -> &mut ResourceMeta;

    /// 稀疏合并：补丁中已设置的可变字段覆盖当前值，其余保持不变
    fn merge(&mut self, patch: &Self);

    /// 读取实体自有列
    fn field(&self, column: &str) -> Option<FieldValue>;

    fn external_id(&self) -> &str {
        &self.meta().external_id
    }

    fn set_external_id(&mut self, external_id: String) {
        self.meta_mut().external_id = external_id;
    }

    /// 读取任意列（公共列或自有列）
    fn column(&self, column: &str) -> Option<FieldValue> {
        self.meta().field(column).or_else(|| self.field(column))
    }

    fn has_column(column: &str) -> bool {
        META_COLUMNS.contains(&column) || Self::FIELDS.contains(&column)
    }
}
