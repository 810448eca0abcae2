//! 生命周期状态

use serde::{Deserialize, Serialize};

/// 资源状态
///
/// `Inactive` 表示逻辑删除；记录仍保留在存储中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    #[default]
    Active,
    Inactive,
}

impl ResourceStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ResourceStatus::Active)
    }
}

impl From<i32> for ResourceStatus {
    fn from(value: i32) -> Self {
        match value {
            1 => ResourceStatus::Inactive,
            _ => ResourceStatus::Active,
        }
    }
}

impl From<ResourceStatus> for i32 {
    fn from(status: ResourceStatus) -> Self {
        match status {
            ResourceStatus::Active => 0,
            ResourceStatus::Inactive => 1,
        }
    }
}
