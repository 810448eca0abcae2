//! 稀疏合并策略
//!
//! 补丁中的"空值"（空字符串、0、`None`、默认状态）表示**未设置**，不是**清空**。
//! 因此无法通过 Update 把字段改回空值；这是更新语义的一部分。

use chrono::{DateTime, Utc};

use crate::ResourceStatus;

/// 判断补丁字段是否未设置
pub trait SparseValue {
    fn is_unset(&self) -> bool;
}

impl SparseValue for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl SparseValue for u64 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl SparseValue for i64 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl SparseValue for ResourceStatus {
    fn is_unset(&self) -> bool {
        *self == ResourceStatus::default()
    }
}

impl SparseValue for Option<DateTime<Utc>> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }
}

/// 补丁字段已设置时覆盖目标字段
pub fn merge_field<T: SparseValue + Clone>(target: &mut T, patch: &T) {
    if !patch.is_unset() {
        *target = patch.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_field_overwrites_when_set() {
        let mut name = "old".to_string();
        merge_field(&mut name, &"new".to_string());
        assert_eq!(name, "new");
    }

    #[test]
    fn test_merge_field_keeps_when_unset() {
        let mut name = "old".to_string();
        merge_field(&mut name, &String::new());
        assert_eq!(name, "old");

        let mut index = 7u64;
        merge_field(&mut index, &0);
        assert_eq!(index, 7);

        let mut at = Some(Utc::now());
        let before = at;
        merge_field(&mut at, &None);
        assert_eq!(at, before);
    }

    #[test]
    fn test_status_only_moves_away_from_default() {
        let mut status = ResourceStatus::Inactive;
        merge_field(&mut status, &ResourceStatus::Active);
        assert_eq!(status, ResourceStatus::Inactive);

        let mut status = ResourceStatus::Active;
        merge_field(&mut status, &ResourceStatus::Inactive);
        assert_eq!(status, ResourceStatus::Inactive);
    }
}
