//! 谓词过滤
//!
//! 存储层的扫描与定位都通过 `Filter` 表达；列名必须是实体已声明的列。

use ditto_errors::{AppError, AppResult};

use crate::{FieldValue, Resource};

/// 单个谓词
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(&'static str, FieldValue),
    In(&'static str, Vec<FieldValue>),
    IsNull(&'static str),
}

impl Predicate {
    pub fn column(&self) -> &'static str {
        match self {
            Predicate::Eq(column, _) | Predicate::In(column, _) | Predicate::IsNull(column) => column,
        }
    }

    fn matches<E: Resource>(&self, entity: &E) -> bool {
        match self {
            Predicate::Eq(column, expected) => entity.column(column).as_ref() == Some(expected),
            Predicate::In(column, values) => entity
                .column(column)
                .is_some_and(|actual| values.contains(&actual)),
            Predicate::IsNull(column) => matches!(
                entity.column(column),
                None | Some(FieldValue::Timestamp(None))
            ),
        }
    }
}

/// 多个谓词的合取
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 external id 定位
    pub fn by_external_id(external_id: impl Into<String>) -> Self {
        Self::new().eq("external_id", FieldValue::Text(external_id.into()))
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<FieldValue>) -> Self {
        self.predicates.push(Predicate::Eq(column, value.into()));
        self
    }

    pub fn any_of<V: Into<FieldValue>>(
        mut self,
        column: &'static str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.predicates.push(Predicate::In(column, values));
        self
    }

    pub fn is_null(mut self, column: &'static str) -> Self {
        self.predicates.push(Predicate::IsNull(column));
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// 实体是否满足全部谓词
    pub fn matches<E: Resource>(&self, entity: &E) -> bool {
        self.predicates.iter().all(|p| p.matches(entity))
    }

    /// 拒绝实体未声明的列
    pub fn validate<E: Resource>(&self) -> AppResult<()> {
        match self.predicates.iter().find(|p| !E::has_column(p.column())) {
            Some(p) => Err(AppError::internal(format!(
                "unknown column `{}` for {}",
                p.column(),
                E::NAME
            ))),
            None => Ok(()),
        }
    }
}
