use ditto_errors::AppError;

/// 将 sqlx 错误映射为应用错误
///
/// 行映射失败归为 `Decode`，其余归为 `Storage`。
pub fn map_sqlx_error(operation: &str, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::RowNotFound => AppError::not_found(format!("{}: no rows", operation)),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => AppError::decode(format!("{}: {}", operation, err)),
        other => AppError::storage(format!("{}: {}", operation, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = map_sqlx_error("find printer", sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_arity_mismatch_maps_to_decode() {
        let err = map_sqlx_error(
            "decode printer",
            sqlx::Error::ColumnIndexOutOfBounds { index: 15, len: 14 },
        );
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_pool_errors_map_to_storage() {
        let err = map_sqlx_error("insert printer", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Storage(_)));
    }
}
