//! ditto-errors - 统一错误处理
//!
//! 所有层共享同一个错误分类，在 gRPC 边界映射为 `tonic::Status`。

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// 请求元数据缺失或格式错误
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 缺少 token，或 token 结构正确但已失效
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// 签名校验失败
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// 操作需要调用方身份，但上下文中没有
    #[error("Caller identity required: {0}")]
    MissingCaller(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 持久化失败（连接、约束、I/O）
    #[error("Storage error: {0}")]
    Storage(String),

    /// 行或二进制解码失败
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn missing_caller(msg: impl Into<String>) -> Self {
        Self::MissingCaller(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn deadline_exceeded(msg: impl Into<String>) -> Self {
        Self::DeadlineExceeded(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// 转换为 gRPC 状态码
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            Self::InvalidArgument(_) => tonic::Code::InvalidArgument,
            Self::Unauthenticated(_) => tonic::Code::Unauthenticated,
            Self::PermissionDenied(_) => tonic::Code::PermissionDenied,
            Self::MissingCaller(_) => tonic::Code::PermissionDenied,
            Self::NotFound(_) => tonic::Code::NotFound,
            Self::Storage(_) => tonic::Code::Internal,
            Self::Decode(_) => tonic::Code::Internal,
            Self::Cancelled(_) => tonic::Code::Cancelled,
            Self::DeadlineExceeded(_) => tonic::Code::DeadlineExceeded,
            Self::Internal(_) => tonic::Code::Internal,
        }
    }

    /// 指标标签使用的短名称
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::PermissionDenied(_) => "permission_denied",
            Self::MissingCaller(_) => "missing_caller",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage",
            Self::Decode(_) => "decode",
            Self::Cancelled(_) => "cancelled",
            Self::DeadlineExceeded(_) => "deadline_exceeded",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<AppError> for tonic::Status {
    fn from(err: AppError) -> Self {
        tonic::Status::new(err.grpc_code(), err.to_string())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
