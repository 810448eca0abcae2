//! 通用类型定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// 上下文中存放调用方标识的固定键
pub const USER_ID_KEY: &str = "user_id";

/// 已认证调用方的标识
///
/// 只能由授权拦截器根据已验证的 token 写入，客户端不能直接提供。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct CallerId(pub String);

impl CallerId {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CallerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
