//! ditto-common - 通用类型和工具库

pub mod context;
pub mod retry;
pub mod types;

pub use context::*;
pub use retry::*;
pub use types::*;
