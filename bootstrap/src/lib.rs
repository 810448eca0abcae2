//! ditto-bootstrap - 统一服务启动骨架
//!
//! 所有服务复用的启动逻辑

mod context;
mod health;
mod infrastructure;
mod interceptor;
mod runtime;
mod shutdown;
mod starter;

pub use context::*;
pub use health::*;
pub use infrastructure::*;
pub use interceptor::*;
pub use runtime::*;
pub use shutdown::*;
pub use starter::*;
